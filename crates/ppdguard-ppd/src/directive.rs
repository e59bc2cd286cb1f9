use std::fmt;

/// The directive keys that feed the allow-list. Every other PPD key is
/// skipped without buffering its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKey {
    /// `*FoomaticRIPCommandLine` — the full filter command line.
    CommandLine,
    /// `*FoomaticRIPCommandLinePDF` — the PDF variant of the command line.
    CommandLinePdf,
    /// `*FoomaticRIPOptionSetting` — per-option command fragments.
    OptionSetting,
}

impl DirectiveKey {
    /// Match a bare key token (no `*` marker, no metadata).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "FoomaticRIPCommandLine" => Some(Self::CommandLine),
            "FoomaticRIPCommandLinePDF" => Some(Self::CommandLinePdf),
            "FoomaticRIPOptionSetting" => Some(Self::OptionSetting),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CommandLine => "FoomaticRIPCommandLine",
            Self::CommandLinePdf => "FoomaticRIPCommandLinePDF",
            Self::OptionSetting => "FoomaticRIPOptionSetting",
        }
    }
}

impl fmt::Display for DirectiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted directive. Only `key` and `value` feed the allow-list;
/// `name` and `text` are parsed for fidelity with the PPD grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub key: DirectiveKey,
    /// Sub-identifier after the key (`Duplex` in
    /// `*FoomaticRIPOptionSetting Duplex/Long edge: ...`).
    pub name: Option<String>,
    /// Translation string after `/` or `=` in the name field.
    pub text: Option<String>,
    pub value: String,
}

/// Parsed key/metadata prefix of a directive line (everything before the
/// colon).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectivePrefix {
    pub key: String,
    pub name: Option<String>,
    pub text: Option<String>,
}

/// Parse the prefix of a directive line: `*Key Name/Text` (name and text
/// optional). The key is the first whitespace-delimited token after the
/// `*` marker; the name runs until whitespace, `/`, `=`, or `)`; the text
/// is whatever follows a single `/` or `=`.
///
/// Returns `None` only when no key token is present. Name/text parse
/// failures are non-fatal and yield `None` fields.
pub fn parse_prefix(prefix: &str) -> Option<DirectivePrefix> {
    let rest = prefix.strip_prefix('*')?;

    let key_end = rest
        .find(|c: char| c == ' ' || c == '\t')
        .unwrap_or(rest.len());
    let key = &rest[..key_end];
    if key.is_empty() {
        return None;
    }

    let after_key = rest[key_end..].trim_start_matches([' ', '\t']);
    if after_key.is_empty() {
        return Some(DirectivePrefix {
            key: key.to_owned(),
            name: None,
            text: None,
        });
    }

    let name_end = after_key
        .find([' ', '\t', '/', '=', ')'])
        .unwrap_or(after_key.len());
    let name = &after_key[..name_end];

    let text = match after_key[name_end..].chars().next() {
        Some('/' | '=') => {
            let t = &after_key[name_end + 1..];
            if t.is_empty() {
                None
            } else {
                Some(t.to_owned())
            }
        }
        _ => None,
    };

    Some(DirectivePrefix {
        key: key.to_owned(),
        name: if name.is_empty() {
            None
        } else {
            Some(name.to_owned())
        },
        text,
    })
}
