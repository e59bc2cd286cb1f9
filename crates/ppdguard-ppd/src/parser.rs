use crate::buffer::ValueBuffer;
use crate::directive::{parse_prefix, Directive, DirectiveKey};
use std::io::BufRead;
use thiserror::Error;
use tracing::warn;

/// The two-character end-of-line marker that continues a value on the
/// next physical line.
const CONTINUATION_MARKER: &str = "&&";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read PPD stream: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters accumulated over one parser run. Format problems are local
/// (the directive is skipped) and show up here rather than as errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    pub lines_read: u64,
    pub directives_emitted: u64,
    pub unrecognized_keys: u64,
    pub format_errors: u64,
}

/// Streaming extractor of the recognized Foomatic directives from a PPD
/// document.
///
/// The parser walks the document line by line. A candidate line starts
/// with `*` (but not the `*%` comment marker) and contains a colon; its
/// value may continue across physical lines either via a trailing `&&`
/// marker or via an unterminated quoted string. Both forms are
/// reconstructed into a single value, with embedded newlines preserved
/// inside quoted text. Truncated input mid-continuation terminates the
/// directive with whatever has been accumulated; it never fails the
/// whole parse.
pub struct DirectiveParser<R> {
    reader: R,
    line: String,
    value: ValueBuffer,
    stats: ParseStats,
}

impl<R: BufRead> DirectiveParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::with_capacity(256),
            value: ValueBuffer::with_capacity(256),
            stats: ParseStats::default(),
        }
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Advance to the next recognized directive, or `Ok(None)` at end of
    /// input. Malformed lines and unrecognized keys are skipped.
    pub fn next_directive(&mut self) -> Result<Option<Directive>, ParseError> {
        loop {
            if !self.read_physical_line()? {
                return Ok(None);
            }

            if !self.line.starts_with('*') || self.line.starts_with("*%") {
                continue;
            }

            // Split at the first colon; a directive line without one is
            // malformed and skipped.
            let Some((prefix_raw, after_colon)) = self.line.split_once(':') else {
                continue;
            };

            let Some(prefix) = parse_prefix(prefix_raw) else {
                continue;
            };

            // Initial value fragment: remainder after the colon, leading
            // whitespace skipped, up to the first CR/LF.
            let initial = after_colon.trim_start();
            let initial = initial.split(['\r', '\n']).next().unwrap_or("");

            self.value.clear();
            self.value.append(initial);

            if self.value.is_empty() {
                warn!(key = %prefix.key, "missing value for PPD key");
                self.stats.format_errors += 1;
            }

            self.accumulate_continuations()?;

            // Strip a surrounding quote pair. The closing quote is the
            // last quote character in the value; if it never arrived the
            // directive is malformed and dropped.
            if self.value.as_str().starts_with('"') {
                self.value.remove_first();
                if !self.value.truncate_at_last('"') {
                    warn!(key = %prefix.key, "unterminated quoted value");
                    self.stats.format_errors += 1;
                    continue;
                }
            }

            self.value.trim_trailing_newline();
            self.value.trim_trailing_whitespace();

            if self.value.is_empty() {
                continue;
            }

            let Some(key) = DirectiveKey::from_token(&prefix.key) else {
                self.stats.unrecognized_keys += 1;
                continue;
            };

            self.stats.directives_emitted += 1;
            return Ok(Some(Directive {
                key,
                name: prefix.name,
                text: prefix.text,
                value: self.value.as_str().to_owned(),
            }));
        }
    }

    /// Collect all remaining directives into a vector.
    pub fn collect_directives(&mut self) -> Result<Vec<Directive>, ParseError> {
        let mut out = Vec::new();
        while let Some(d) = self.next_directive()? {
            out.push(d);
        }
        Ok(out)
    }

    /// Run the continuation loop: keep reading physical lines while the
    /// accumulated value either ends with the `&&` marker (stripped) or
    /// is an opened-but-unclosed quoted string (a literal newline is kept
    /// between the fragments). End of input mid-continuation terminates
    /// the value as-is.
    fn accumulate_continuations(&mut self) -> Result<(), ParseError> {
        loop {
            if self.value.ends_with(CONTINUATION_MARKER) {
                self.value.truncate_chars(CONTINUATION_MARKER.len());
            } else if self.value.as_str().starts_with('"')
                && !self.value.as_str()[1..].contains('"')
            {
                self.value.append("\n");
            } else {
                return Ok(());
            }

            if !self.read_physical_line()? {
                return Ok(());
            }
            self.value.append(&self.line);
            self.value.trim_trailing_newline();
        }
    }

    /// Read one physical line into `self.line`, stripping the line
    /// terminator. Returns false at end of input.
    fn read_physical_line(&mut self) -> Result<bool, ParseError> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(false);
        }
        self.stats.lines_read += 1;
        if self.line.ends_with('\n') {
            self.line.pop();
            if self.line.ends_with('\r') {
                self.line.pop();
            }
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for DirectiveParser<R> {
    type Item = Result<Directive, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_directive().transpose()
    }
}
