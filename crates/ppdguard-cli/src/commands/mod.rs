pub mod check;
pub mod completions;
pub mod generate;
pub mod hash;
pub mod man_pages;
pub mod scan;

use crate::collection;
use indicatif::{ProgressBar, ProgressStyle};
use ppdguard_ppd::DirectiveParser;
use ppdguard_store::{LoadPolicy, TrustedHashStore, ValueSet};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_RESOURCE_ERROR: u8 = 2;
pub const EXIT_UNTRUSTED: u8 = 3;

/// Hash directories shipped by the distribution and managed by the
/// administrator, scanned in that order.
pub const SYSTEM_HASH_DIR: &str = "/usr/share/ppdguard/hashes";
pub const ADMIN_HASH_DIR: &str = "/etc/ppdguard/hashes";

pub fn json_pretty(value: &impl Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Load the trusted store from the given directories, or from the
/// built-in system/admin pair when none are given.
///
/// `PPDGUARD_UNSAFE_HASH_DIRS=1` relaxes the root-ownership requirement
/// so unprivileged runs and tests can use their own directories; the
/// not-group/world-writable and no-symlink rules always apply.
pub fn load_trusted(hash_dirs: &[PathBuf]) -> TrustedHashStore {
    let policy = if std::env::var("PPDGUARD_UNSAFE_HASH_DIRS").as_deref() == Ok("1") {
        LoadPolicy {
            require_root_owned: false,
        }
    } else {
        LoadPolicy::default()
    };

    if hash_dirs.is_empty() {
        TrustedHashStore::load_dirs(
            [Path::new(SYSTEM_HASH_DIR), Path::new(ADMIN_HASH_DIR)],
            policy,
        )
    } else {
        TrustedHashStore::load_dirs(hash_dirs, policy)
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub directives_emitted: u64,
    pub format_errors: u64,
    pub values_added: usize,
}

/// Resolve the PPD source arguments and feed every directive value into
/// `values`. Exactly one of `ppd` / `ppd_paths` must be given.
pub fn scan_into(
    values: &mut ValueSet,
    ppd: Option<&Path>,
    ppd_paths: Option<&str>,
    show_progress: bool,
) -> Result<ScanSummary, String> {
    let sources = match (ppd, ppd_paths) {
        (Some(file), None) => vec![file.to_path_buf()],
        (None, Some(spec)) => {
            let roots = collection::split_paths(spec);
            if roots.is_empty() {
                return Err("--ppd-paths contained no usable paths".to_owned());
            }
            collection::find_ppds(&roots).map_err(|e| format!("cannot list PPDs: {e}"))?
        }
        _ => return Err("exactly one of --ppd or --ppd-paths is required".to_owned()),
    };

    if sources.is_empty() {
        return Err("no PPDs found under the given paths".to_owned());
    }

    let pb = (show_progress && sources.len() > 1).then(|| spinner("scanning PPDs..."));

    let mut summary = ScanSummary::default();
    for source in &sources {
        if let Some(pb) = &pb {
            pb.set_message(format!("scanning {}", source.display()));
        }
        let file = File::open(source)
            .map_err(|e| format!("cannot open \"{}\" for reading: {e}", source.display()))?;
        let mut parser = DirectiveParser::new(BufReader::new(file));
        loop {
            match parser.next_directive() {
                Ok(Some(directive)) => {
                    if values.insert(directive.value) {
                        summary.values_added += 1;
                    }
                }
                Ok(None) => break,
                Err(e) => return Err(e.to_string()),
            }
        }
        let stats = parser.stats();
        debug!(
            ppd = %source.display(),
            emitted = stats.directives_emitted,
            "scanned PPD"
        );
        summary.files_scanned += 1;
        summary.directives_emitted += stats.directives_emitted;
        summary.format_errors += stats.format_errors;
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(summary)
}
