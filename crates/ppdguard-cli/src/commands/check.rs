use super::{json_pretty, load_trusted, scan_into, EXIT_SUCCESS, EXIT_UNTRUSTED};
use console::Style;
use ppdguard_store::{allowlist, ValueSet};
use std::path::{Path, PathBuf};

/// Report which extracted values are already covered by the trusted hash
/// store. Exit code distinguishes "all trusted" from "untrusted values
/// present" so packaging scripts can gate on it.
pub fn run(
    ppd: Option<&Path>,
    ppd_paths: Option<&str>,
    hash_dirs: &[PathBuf],
    json: bool,
) -> Result<u8, String> {
    let mut values = ValueSet::new();
    scan_into(&mut values, ppd, ppd_paths, !json)?;

    let trusted = load_trusted(hash_dirs);

    let mut untrusted = Vec::new();
    let mut trusted_count = 0usize;
    for value in values.iter() {
        if trusted.contains(&allowlist::digest(value)) {
            trusted_count += 1;
        } else {
            untrusted.push(value.to_owned());
        }
    }

    if json {
        let payload = serde_json::json!({
            "values": values.len(),
            "trusted": trusted_count,
            "untrusted": untrusted,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        let ok = Style::new().green();
        let bad = Style::new().red().bold();
        println!(
            "check: {}/{} value(s) trusted",
            trusted_count,
            values.len()
        );
        for value in &untrusted {
            // Embedded newlines are shown escaped to keep one value per line.
            let display = value.replace('\\', "\\\\").replace('\n', "\\n");
            println!("  {} {}", bad.apply_to("UNTRUSTED"), display);
        }
        if untrusted.is_empty() {
            println!("{}", ok.apply_to("all values trusted"));
        }
    }

    if untrusted.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_UNTRUSTED)
    }
}
