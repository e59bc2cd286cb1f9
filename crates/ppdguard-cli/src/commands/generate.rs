use super::{json_pretty, load_trusted, scan_into, EXIT_SUCCESS};
use ppdguard_store::{allowlist, ValueSet};
use std::path::{Path, PathBuf};

/// `scan` and `hash` in one pass: PPD source straight to a hash file,
/// optionally persisting the raw values alongside.
pub fn run(
    ppd: Option<&Path>,
    ppd_paths: Option<&str>,
    output: &Path,
    values_out: Option<&Path>,
    hash_dirs: &[PathBuf],
    json: bool,
) -> Result<u8, String> {
    let mut values = match values_out {
        // When a corpus file is requested it is extended, not replaced.
        Some(path) => ValueSet::load_corpus(path).map_err(|e| e.to_string())?,
        None => ValueSet::new(),
    };

    let summary = scan_into(&mut values, ppd, ppd_paths, !json)?;

    if let Some(path) = values_out {
        values.write_corpus(path).map_err(|e| e.to_string())?;
    }

    let mut trusted = load_trusted(hash_dirs);
    let existing = allowlist::load_records(output).map_err(|e| e.to_string())?;
    for record in &existing {
        trusted.insert(record.clone());
    }

    let net_new = allowlist::build_net_new(&values, &trusted);

    let mut all = existing;
    all.extend(net_new.iter().cloned());
    allowlist::write_records(&all, output).map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "files_scanned": summary.files_scanned,
            "format_errors": summary.format_errors,
            "values": values.len(),
            "net_new": net_new.len(),
            "written": all.len(),
            "output": output.display().to_string(),
            "values_output": values_out.map(|p| p.display().to_string()),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "scanned {} PPD(s): {} net-new digest(s), {} total in {}",
            summary.files_scanned,
            net_new.len(),
            all.len(),
            output.display()
        );
        if let Some(path) = values_out {
            println!("  raw values written to {}", path.display());
        }
    }

    Ok(EXIT_SUCCESS)
}
