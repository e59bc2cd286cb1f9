use super::{json_pretty, scan_into, EXIT_SUCCESS};
use ppdguard_store::ValueSet;
use std::path::Path;

pub fn run(
    ppd: Option<&Path>,
    ppd_paths: Option<&str>,
    output: &Path,
    json: bool,
) -> Result<u8, String> {
    // Append mode: seed from the existing corpus so reruns are additive.
    let mut values = ValueSet::load_corpus(output).map_err(|e| e.to_string())?;
    let existing = values.len();

    let summary = scan_into(&mut values, ppd, ppd_paths, !json)?;

    values.write_corpus(output).map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "files_scanned": summary.files_scanned,
            "directives_emitted": summary.directives_emitted,
            "format_errors": summary.format_errors,
            "values_existing": existing,
            "values_added": summary.values_added,
            "values_total": values.len(),
            "output": output.display().to_string(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "scanned {} PPD(s): {} value(s) added, {} total in {}",
            summary.files_scanned,
            summary.values_added,
            values.len(),
            output.display()
        );
        if summary.format_errors > 0 {
            println!("  {} malformed directive(s) skipped", summary.format_errors);
        }
    }

    Ok(EXIT_SUCCESS)
}
