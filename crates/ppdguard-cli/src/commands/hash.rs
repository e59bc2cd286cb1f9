use super::{json_pretty, load_trusted, EXIT_SUCCESS};
use ppdguard_store::{allowlist, ValueSet};
use std::path::{Path, PathBuf};

pub fn run(
    input: &Path,
    output: &Path,
    hash_dirs: &[PathBuf],
    json: bool,
) -> Result<u8, String> {
    let values = ValueSet::load_corpus(input).map_err(|e| e.to_string())?;

    let mut trusted = load_trusted(hash_dirs);
    let trusted_count = trusted.len();

    // De-duplicate against the existing output file as well, so append
    // runs never write the same digest twice.
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
            "values": values.len(),
            "trusted": trusted_count,
            "net_new": net_new.len(),
            "written": all.len(),
            "output": output.display().to_string(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "hashed {} value(s): {} net-new digest(s), {} total in {}",
            values.len(),
            net_new.len(),
            all.len(),
            output.display()
        );
    }

    Ok(EXIT_SUCCESS)
}
