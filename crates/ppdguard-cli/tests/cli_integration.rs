//! CLI subprocess integration tests.
//!
//! These tests invoke the `ppdguard` binary as a subprocess and verify
//! exit codes, output file contents, and JSON output stability.

use std::fs;
use std::path::Path;
use std::process::Command;

// sha256("duplex=%s")
const DUPLEX_HASH: &str = "f6e99747fd4d4bfd92ada364d64559b12b46db567b393626491b601b579e49ef";

fn ppdguard_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ppdguard"));
    // Test hash directories are owned by the test user, not root
    cmd.env("PPDGUARD_UNSAFE_HASH_DIRS", "1");
    cmd
}

fn write_sample_ppd(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("sample.ppd");
    fs::write(
        &path,
        "*PPD-Adobe: \"4.3\"\n\
         *% A comment line\n\
         *FoomaticRIPOptionSetting Duplex: \"duplex=%s\"\n\
         *PageSize Letter: \"<</PageSize[612 792]>>setpagedevice\"\n",
    )
    .unwrap();
    path
}

#[test]
fn cli_version_exits_zero() {
    let output = ppdguard_bin().arg("--version").output().unwrap();
    assert!(output.status.success(), "ppdguard --version must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("ppdguard"),
        "version output must contain 'ppdguard': {stdout}"
    );
}

#[test]
fn cli_help_exits_zero() {
    let output = ppdguard_bin().arg("--help").output().unwrap();
    assert!(output.status.success(), "ppdguard --help must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("scan"), "help must list 'scan' command");
    assert!(stdout.contains("hash"), "help must list 'hash' command");
}

#[test]
fn cli_scan_extracts_values() {
    let dir = tempfile::tempdir().unwrap();
    let ppd = write_sample_ppd(dir.path());
    let corpus = dir.path().join("values.txt");

    let output = ppdguard_bin()
        .args(["scan", "--ppd"])
        .arg(&ppd)
        .arg(&corpus)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "scan must exit 0. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(fs::read_to_string(&corpus).unwrap(), "duplex=%s\n");
}

#[test]
fn cli_scan_rerun_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let ppd = write_sample_ppd(dir.path());
    let corpus = dir.path().join("values.txt");

    for _ in 0..2 {
        let output = ppdguard_bin()
            .args(["scan", "--ppd"])
            .arg(&ppd)
            .arg(&corpus)
            .output()
            .unwrap();
        assert!(output.status.success());
    }
    assert_eq!(fs::read_to_string(&corpus).unwrap(), "duplex=%s\n");
}

#[test]
fn cli_hash_writes_expected_digest() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("values.txt");
    fs::write(&corpus, "duplex=%s\n").unwrap();
    let hashes = dir.path().join("hashes.txt");
    let empty_trusted = dir.path().join("trusted");
    fs::create_dir(&empty_trusted).unwrap();

    let output = ppdguard_bin()
        .arg("hash")
        .arg(&corpus)
        .arg(&hashes)
        .arg("--hash-dir")
        .arg(&empty_trusted)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "hash must exit 0. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        fs::read_to_string(&hashes).unwrap(),
        format!("{DUPLEX_HASH}\n")
    );
}

#[test]
fn cli_hash_skips_already_trusted() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("values.txt");
    fs::write(&corpus, "duplex=%s\n").unwrap();
    let hashes = dir.path().join("hashes.txt");

    let trusted_dir = dir.path().join("trusted");
    fs::create_dir(&trusted_dir).unwrap();
    let trusted_file = trusted_dir.join("vendor.hashes");
    fs::write(&trusted_file, format!("{DUPLEX_HASH}\n")).unwrap();
    // Not group/world writable, or the loader skips it
    let mut perms = fs::metadata(&trusted_file).unwrap().permissions();
    use std::os::unix::fs::PermissionsExt;
    perms.set_mode(0o644);
    fs::set_permissions(&trusted_file, perms).unwrap();

    let output = ppdguard_bin()
        .arg("hash")
        .arg(&corpus)
        .arg(&hashes)
        .arg("--hash-dir")
        .arg(&trusted_dir)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&hashes).unwrap(), "");
}

#[test]
fn cli_generate_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let ppd = write_sample_ppd(dir.path());
    let hashes = dir.path().join("hashes.txt");
    let values = dir.path().join("values.txt");
    let empty_trusted = dir.path().join("trusted");
    fs::create_dir(&empty_trusted).unwrap();

    let output = ppdguard_bin()
        .args(["generate", "--ppd"])
        .arg(&ppd)
        .arg(&hashes)
        .arg("--values")
        .arg(&values)
        .arg("--hash-dir")
        .arg(&empty_trusted)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "generate must exit 0. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        fs::read_to_string(&hashes).unwrap(),
        format!("{DUPLEX_HASH}\n")
    );
    assert_eq!(fs::read_to_string(&values).unwrap(), "duplex=%s\n");
}

#[test]
fn cli_check_flags_untrusted_values() {
    let dir = tempfile::tempdir().unwrap();
    let ppd = write_sample_ppd(dir.path());
    let empty_trusted = dir.path().join("trusted");
    fs::create_dir(&empty_trusted).unwrap();

    let output = ppdguard_bin()
        .args(["check", "--ppd"])
        .arg(&ppd)
        .arg("--hash-dir")
        .arg(&empty_trusted)
        .output()
        .unwrap();

    assert_eq!(
        output.status.code(),
        Some(3),
        "untrusted values must exit 3. stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn cli_check_passes_when_trusted() {
    let dir = tempfile::tempdir().unwrap();
    let ppd = write_sample_ppd(dir.path());

    let trusted_dir = dir.path().join("trusted");
    fs::create_dir(&trusted_dir).unwrap();
    let trusted_file = trusted_dir.join("vendor.hashes");
    fs::write(&trusted_file, format!("{DUPLEX_HASH}\n")).unwrap();
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(&trusted_file).unwrap().permissions();
    perms.set_mode(0o644);
    fs::set_permissions(&trusted_file, perms).unwrap();

    let output = ppdguard_bin()
        .args(["check", "--ppd"])
        .arg(&ppd)
        .arg("--hash-dir")
        .arg(&trusted_dir)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "all-trusted check must exit 0. stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn cli_scan_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let ppd = write_sample_ppd(dir.path());
    let corpus = dir.path().join("values.txt");

    let output = ppdguard_bin()
        .args(["--json", "scan", "--ppd"])
        .arg(&ppd)
        .arg(&corpus)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["values_added"], 1);
    assert_eq!(parsed["files_scanned"], 1);
}

#[test]
fn cli_scan_missing_ppd_fails_with_resource_error() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("values.txt");

    let output = ppdguard_bin()
        .args(["scan", "--ppd", "/no/such/file.ppd"])
        .arg(&corpus)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(!corpus.exists(), "failed scan must not create output");
}

#[test]
fn cli_scan_requires_a_source() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("values.txt");

    let output = ppdguard_bin().arg("scan").arg(&corpus).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_scan_ppd_paths_collection() {
    let dir = tempfile::tempdir().unwrap();
    let collection_a = dir.path().join("a");
    let collection_b = dir.path().join("b");
    fs::create_dir_all(&collection_a).unwrap();
    fs::create_dir_all(&collection_b).unwrap();
    fs::write(
        collection_a.join("one.ppd"),
        "*FoomaticRIPCommandLine: \"gs -one\"\n",
    )
    .unwrap();
    fs::write(
        collection_b.join("two.ppd"),
        "*FoomaticRIPCommandLine: \"gs -two\"\n",
    )
    .unwrap();

    let corpus = dir.path().join("values.txt");
    let spec = format!("{},{}", collection_a.display(), collection_b.display());

    let output = ppdguard_bin()
        .args(["scan", "--ppd-paths", &spec])
        .arg(&corpus)
        .output()
        .unwrap();

    assert!(output.status.success());
    let contents = fs::read_to_string(&corpus).unwrap();
    assert!(contents.contains("gs -one"));
    assert!(contents.contains("gs -two"));
}

#[test]
fn cli_completions_bash() {
    let output = ppdguard_bin().args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ppdguard"));
}
