use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LETTER: &str = "\
PT BOSOWA BANDAR AGENSI
CABANG MAKASSAR
Jl. Nusantara No. 12 Makassar
Nomor : 001/BBA-MKS/XII/2025
Perihal : Tagihan Jasa Keagenan
Makassar, 02 December 2025
Jasa pandu 100.000,00
Jasa tunda 200.000,00
Jasa tambat 300.000,00
Hormat kami,
";

fn surat(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("surat").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path()).env("HOME", dir.path());
    cmd
}

fn write_letter(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    surat(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_preview_json() {
    let dir = TempDir::new().unwrap();
    let input = write_letter(dir.path(), "letter.txt", LETTER);

    surat(&dir)
        .arg("preview")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""letterNumber": "001/BBA-MKS/XII/2025""#))
        .stdout(predicate::str::contains(r#""tanggalSurat": "2025-12-02""#))
        .stdout(predicate::str::contains(r#""namaPengirim": "PT BOSOWA BANDAR AGENSI""#));
}

#[test]
fn test_preview_text_with_confidence() {
    let dir = TempDir::new().unwrap();
    let input = write_letter(dir.path(), "letter.txt", LETTER);

    surat(&dir)
        .args(["preview", "--format", "text", "--show-confidence"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Subject: Tagihan Jasa Keagenan"))
        .stdout(predicate::str::contains("Total: Rp 600.000"))
        .stderr(predicate::str::contains("Confidence:"));
}

#[test]
fn test_preview_json_with_confidence_stays_json() {
    let dir = TempDir::new().unwrap();
    let input = write_letter(dir.path(), "letter.txt", LETTER);

    let output = surat(&dir)
        .args(["preview", "--show-confidence"])
        .arg(&input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["letterNumber"], "001/BBA-MKS/XII/2025");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Overall:"));
}

#[test]
fn test_preview_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_letter(dir.path(), "letter.txt", LETTER);
    let output = dir.path().join("out.csv");

    surat(&dir)
        .args(["preview", "--format", "csv", "--output"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("letter_number,letter_date"));
    assert!(csv.contains("001/BBA-MKS/XII/2025,2025-12-02"));
}

#[test]
fn test_preview_missing_file() {
    let dir = TempDir::new().unwrap();
    surat(&dir)
        .args(["preview", "/nonexistent/letter.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_preview_rejects_image() {
    let dir = TempDir::new().unwrap();
    let input = write_letter(dir.path(), "scan.jpg", "not really an image");

    surat(&dir)
        .arg("preview")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("run OCR on it first"));
}

#[test]
fn test_batch_with_summary() {
    let dir = TempDir::new().unwrap();
    write_letter(dir.path(), "a.txt", LETTER);
    write_letter(dir.path(), "b.txt", "Perihal: Undangan Rapat\nTanggal 5 Januari 2025\n");
    let out = dir.path().join("out");
    let pattern = dir.path().join("*.txt");

    surat(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("2 successful"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.contains("success"));
    assert!(summary.contains("Undangan Rapat"));
}

#[test]
fn test_batch_no_matches() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.txt");

    surat(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_batch_continue_on_error() {
    let dir = TempDir::new().unwrap();
    write_letter(dir.path(), "a.txt", LETTER);
    write_letter(dir.path(), "scan.png", "pixels");
    let pattern = dir.path().join("*");

    surat(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--continue-on-error")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful"))
        .stdout(predicate::str::contains("1 failed"));

    surat(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure();
}

#[test]
fn test_batch_rejects_short_timeout() {
    let dir = TempDir::new().unwrap();
    write_letter(dir.path(), "a.txt", LETTER);
    let pattern = dir.path().join("*.txt");

    surat(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .args(["--timeout-ms", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_ms must be at least 1000"));
}

#[test]
fn test_config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("surat.json");
    let config = config.to_str().unwrap();

    surat(&dir)
        .args(["--config", config, "config", "init"])
        .assert()
        .success();

    surat(&dir)
        .args(["--config", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    surat(&dir)
        .args(["--config", config, "config", "get", "queue.timeout_ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("120000"));

    surat(&dir)
        .args(["--config", config, "config", "set", "queue.concurrency", "3"])
        .assert()
        .success();

    surat(&dir)
        .args(["--config", config, "config", "get", "queue.concurrency"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));
}

#[test]
fn test_config_set_rejects_bad_values() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("surat.json");
    let config = config.to_str().unwrap();

    surat(&dir)
        .args(["--config", config, "config", "set", "queue.no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));

    surat(&dir)
        .args(["--config", config, "config", "set", "queue.concurrency", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("concurrency must be at least 1"));

    assert!(!Path::new(config).exists());
}
