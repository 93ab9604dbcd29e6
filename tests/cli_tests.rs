use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn invoice_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("commission-pdf"))
}

#[test]
fn test_help() {
    invoice_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate agent commission invoices",
        ));
}

#[test]
fn test_version() {
    invoice_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("commission-pdf"));
}

#[test]
fn test_summary_reports_total() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("invoice.pdf");

    invoice_cmd()
        .args([
            "-P",
            "Alice:1000:200:3500:0.1",
            "--no-logo",
            "-o",
            output_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Generated:"))
        .stdout(predicate::str::contains("Patients: 1"))
        .stdout(predicate::str::contains("126,000.00"));

    assert!(output_path.exists());
}

#[test]
fn test_default_output_filename() {
    let temp_dir = TempDir::new().unwrap();

    invoice_cmd()
        .current_dir(temp_dir.path())
        .args([
            "-P",
            "Alice:1000:200:3500:0.1",
            "-a",
            "A1",
            "-n",
            "Joko",
            "--invoice-id",
            "20240101000000",
            "--no-logo",
        ])
        .assert()
        .success();

    assert!(temp_dir
        .path()
        .join("invoice_20240101000000_A1_Joko.pdf")
        .exists());
}

#[test]
fn test_default_output_filename_with_empty_agent_fields() {
    let temp_dir = TempDir::new().unwrap();

    // Agent id and name default to empty strings, which appear verbatim
    // in the filename
    invoice_cmd()
        .current_dir(temp_dir.path())
        .args([
            "-P",
            "Alice:1000:200:3500:0.1",
            "--invoice-id",
            "20240101000000",
            "--no-logo",
        ])
        .assert()
        .success();

    assert!(temp_dir
        .path()
        .join("invoice_20240101000000__.pdf")
        .exists());
}

#[test]
fn test_no_patients() {
    invoice_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("No patients given"));
}

#[test]
fn test_malformed_patient_spec() {
    invoice_cmd()
        .args(["-P", "Alice:1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid patient spec"));
}

#[test]
fn test_non_numeric_field_in_spec() {
    invoice_cmd()
        .args(["-P", "Alice:abc:0:3500:0.1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a number"));
}

#[test]
fn test_negative_value_rejected() {
    invoice_cmd()
        .args(["-P", "Alice:1000:-200:3500:0.1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a non-negative number"));
}

#[test]
fn test_negative_value_in_json_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let patients_path = temp_dir.path().join("patients.json");
    fs::write(
        &patients_path,
        r#"[{"patient_name": "Alice", "bill_amount_rm": -1.0}]"#,
    )
    .unwrap();

    invoice_cmd()
        .args(["--patients", patients_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a non-negative number"));
}

#[test]
fn test_invalid_json_patients_file() {
    let temp_dir = TempDir::new().unwrap();
    let patients_path = temp_dir.path().join("patients.json");
    fs::write(&patients_path, "{ not json").unwrap();

    invoice_cmd()
        .args(["--patients", patients_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read patients file"));
}

#[test]
fn test_file_and_inline_patients_combine() {
    let temp_dir = TempDir::new().unwrap();
    let patients_path = temp_dir.path().join("patients.json");
    let output_path = temp_dir.path().join("combined.pdf");
    fs::write(
        &patients_path,
        r#"[{"patient_name": "Alice", "bill_amount_rm": 1000.0, "excluded_bill_rm": 200.0, "rm_to_idr_rate": 3500.0, "commission_percent": 0.1}]"#,
    )
    .unwrap();

    invoice_cmd()
        .args([
            "--patients",
            patients_path.to_str().unwrap(),
            "-P",
            "Bob:500:0:3400:0.05",
            "--no-logo",
            "-o",
            output_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Patients: 2"));

    assert!(output_path.exists());
}
