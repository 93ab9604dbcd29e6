// commission-pdf: Generate agent commission invoices for patient referrals

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use commission_pdf::{
    compute, format_amount, generate_invoice_id, render, InvoiceError, InvoiceHeader,
    PatientInput, Result,
};

// ============================================================================
// Constants
// ============================================================================

/// Company address recorded with every invoice
const DEFAULT_ADDRESS: &str = "MEDLY PELITA ABADI\nMedan, Indonesia\nPhone: +62-852-1821-8233";

/// Logo used when none is given on the command line
const DEFAULT_LOGO: &str = "assets/logo.png";

// ============================================================================
// CLI Arguments
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate agent commission invoices for patient referrals")]
struct Args {
    /// Patients file (JSON array of referral entries)
    #[arg(short, long)]
    patients: Option<PathBuf>,

    /// Inline referral entry NAME:BILL:EXCLUDED:RATE:PERCENT, repeatable
    /// (amounts in RM, rate in IDR per RM, percent as a fraction)
    #[arg(short = 'P', long = "patient", value_name = "SPEC")]
    patient: Vec<String>,

    /// Agent identifier printed in the header
    #[arg(short, long, default_value = "")]
    agent_id: String,

    /// Agent the commission is payable to
    #[arg(short = 'n', long, default_value = "")]
    agent_name: String,

    /// Company address recorded with the invoice
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    address: String,

    /// Logo image (file path or URL); skipped with a warning if unloadable
    #[arg(long, default_value = DEFAULT_LOGO)]
    logo: String,

    /// Omit the logo entirely
    #[arg(long)]
    no_logo: bool,

    /// Invoice identifier (defaults to the current UTC+7 timestamp)
    #[arg(long)]
    invoice_id: Option<String>,

    /// Output filename (defaults to invoice_{id}_{agent-id}_{agent-name}.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Gather referral entries from the file and inline specs
    let patients = collect_patients(&args)?;
    if patients.is_empty() {
        return Err(InvoiceError::NoPatients);
    }
    validate_patients(&patients)?;

    let invoice_id = args
        .invoice_id
        .clone()
        .unwrap_or_else(generate_invoice_id);

    let header = InvoiceHeader {
        invoice_id: invoice_id.clone(),
        agent_id: args.agent_id.clone(),
        agent_name: args.agent_name.clone(),
        company_address: args.address.clone(),
        logo_path: if args.no_logo {
            None
        } else {
            Some(args.logo.clone())
        },
    };

    let records = compute(&patients);
    let pdf_bytes = render(&header, &records)?;

    // Determine output filename
    let output_file = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "invoice_{}_{}_{}.pdf",
            invoice_id, args.agent_id, args.agent_name
        ))
    });
    fs::write(&output_file, &pdf_bytes)?;

    let total: f64 = records
        .iter()
        .map(|r| r.commission_to_agent_after_tax)
        .sum();

    println!("✓ Generated: {}", output_file.display());
    println!("  Invoice ID: {}", invoice_id);
    println!("  Patients: {}", records.len());
    println!("  Total commission after tax (IDR): {}", format_amount(total));

    Ok(())
}

// ============================================================================
// Patient Collection
// ============================================================================

fn collect_patients(args: &Args) -> Result<Vec<PatientInput>> {
    let mut patients = Vec::new();
    if let Some(path) = &args.patients {
        patients.extend(load_patients(path)?);
    }
    for spec in &args.patient {
        patients.push(parse_patient_spec(spec)?);
    }
    Ok(patients)
}

fn load_patients(path: &Path) -> Result<Vec<PatientInput>> {
    let content = fs::read_to_string(path)
        .map_err(|e| InvoiceError::PatientFile(format!("{}: {}", path.display(), e)))?;
    let patients: Vec<PatientInput> = serde_json::from_str(&content)
        .map_err(|e| InvoiceError::PatientFile(format!("Invalid JSON: {}", e)))?;
    Ok(patients)
}

/// Parse one NAME:BILL:EXCLUDED:RATE:PERCENT spec. An empty name is
/// allowed; the row simply prints with a blank name cell.
fn parse_patient_spec(spec: &str) -> Result<PatientInput> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 5 {
        return Err(InvoiceError::PatientSpec(spec.to_string()));
    }
    let name = parts[0].trim();

    let parse_number = |field: &'static str, raw: &str| -> Result<f64> {
        raw.trim()
            .parse::<f64>()
            .map_err(|_| InvoiceError::InvalidInput {
                patient: name.to_string(),
                field,
                reason: "must be a number".to_string(),
            })
    };

    Ok(PatientInput {
        patient_name: name.to_string(),
        bill_amount_rm: parse_number("bill amount", parts[1])?,
        excluded_bill_rm: parse_number("excluded bill", parts[2])?,
        rm_to_idr_rate: parse_number("conversion rate", parts[3])?,
        commission_percent: parse_number("commission percent", parts[4])?,
    })
}

/// Every numeric field must be a finite, non-negative number.
fn validate_patients(patients: &[PatientInput]) -> Result<()> {
    for patient in patients {
        let fields = [
            ("bill amount", patient.bill_amount_rm),
            ("excluded bill", patient.excluded_bill_rm),
            ("conversion rate", patient.rm_to_idr_rate),
            ("commission percent", patient.commission_percent),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(InvoiceError::InvalidInput {
                    patient: patient.patient_name.clone(),
                    field,
                    reason: "must be a non-negative number".to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patient_spec() {
        let p = parse_patient_spec("Alice:1000:200:3500:0.1").unwrap();
        assert_eq!(p.patient_name, "Alice");
        assert_eq!(p.bill_amount_rm, 1000.0);
        assert_eq!(p.excluded_bill_rm, 200.0);
        assert_eq!(p.rm_to_idr_rate, 3500.0);
        assert_eq!(p.commission_percent, 0.1);
    }

    #[test]
    fn test_parse_patient_spec_trims_whitespace() {
        let p = parse_patient_spec(" Bob : 10 : 0 : 3400 : 0.05 ").unwrap();
        assert_eq!(p.patient_name, "Bob");
        assert_eq!(p.bill_amount_rm, 10.0);
    }

    #[test]
    fn test_parse_patient_spec_wrong_arity() {
        assert!(matches!(
            parse_patient_spec("Alice:1000:200"),
            Err(InvoiceError::PatientSpec(_))
        ));
        assert!(matches!(
            parse_patient_spec("Alice:1:2:3:4:5"),
            Err(InvoiceError::PatientSpec(_))
        ));
    }

    #[test]
    fn test_parse_patient_spec_bad_number() {
        let err = parse_patient_spec("Alice:abc:0:3500:0.1").unwrap_err();
        assert!(matches!(err, InvoiceError::InvalidInput { .. }));
    }

    #[test]
    fn test_validate_rejects_negative_values() {
        let mut p = parse_patient_spec("Alice:1000:200:3500:0.1").unwrap();
        p.excluded_bill_rm = -1.0;
        let err = validate_patients(&[p]).unwrap_err();
        match err {
            InvoiceError::InvalidInput { patient, field, .. } => {
                assert_eq!(patient, "Alice");
                assert_eq!(field, "excluded bill");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_accepts_zero() {
        let p = parse_patient_spec("Zero:0:0:0:0").unwrap();
        assert!(validate_patients(&[p]).is_ok());
    }
}
