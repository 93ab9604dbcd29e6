//! Per-patient commission arithmetic.
//!
//! Bills are entered in RM, converted to IDR at a per-patient rate, and the
//! commission is taken on the nett amount. Tax is withheld from the
//! commission and the referring agent receives half of what remains.

use serde::Deserialize;

/// Tax rate withheld from the computed commission.
pub const COMMISSION_TAX_RATE: f64 = 0.10;

/// One referral entry as submitted, amounts in RM except the rate.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientInput {
    pub patient_name: String,
    /// Total bill in RM.
    #[serde(default)]
    pub bill_amount_rm: f64,
    /// Portion of the bill excluded from commission, in RM.
    #[serde(default)]
    pub excluded_bill_rm: f64,
    /// RM to IDR conversion rate applied to both bill figures.
    #[serde(default)]
    pub rm_to_idr_rate: f64,
    /// Commission fraction on the nett amount (0.1 means 10%).
    #[serde(default)]
    pub commission_percent: f64,
}

/// Derived amounts for one patient, all in IDR.
#[derive(Debug, Clone)]
pub struct PatientRecord {
    pub patient_name: String,
    pub total_bill_idr: f64,
    pub excluded_bill_idr: f64,
    pub nett_amount: f64,
    /// Commission fraction carried over from the input.
    pub commission_percent: f64,
    pub commission_before_tax: f64,
    pub commission_after_tax: f64,
    /// The agent's half of the after-tax commission. This is the figure
    /// printed in the invoice table.
    pub commission_to_agent_after_tax: f64,
}

/// Derive the commission amounts for every patient, preserving input order.
pub fn compute(inputs: &[PatientInput]) -> Vec<PatientRecord> {
    inputs.iter().map(derive_record).collect()
}

fn derive_record(input: &PatientInput) -> PatientRecord {
    let total_bill_idr = input.bill_amount_rm * input.rm_to_idr_rate;
    let excluded_bill_idr = input.excluded_bill_rm * input.rm_to_idr_rate;
    let nett_amount = total_bill_idr - excluded_bill_idr;
    let commission_before_tax = nett_amount * input.commission_percent;
    let commission_after_tax = commission_before_tax * (1.0 - COMMISSION_TAX_RATE);
    let commission_to_agent_after_tax = commission_after_tax / 2.0;

    PatientRecord {
        patient_name: input.patient_name.clone(),
        total_bill_idr,
        excluded_bill_idr,
        nett_amount,
        commission_percent: input.commission_percent,
        commission_before_tax,
        commission_after_tax,
        commission_to_agent_after_tax,
    }
}
