//! Commission invoices for patient referrals.
//!
//! The library half of the crate: [`commission`] turns submitted referral
//! figures into per-patient commission amounts, and [`invoice`] renders
//! them as a tabular A4 PDF. The binary wraps both behind a small CLI.

pub mod commission;
pub mod error;
mod fonts;
pub mod invoice;

pub use commission::{compute, PatientInput, PatientRecord, COMMISSION_TAX_RATE};
pub use error::{InvoiceError, Result};
pub use invoice::{format_amount, generate_invoice_id, render, InvoiceHeader};
