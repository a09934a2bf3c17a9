//! Load group loans and payment histories from CSV

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;
use thiserror::Error;

use super::{LoanId, LoanTerms, PaymentEvent, PaymentId, sort_payments};
use crate::amortization::ProjectionConfig;

/// Failure while reading input files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: invalid {field}: {value}")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

/// Raw CSV row for a loan in a group file
#[derive(Debug, serde::Deserialize)]
struct LoanRow {
    id: String,
    principal: f64,
    annual_rate_percent: f64,
    #[serde(default)]
    term_months: Option<u32>,
    #[serde(default)]
    installment: Option<f64>,
}

impl LoanRow {
    fn into_loan(self, row: usize) -> Result<(LoanId, LoanTerms), LoadError> {
        if self.annual_rate_percent < 0.0 {
            return Err(LoadError::InvalidField {
                row,
                field: "annual_rate_percent",
                value: self.annual_rate_percent.to_string(),
            });
        }
        if self.term_months.is_none() && self.installment.is_none() {
            return Err(LoadError::InvalidField {
                row,
                field: "installment",
                value: "neither installment nor term_months given".to_string(),
            });
        }

        Ok((
            LoanId::new(self.id),
            LoanTerms {
                principal: self.principal,
                annual_rate_percent: self.annual_rate_percent,
                term_months: self.term_months,
                installment: self.installment,
            },
        ))
    }
}

/// Raw CSV row for one recorded payment
#[derive(Debug, serde::Deserialize)]
struct PaymentRow {
    id: String,
    amount: f64,
    date: String,
    sequence_key: u64,
}

impl PaymentRow {
    fn into_event(self, row: usize) -> Result<PaymentEvent, LoadError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| LoadError::InvalidField {
            row,
            field: "date",
            value: self.date.clone(),
        })?;
        if self.amount <= 0.0 {
            return Err(LoadError::InvalidField {
                row,
                field: "amount",
                value: self.amount.to_string(),
            });
        }

        Ok(PaymentEvent {
            id: PaymentId::new(self.id),
            amount: self.amount,
            date,
            sequence_key: self.sequence_key,
        })
    }
}

/// Load group loans from a CSV file
pub fn load_group_loans<P: AsRef<Path>>(path: P) -> Result<Vec<(LoanId, LoanTerms)>, LoadError> {
    let mut reader = Reader::from_path(path)?;
    read_loans(&mut reader)
}

/// Load group loans from any reader
pub fn load_group_loans_from_reader<R: Read>(reader: R) -> Result<Vec<(LoanId, LoanTerms)>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    read_loans(&mut csv_reader)
}

fn read_loans<R: Read>(reader: &mut Reader<R>) -> Result<Vec<(LoanId, LoanTerms)>, LoadError> {
    let mut loans = Vec::new();
    for (index, result) in reader.deserialize().enumerate() {
        let row: LoanRow = result?;
        loans.push(row.into_loan(index + 1)?);
    }
    log::info!("loaded {} loans", loans.len());
    Ok(loans)
}

/// Load a payment history from a CSV file, sorted into replay order
pub fn load_payment_history<P: AsRef<Path>>(path: P) -> Result<Vec<PaymentEvent>, LoadError> {
    let mut reader = Reader::from_path(path)?;
    read_payments(&mut reader)
}

/// Load a payment history from any reader, sorted into replay order
pub fn load_payment_history_from_reader<R: Read>(reader: R) -> Result<Vec<PaymentEvent>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    read_payments(&mut csv_reader)
}

fn read_payments<R: Read>(reader: &mut Reader<R>) -> Result<Vec<PaymentEvent>, LoadError> {
    let mut payments = Vec::new();
    for (index, result) in reader.deserialize().enumerate() {
        let row: PaymentRow = result?;
        payments.push(row.into_event(index + 1)?);
    }
    sort_payments(&mut payments);
    log::info!("loaded {} payments", payments.len());
    Ok(payments)
}

/// Load a projection configuration from a JSON file; omitted fields take
/// their defaults
pub fn load_projection_config<P: AsRef<Path>>(path: P) -> Result<ProjectionConfig, LoadError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
