//! Payment details captured when an application is accepted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    EWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::EWallet => "e_wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "e_wallet" | "ewallet" => Ok(PaymentMethod::EWallet),
            other => Err(DomainError::invalid_argument(
                "payment_method",
                format!("Unsupported payment method: {}", other),
            )),
        }
    }
}

/// Payment recorded on acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Amount in cents.
    pub amount_cents: i64,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference_number: Option<String>,
}

impl Payment {
    /// # Errors
    ///
    /// `InvalidArgument` for a negative amount.
    pub fn new(
        amount_cents: i64,
        payment_date: NaiveDate,
        method: PaymentMethod,
        reference_number: Option<String>,
    ) -> Result<Self, DomainError> {
        if amount_cents < 0 {
            return Err(DomainError::invalid_argument(
                "payment_amount",
                "payment_amount cannot be negative",
            ));
        }
        Ok(Self {
            amount_cents,
            payment_date,
            method,
            reference_number: reference_number
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        })
    }
}
