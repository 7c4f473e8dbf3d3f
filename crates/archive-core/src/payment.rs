//! Bill payment boundary: a member's request is validated and turned into a
//! payment-intent draft, and a processor behind [`PaymentGateway`] returns
//! the client secret the browser needs to finish the payment.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

pub const CURRENCY: &str = "usd";
pub const PAYMENT_METHOD_TYPES: &[&str] = &["card", "us_bank_account"];
const DEFAULT_NOTE: &str = "Water bill payment";
const SOURCE: &str = "Belmont Terrace Mutual Water Company";

static LEADING_DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?").unwrap());

/// Payment form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Everything the processor needs to open a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntentDraft {
    pub amount_cents: u64,
    pub currency: &'static str,
    pub payment_method_types: Vec<&'static str>,
    pub description: String,
    pub receipt_email: Option<String>,
    pub metadata: BTreeMap<&'static str, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid payment amount")]
    InvalidAmount,
    /// Details stay in the log; members see a generic message.
    #[error("Payment failed. Please try again.")]
    Processor(String),
}

impl PaymentError {
    /// HTTP status the endpoint answers with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingFields | Self::InvalidAmount => 400,
            Self::Processor(_) => 500,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub client_secret: String,
}

/// A payment processor able to open an intent and hand back its client secret.
pub trait PaymentGateway {
    type Error: std::fmt::Display;

    fn create_intent(&self, draft: &PaymentIntentDraft) -> Result<String, Self::Error>;
}

/// Dollar amount such as `"$42.50"`, `"42.5"` or `"1e2"` in whole cents.
/// Trailing garbage after the number is ignored.
pub fn parse_amount_cents(amount: &str) -> Option<u64> {
    let cleaned = amount.replacen('$', "", 1);
    let number = LEADING_DECIMAL_RE.find(cleaned.trim_start())?;
    let dollars: f64 = number.as_str().parse().ok()?;
    let cents = (dollars * 100.0).round();
    if !cents.is_finite() || cents <= 0.0 {
        return None;
    }
    Some(cents as u64)
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.is_empty())
}

impl PaymentRequest {
    pub fn validate(&self) -> Result<PaymentIntentDraft, PaymentError> {
        if self.amount.is_empty() || self.name.is_empty() || self.address.is_empty() {
            return Err(PaymentError::MissingFields);
        }
        let amount_cents = parse_amount_cents(&self.amount).ok_or(PaymentError::InvalidAmount)?;

        let mut metadata = BTreeMap::new();
        metadata.insert("resident_name", self.name.clone());
        metadata.insert("property_address", self.address.clone());
        metadata.insert(
            "note",
            non_empty(&self.note).unwrap_or(DEFAULT_NOTE).to_string(),
        );
        metadata.insert("source", SOURCE.to_string());

        Ok(PaymentIntentDraft {
            amount_cents,
            currency: CURRENCY,
            payment_method_types: PAYMENT_METHOD_TYPES.to_vec(),
            description: format!("Water bill payment — {}", self.address),
            receipt_email: non_empty(&self.email).map(str::to_string),
            metadata,
        })
    }
}

/// Validate a request and open an intent with the processor.
pub fn submit_payment<G: PaymentGateway>(
    gateway: &G,
    request: &PaymentRequest,
) -> Result<PaymentResponse, PaymentError> {
    let draft = request.validate()?;
    match gateway.create_intent(&draft) {
        Ok(client_secret) => Ok(PaymentResponse { client_secret }),
        Err(e) => {
            error!(error = %e, "payment processor rejected intent");
            Err(PaymentError::Processor(e.to_string()))
        }
    }
}
