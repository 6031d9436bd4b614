// src/services/promise.rs
use chrono::NaiveDate;

use crate::error::{DateRejection, PromiseRejection};

/// Furthest a commitment date may be from today.
pub const MAX_COMMITMENT_DAYS: i64 = 90;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where a collections conversation stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Step {
    #[default]
    AskingId,
    AskingCause,
    AskingAmount,
    AskingDate,
    AskingChannel,
    AskingConfirmation,
    Closed,
}

/// How willing the client looks, judged by how soon they commit to pay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentIntent {
    High,
    Medium,
    Low,
}

impl PaymentIntent {
    pub fn from_lead_days(days: i64) -> Self {
        match days {
            ..=30 => PaymentIntent::High,
            31..=60 => PaymentIntent::Medium,
            _ => PaymentIntent::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentIntent::High => "alta",
            PaymentIntent::Medium => "media",
            PaymentIntent::Low => "baja",
        }
    }
}

/// Per-session negotiation data, filled in step by step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PromiseCase {
    pub step: Step,
    pub client_id: Option<String>,
    pub cause: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub channel: Option<String>,
    pub intent: Option<PaymentIntent>,
    pub promise_id: Option<u32>,
}

/// Accepts dates after `today` and at most [`MAX_COMMITMENT_DAYS`] away.
pub fn validate_commitment_date(input: &str, today: NaiveDate) -> Result<NaiveDate, DateRejection> {
    let date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| DateRejection::BadFormat)?;

    if date <= today {
        return Err(DateRejection::NotInFuture);
    }
    if (date - today).num_days() > MAX_COMMITMENT_DAYS {
        return Err(DateRejection::TooFar { max_days: MAX_COMMITMENT_DAYS });
    }
    Ok(date)
}

/// Confirmation text for a valid date.
pub fn date_accepted(date: NaiveDate) -> String {
    format!("✅ Fecha válida: {}", date.format(DATE_FORMAT))
}

/// Simulated registration: no store behind it, every promise gets id 1.
pub fn register_promise(
    client_id: &str,
    amount: f64,
    commitment_date: &str,
    notes: &str,
) -> Result<(u32, String), PromiseRejection> {
    if amount <= 0.0 {
        return Err(PromiseRejection::NonPositiveAmount);
    }
    NaiveDate::parse_from_str(commitment_date, DATE_FORMAT).map_err(|_| PromiseRejection::BadDate)?;

    let promise_id = 1;
    let notes = if notes.trim().is_empty() { "Ninguna" } else { notes.trim() };
    let receipt = format!(
        "✅ Promesa de pago registrada (simulada).\n\
         ID promesa: {}\n\
         Cliente: {}\n\
         Monto: ${:.2}\n\
         Fecha compromiso: {}\n\
         Obs: {}",
        promise_id, client_id, amount, commitment_date, notes
    );
    Ok((promise_id, receipt))
}

/// First number in the text, commas read as decimal points.
pub fn parse_amount(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let number: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    number.trim_end_matches('.').parse().ok()
}

/// The first word holding a digit, stripped of surrounding punctuation.
/// Falls back to the whole text so format errors still get reported.
pub fn date_candidate(text: &str) -> &str {
    text.split_whitespace()
        .find(|word| word.chars().any(|c| c.is_ascii_digit()))
        .map(|word| word.trim_matches(|c: char| !c.is_ascii_digit()))
        .unwrap_or_else(|| text.trim())
}

pub fn payment_channel(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    ["transferencia", "ventanilla", "tarjeta"]
        .into_iter()
        .find(|channel| lower.contains(channel))
        .unwrap_or("otro")
}
