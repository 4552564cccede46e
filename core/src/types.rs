//! Domain DTOs for the expense API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! The service is lenient about two fields, so the client is too: `amount`
//! may arrive as a JSON number or a numeric string, and `date` may be a bare
//! ISO date or a full RFC 3339 timestamp. Only the calendar date is kept.

use chrono::{DateTime, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize};

/// A single expense record, as assigned and returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    #[serde(alias = "_id")]
    pub id: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub category: String,
}

/// A category label derived by the service from the expenses it has seen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
}

/// Validated payload for creating a new expense.
///
/// Produced by [`crate::ExpenseForm::validate`]; never built from unchecked
/// user input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub category: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Number(f64),
    Text(String),
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match AmountRepr::deserialize(deserializer)? {
        AmountRepr::Number(n) => Ok(n),
        AmountRepr::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| de::Error::custom(format!("invalid amount {s:?}: {e}"))),
    }
}

/// Parse a service date: `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to
/// its date.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|e| format!("invalid date {raw:?}: {e}"))
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(de::Error::custom)
    }
}
