//! Shared field types for clinic records
//!
//! - `AppointmentStatus` and `PaymentStatus`: the two status vocabularies
//! - `Attachment`: a file carried inline as a data URI
//! - amount and date helpers for the loosely-typed string fields

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Appointment lifecycle status
///
/// Stored lowercase; any casing is accepted on read since older blobs
/// mixed `Pending` and `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

/// Ledger payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Completed => "completed",
        }
    }

    /// Label shown to patients and staff
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Partial => "Partially Paid",
            Self::Completed => "Paid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "pending" => Ok(Self::Pending),
            "partial" | "partially paid" => Ok(Self::Partial),
            "completed" | "paid" => Ok(Self::Completed),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

macro_rules! string_enum_serde {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_enum_serde!(AppointmentStatus);
string_enum_serde!(PaymentStatus);

/// A file attached to a record, embedded as a `data:` URI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
    pub data_url: String,
}

impl Attachment {
    /// Encode raw file contents, guessing the MIME type from the name
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(&name).first_or_octet_stream();
        let mime_type = mime.essence_str().to_string();
        let data_url = format!("data:{};base64,{}", mime_type, BASE64.encode(bytes));

        Self {
            name,
            mime_type,
            size: bytes.len() as u64,
            data_url,
        }
    }

    /// Decode the payload, `None` if the data URI is not base64
    pub fn decode(&self) -> Option<Vec<u8>> {
        let (header, payload) = self.data_url.strip_prefix("data:")?.split_once(',')?;
        if !header.ends_with(";base64") {
            return None;
        }
        BASE64.decode(payload).ok()
    }
}

/// Accept a string, a number or null for a field stored as free text.
///
/// Amount fields were written as strings by one form and numbers by another.
pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Error for an amount field that is not a number
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("not a number: {0:?}")]
pub struct AmountError(pub String);

/// Parse a free-text amount. Blank counts as zero; `₹` and `,` are ignored.
pub fn parse_amount(raw: &str) -> Result<f64, AmountError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Ok(0.0);
    }

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AmountError(raw.to_string())),
    }
}

/// Render an amount the way it is stored: `300`, `250.5`
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Parse the date/time formats found in stored records into local time
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a `YYYY-MM-DD` date, also accepting a full date-time
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if raw.len() > 10 && raw.is_char_boundary(10) {
        if let Ok(d) = NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d") {
            return Some(d);
        }
    }
    None
}
