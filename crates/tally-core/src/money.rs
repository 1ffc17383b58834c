//! Decimal helpers for money math
//!
//! Every monetary value in the engine is a `rust_decimal::Decimal`. Vision
//! output is messy (currency symbols, thousands separators, stray text), so
//! all external numeric input funnels through the lenient parsers here: they
//! are total functions that log a diagnostic and fall back to zero rather
//! than failing the scan. Exact arithmetic happens at full precision;
//! rounding to cents is applied only where a policy calls for it.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Deserializer, Visitor};
use tracing::warn;

/// One cent, the smallest unit any monetary share can differ by.
pub fn cent() -> Decimal {
    Decimal::new(1, 2)
}

/// Parse free-form text into a Decimal, never failing.
///
/// Strips everything except digits, `.` and `-` before parsing; empty or
/// unparsable input yields zero with a warning. This mirrors what receipts
/// actually contain once an AI has transcribed them: "₹1,234.56", "$12",
/// "12.50 INR" all resolve to the obvious amount.
pub fn to_decimal(value: &str) -> Decimal {
    let sanitized: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if sanitized.is_empty() || sanitized == "." || sanitized == "-" {
        return Decimal::ZERO;
    }

    match Decimal::from_str(&sanitized) {
        Ok(d) => d,
        Err(_) => {
            warn!(value, "Could not convert value to Decimal, defaulting to zero");
            Decimal::ZERO
        }
    }
}

/// Convert an f64 from a JSON payload into a Decimal.
///
/// Non-finite values cannot occur in valid JSON but a defect upstream must
/// not poison money math; they log and become zero.
pub fn from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        warn!(value, "Non-finite number in monetary field, defaulting to zero");
        Decimal::ZERO
    })
}

/// Lenient serde deserializer: accepts numbers, numeric strings, or null.
///
/// The single entry point for numeric fields of the vision payload. Anything
/// the sanitizing parsers cannot make sense of becomes zero instead of a
/// deserialization error, so one garbled field never aborts a whole scan.
pub fn lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = Decimal;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, a numeric string, or null")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            Ok(from_f64(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
            Ok(to_decimal(v))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
            Ok(Decimal::ZERO)
        }

        fn visit_none<E: de::Error>(self) -> Result<Decimal, E> {
            Ok(Decimal::ZERO)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

/// Round to cents, half away from zero. Display and quantity-derived totals.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round down (toward zero) to cents. Base share of an even split.
pub fn floor_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Round to a whole unit count, half away from zero. Quantity inference.
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Two-decimal display form. The only place exact values lose precision,
/// and strictly at the presentation boundary.
pub fn to_display(value: Decimal) -> String {
    format!("{:.2}", round_cents(value))
}
