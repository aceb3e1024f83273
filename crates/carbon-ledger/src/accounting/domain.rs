use serde::{Deserialize, Serialize};

/// Well-known ledger categories produced by the capture helpers.
///
/// Categories stay free text on [`LedgerEntry`](super::LedgerEntry) because classification is
/// driven by whatever the user typed; these are the labels the crate itself writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Building,
    Energy,
    Mobility,
    Purchases,
    Digital,
    Waste,
}

impl Category {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Building => "Building",
            Self::Energy => "Energy",
            Self::Mobility => "Mobility",
            Self::Purchases => "Purchases",
            Self::Digital => "Digital",
            Self::Waste => "Waste",
        }
    }
}

/// Malformed or out-of-domain numeric input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must not be negative (found {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} expects a number, found '{raw}'")]
    NotNumeric { field: &'static str, raw: String },
    #[error("{field} must be within [{min}, {max}] (found {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite { field })
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    let value = ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

pub(crate) fn ensure_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, ValidationError> {
    let value = ensure_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Parses user supplied text as a number, accepting a decimal comma.
pub fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    let parsed = trimmed
        .parse::<f64>()
        .or_else(|_| trimmed.replace(',', ".").parse::<f64>())
        .map_err(|_| ValidationError::NotNumeric {
            field,
            raw: raw.to_string(),
        })?;
    ensure_finite(field, parsed)
}

/// Divisor floored at one, used wherever a head count or day count could be zero.
pub(crate) fn floored_divisor(value: f64) -> f64 {
    if value.is_finite() && value >= 1.0 {
        value
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_accepts_decimal_comma() {
        assert_eq!(parse_number("quantity", " 12,5 ").expect("parses"), 12.5);
        assert_eq!(parse_number("quantity", "1e3").expect("parses"), 1000.0);
    }

    #[test]
    fn parse_number_rejects_text_and_non_finite_values() {
        assert_eq!(
            parse_number("factor", "abc"),
            Err(ValidationError::NotNumeric {
                field: "factor",
                raw: "abc".to_string()
            })
        );
        assert_eq!(
            parse_number("factor", "inf"),
            Err(ValidationError::NonFinite { field: "factor" })
        );
    }

    #[test]
    fn floored_divisor_never_returns_less_than_one() {
        assert_eq!(floored_divisor(0.0), 1.0);
        assert_eq!(floored_divisor(0.4), 1.0);
        assert_eq!(floored_divisor(f64::NAN), 1.0);
        assert_eq!(floored_divisor(27.0), 27.0);
    }
}
