//! Field extraction and validation for raw record payloads
//!
//! Records arrive as JSON objects whose values may be strings, numbers or
//! booleans depending on the sender. `null`, absent and blank values are
//! "missing"; they are reported by [`missing_fields`] and never count as an
//! invalid type.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use super::RecordError;

/// `true` when the value is absent, `null`, or a blank string
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Names of the required fields that are missing, in declaration order
pub fn missing_fields(raw: &Map<String, Value>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| is_blank(raw.get(**name)))
        .map(|name| name.to_string())
        .collect()
}

/// Reads typed fields out of a raw record, collecting every violation
/// instead of stopping at the first one.
pub struct FieldReader<'a> {
    raw: &'a Map<String, Value>,
    fields: Vec<String>,
    violations: Vec<String>,
}

impl<'a> FieldReader<'a> {
    pub fn new(raw: &'a Map<String, Value>) -> Self {
        Self {
            raw,
            fields: Vec::new(),
            violations: Vec::new(),
        }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        let value = self.raw.get(name);
        if is_blank(value) { None } else { value }
    }

    /// Record a violation for `field`
    pub fn violation(&mut self, field: &str, message: impl std::fmt::Display) {
        if !self.fields.iter().any(|f| f == field) {
            self.fields.push(field.to_string());
        }
        self.violations.push(format!("{field}: {message}"));
    }

    /// Text field, trimmed. Numbers are accepted and rendered as text.
    pub fn text(&mut self, name: &str, max_len: usize) -> Option<String> {
        let text = match self.get(name)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.violation(name, "must be a string");
                return None;
            }
        };
        if text.chars().count() > max_len {
            self.violation(name, format!("must be at most {max_len} characters"));
            return None;
        }
        Some(text)
    }

    /// Numeric field (JSON number or numeric string) within `[min, max]`
    pub fn decimal(&mut self, name: &str, min: Decimal, max: Option<Decimal>) -> Option<Decimal> {
        let value = self.number(name)?;
        if value < min {
            self.violation(name, format!("must be greater than or equal to {min}"));
            return None;
        }
        if let Some(max) = max
            && value > max
        {
            self.violation(name, format!("must be between {min} and {max}"));
            return None;
        }
        Some(value)
    }

    /// Numeric field strictly greater than zero
    pub fn positive_decimal(&mut self, name: &str) -> Option<Decimal> {
        let value = self.number(name)?;
        if value <= Decimal::ZERO {
            self.violation(name, "must be greater than 0");
            return None;
        }
        Some(value)
    }

    /// 0/1 flag; also accepts `"0"`/`"1"` and booleans
    pub fn flag(&mut self, name: &str) -> Option<bool> {
        let parsed = match self.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(s) => match s.trim() {
                "0" => Some(false),
                "1" => Some(true),
                _ => None,
            },
            _ => None,
        };
        if parsed.is_none() {
            self.violation(name, "must be 0 or 1");
        }
        parsed
    }

    fn number(&mut self, name: &str) -> Option<Decimal> {
        let text = match self.get(name)? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => {
                self.violation(name, "must be a number");
                return None;
            }
        };
        match parse_decimal(&text) {
            Ok(value) => Some(value),
            Err(NumberError::NotANumber) => {
                self.violation(name, "must be a number");
                None
            }
            Err(NumberError::OutOfRange) => {
                self.violation(name, "is outside the supported numeric range");
                None
            }
        }
    }

    /// `Ok` when no violation was recorded
    pub fn finish(self) -> Result<(), RecordError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(RecordError::Invalid {
                fields: self.fields,
                violations: self.violations,
            })
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum NumberError {
    NotANumber,
    /// Well-formed but too large or too precise for a decimal
    OutOfRange,
}

/// Plain or scientific notation; digit separators are not accepted
fn parse_decimal(s: &str) -> Result<Decimal, NumberError> {
    if s.contains('_') {
        return Err(NumberError::NotANumber);
    }
    if let Ok(value) = Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)) {
        return Ok(value);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Err(NumberError::OutOfRange),
        _ => Err(NumberError::NotANumber),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_missing_fields_treats_null_and_blank_as_missing() {
        let raw = map(json!({ "reference": "  ", "name": null, "vat": 19 }));
        assert_eq!(
            missing_fields(&raw, &["reference", "name", "vat", "packing"]),
            vec!["reference", "name", "packing"]
        );
    }

    #[test]
    fn test_text_trims_and_accepts_numbers() {
        let raw = map(json!({ "name": "  Arroz  ", "reference": 1234 }));
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.text("name", 10).as_deref(), Some("Arroz"));
        assert_eq!(reader.text("reference", 10).as_deref(), Some("1234"));
        assert_eq!(reader.text("absent", 10), None);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_text_too_long() {
        let raw = map(json!({ "name": "abcdef" }));
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.text("name", 5), None);
        let err = reader.finish().unwrap_err();
        assert_eq!(err.to_string(), "Invalid fields: name: must be at most 5 characters");
        assert_eq!(err.fields(), vec!["name"]);
    }

    #[test]
    fn test_decimal_parsing_and_ranges() {
        let raw = map(json!({
            "price": "1500.50",
            "vat": 19,
            "discount": 120,
            "stock": -1,
            "rate": "abc",
            "sci": "1e3",
        }));
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.decimal("price", Decimal::ZERO, None), Some(Decimal::new(150050, 2)));
        assert_eq!(reader.decimal("vat", Decimal::ZERO, Some(Decimal::from(100))), Some(Decimal::from(19)));
        assert_eq!(reader.decimal("sci", Decimal::ZERO, None), Some(Decimal::from(1000)));
        assert_eq!(reader.decimal("discount", Decimal::ZERO, Some(Decimal::from(100))), None);
        assert_eq!(reader.decimal("stock", Decimal::ZERO, None), None);
        assert_eq!(reader.decimal("rate", Decimal::ZERO, None), None);
        assert_eq!(reader.decimal("missing", Decimal::ZERO, None), None);

        let err = reader.finish().unwrap_err();
        assert_eq!(err.fields(), vec!["discount", "stock", "rate"]);
        let message = err.to_string();
        assert!(message.contains("discount: must be between 0 and 100"));
        assert!(message.contains("stock: must be greater than or equal to 0"));
        assert!(message.contains("rate: must be a number"));
    }

    #[test]
    fn test_decimal_rejects_separators_and_reports_range() {
        let raw = map(json!({ "price": "1_000", "tiny": "1e-40", "huge": "1e40", "word": "inf" }));
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.decimal("price", Decimal::ZERO, None), None);
        assert_eq!(reader.decimal("tiny", Decimal::ZERO, None), None);
        assert_eq!(reader.decimal("huge", Decimal::ZERO, None), None);
        assert_eq!(reader.decimal("word", Decimal::ZERO, None), None);

        let message = reader.finish().unwrap_err().to_string();
        assert!(message.contains("price: must be a number"));
        assert!(message.contains("tiny: is outside the supported numeric range"));
        assert!(message.contains("huge: is outside the supported numeric range"));
        assert!(message.contains("word: must be a number"));
    }

    #[test]
    fn test_positive_decimal() {
        let raw = map(json!({ "inc": 0, "ok": "0.5" }));
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.positive_decimal("inc"), None);
        assert_eq!(reader.positive_decimal("ok"), Some(Decimal::new(5, 1)));
        assert_eq!(reader.finish().unwrap_err().fields(), vec!["inc"]);
    }

    #[test]
    fn test_flag() {
        let raw = map(json!({ "a": 1, "b": "0", "c": true, "d": 2, "e": "yes", "f": null }));
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.flag("a"), Some(true));
        assert_eq!(reader.flag("b"), Some(false));
        assert_eq!(reader.flag("c"), Some(true));
        assert_eq!(reader.flag("d"), None);
        assert_eq!(reader.flag("e"), None);
        assert_eq!(reader.flag("f"), None);
        assert_eq!(reader.finish().unwrap_err().fields(), vec!["d", "e"]);
    }
}
