//! Built-in attribute validators
//!
//! Null and unknown values are never validated; required-ness is checked by
//! the host. String validators applied to a list or set attribute check each
//! element.

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{AttributePath, Diagnostic, Dynamic};
use regex::Regex;

fn strings_of(value: &Dynamic, path: &AttributePath) -> Vec<(String, AttributePath)> {
    match value {
        Dynamic::String(s) => vec![(s.clone(), path.clone())],
        Dynamic::List(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                item.as_str()
                    .map(|s| (s.to_string(), path.clone().index(i as i64)))
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Accepts only values from a fixed set, e.g. an enum's wire names
pub struct StringInSlice {
    allowed: Vec<String>,
}

impl StringInSlice {
    pub fn create(allowed: &[&str]) -> Box<dyn Validator> {
        Box::new(Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl Validator for StringInSlice {
    fn description(&self) -> String {
        format!("value must be one of [{}]", self.allowed.join(", "))
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let diagnostics = strings_of(&request.config_value.value, &request.path)
            .into_iter()
            .filter(|(s, _)| !self.allowed.iter().any(|a| a == s))
            .map(|(s, path)| {
                Diagnostic::error(
                    format!("Invalid value for {}", path),
                    format!("expected one of [{}], got \"{}\"", self.allowed.join(", "), s),
                )
                .with_attribute(path)
            })
            .collect();
        ValidatorResponse { diagnostics }
    }
}

/// Bounds the length of a string in characters
pub struct StringLength {
    min: Option<usize>,
    max: Option<usize>,
}

impl StringLength {
    pub fn create(min: Option<usize>, max: Option<usize>) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }

    pub fn between(min: usize, max: usize) -> Box<dyn Validator> {
        Self::create(Some(min), Some(max))
    }
}

impl Validator for StringLength {
    fn description(&self) -> String {
        format!(
            "string length must be between {} and {}",
            self.min.map_or("0".to_string(), |m| m.to_string()),
            self.max.map_or("unbounded".to_string(), |m| m.to_string())
        )
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        for (s, path) in strings_of(&request.config_value.value, &request.path) {
            let len = s.chars().count();
            if self.min.is_some_and(|min| len < min) || self.max.is_some_and(|max| len > max) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid length for {}", path),
                        format!("{}, got {}", self.description(), len),
                    )
                    .with_attribute(path),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

/// Requires a regular expression match
pub struct StringPattern {
    pattern: Regex,
    message: String,
}

impl StringPattern {
    /// A pattern that fails to compile reports an error on every validation.
    pub fn create(pattern: &str, message: &str) -> Box<dyn Validator> {
        match Regex::new(pattern) {
            Ok(pattern) => Box::new(Self {
                pattern,
                message: message.to_string(),
            }),
            Err(e) => Box::new(InvalidPattern(e.to_string())),
        }
    }
}

impl Validator for StringPattern {
    fn description(&self) -> String {
        self.message.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let diagnostics = strings_of(&request.config_value.value, &request.path)
            .into_iter()
            .filter(|(s, _)| !self.pattern.is_match(s))
            .map(|(s, path)| {
                Diagnostic::error(
                    format!("Invalid value for {}", path),
                    format!("{}: \"{}\"", self.message, s),
                )
                .with_attribute(path)
            })
            .collect();
        ValidatorResponse { diagnostics }
    }
}

struct InvalidPattern(String);

impl Validator for InvalidPattern {
    fn description(&self) -> String {
        format!("invalid pattern: {}", self.0)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        ValidatorResponse {
            diagnostics: vec![Diagnostic::error(
                "Invalid validator pattern",
                self.0.clone(),
            )
            .with_attribute(request.path)],
        }
    }
}

/// Inclusive numeric bounds
pub struct NumberRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl NumberRange {
    pub fn create(min: Option<f64>, max: Option<f64>) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }

    pub fn at_least(min: f64) -> Box<dyn Validator> {
        Self::create(Some(min), None)
    }
}

impl Validator for NumberRange {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("value must be between {} and {}", min, max),
            (Some(min), None) => format!("value must be at least {}", min),
            (None, Some(max)) => format!("value must be at most {}", max),
            (None, None) => "any number".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(n) = request.config_value.value.as_number() {
            if self.min.is_some_and(|min| n < min) || self.max.is_some_and(|max| n > max) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Value out of range for {}", request.path),
                        format!("{}, got {}", self.description(), n),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

/// Bounds the number of elements of a list or set attribute
pub struct ListLength {
    min: Option<usize>,
    max: Option<usize>,
}

impl ListLength {
    pub fn create(min: Option<usize>, max: Option<usize>) -> Box<dyn Validator> {
        Box::new(Self { min, max })
    }
}

impl Validator for ListLength {
    fn description(&self) -> String {
        format!(
            "list must have between {} and {} items",
            self.min.unwrap_or(0),
            self.max.map_or("unbounded".to_string(), |m| m.to_string())
        )
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(items) = request.config_value.value.as_list() {
            let len = items.len();
            if self.min.is_some_and(|min| len < min) || self.max.is_some_and(|max| len > max) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid number of items for {}", request.path),
                        format!("{}, got {}", self.description(), len),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DynamicValue;

    fn run(validator: &dyn Validator, value: Dynamic) -> Vec<Diagnostic> {
        validator
            .validate(ValidatorRequest {
                config_value: DynamicValue::new(value),
                path: AttributePath::new("field"),
            })
            .diagnostics
    }

    #[test]
    fn string_in_slice_accepts_known_value() {
        let validator = StringInSlice::create(&["NONE", "OFF", "ON"]);
        assert!(run(validator.as_ref(), Dynamic::string("OFF")).is_empty());
    }

    #[test]
    fn string_in_slice_rejects_unknown_value() {
        let validator = StringInSlice::create(&["NONE", "OFF", "ON"]);
        let diags = run(validator.as_ref(), Dynamic::string("MAYBE"));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].detail.contains("MAYBE"));
    }

    #[test]
    fn string_in_slice_checks_each_list_element() {
        let validator = StringInSlice::create(&["NTP", "DNS"]);
        let diags = run(
            validator.as_ref(),
            Dynamic::List(vec![Dynamic::string("NTP"), Dynamic::string("SMTP")]),
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].attribute,
            Some(AttributePath::new("field").index(1))
        );
    }

    #[test]
    fn null_and_unknown_values_are_skipped() {
        let validator = StringLength::between(1, 64);
        assert!(run(validator.as_ref(), Dynamic::Null).is_empty());
        assert!(run(validator.as_ref(), Dynamic::Unknown).is_empty());
    }

    #[test]
    fn string_length_rejects_too_long() {
        let validator = StringLength::between(1, 3);
        let diags = run(validator.as_ref(), Dynamic::string("toolong"));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("Invalid length"));
    }

    #[test]
    fn string_pattern_validates_hex() {
        let validator = StringPattern::create(r"^0[xX][0-9a-fA-F]+$", "must be a hex string");
        assert!(run(validator.as_ref(), Dynamic::string("0x80001f88")).is_empty());
        assert_eq!(run(validator.as_ref(), Dynamic::string("80001f88")).len(), 1);
    }

    #[test]
    fn invalid_pattern_reports_instead_of_panicking() {
        let validator = StringPattern::create("(", "broken");
        let diags = run(validator.as_ref(), Dynamic::string("x"));
        assert_eq!(diags[0].summary, "Invalid validator pattern");
    }

    #[test]
    fn number_range_rejects_too_small() {
        let validator = NumberRange::at_least(0.0);
        assert_eq!(run(validator.as_ref(), Dynamic::Number(-1.0)).len(), 1);
        assert!(run(validator.as_ref(), Dynamic::Number(0.0)).is_empty());
    }

    #[test]
    fn list_length_enforces_max() {
        let validator = ListLength::create(Some(1), Some(2));
        let list = Dynamic::List(vec![Dynamic::Null, Dynamic::Null, Dynamic::Null]);
        assert_eq!(run(validator.as_ref(), list).len(), 1);
        assert_eq!(run(validator.as_ref(), Dynamic::List(vec![])).len(), 1);
    }
}
