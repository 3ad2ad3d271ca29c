//! Validation System - Rules Produce Violations
//!
//! A form is accepted only when no rule reports an error. Warnings are
//! recorded but never block.

use serde::{Deserialize, Serialize};

use crate::builder::{parse_date, EyeColor, FormField, RecordForm, Sex};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub field: FormField,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<ValidationViolation>) -> Self {
        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        Self { valid, violations }
    }

    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations.iter().filter(|v| v.severity == ViolationSeverity::Error)
    }

    /// One line per error, `field: message`, joined with `; `.
    pub fn summary(&self) -> String {
        let messages: Vec<_> = self
            .errors()
            .map(|v| format!("{}: {}", v.field.key(), v.message))
            .collect();
        messages.join("; ")
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, form: &RecordForm) -> Vec<ValidationViolation>;
}

impl ValidationViolation {
    fn error(rule: &str, field: FormField, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            field,
            severity: ViolationSeverity::Error,
            message: message.into(),
            expected: None,
            actual: None,
            remediation: vec![],
        }
    }
}

// --- Concrete Rules ---

pub struct RequiredFieldsRule;

impl ValidationRule for RequiredFieldsRule {
    fn name(&self) -> &'static str { "required" }

    fn validate(&self, form: &RecordForm) -> Vec<ValidationViolation> {
        FormField::REQUIRED
            .iter()
            .filter(|field| form.is_blank(**field))
            .map(|field| ValidationViolation {
                remediation: vec![format!("Enter a value for {}", field.label())],
                ..ValidationViolation::error(self.name(), *field, format!("{} is required", field.label()))
            })
            .collect()
    }
}

pub struct DateFormatRule;

impl ValidationRule for DateFormatRule {
    fn name(&self) -> &'static str { "date_format" }

    fn validate(&self, form: &RecordForm) -> Vec<ValidationViolation> {
        [FormField::DateOfBirth, FormField::IssueDate, FormField::ExpiryDate]
            .into_iter()
            .filter_map(|field| {
                let raw = form.optional(field)?;
                if parse_date(raw).is_some() {
                    return None;
                }
                Some(ValidationViolation {
                    expected: Some("YYYY-MM-DD, DD/MM/YYYY or DD.MM.YYYY".to_string()),
                    actual: Some(raw.to_string()),
                    remediation: vec!["Pick the date from the calendar".to_string()],
                    ..ValidationViolation::error(self.name(), field, "Not a valid date")
                })
            })
            .collect()
    }
}

pub struct DateOrderRule;

impl ValidationRule for DateOrderRule {
    fn name(&self) -> &'static str { "date_order" }

    fn validate(&self, form: &RecordForm) -> Vec<ValidationViolation> {
        let issue = form.optional(FormField::IssueDate).and_then(parse_date);
        let expiry = form.optional(FormField::ExpiryDate).and_then(parse_date);

        match (issue, expiry) {
            (Some(issue), Some(expiry)) if expiry <= issue => vec![ValidationViolation {
                severity: ViolationSeverity::Warning,
                expected: Some(format!("after {}", issue)),
                actual: Some(expiry.to_string()),
                ..ValidationViolation::error(
                    self.name(),
                    FormField::ExpiryDate,
                    "Expiry date is not after issue date",
                )
            }],
            _ => vec![],
        }
    }
}

pub struct SexRule;

impl ValidationRule for SexRule {
    fn name(&self) -> &'static str { "sex" }

    fn validate(&self, form: &RecordForm) -> Vec<ValidationViolation> {
        match form.optional(FormField::Sex) {
            Some(raw) if raw.parse::<Sex>().is_err() => vec![ValidationViolation {
                expected: Some("M, F or X".to_string()),
                actual: Some(raw.to_string()),
                ..ValidationViolation::error(self.name(), FormField::Sex, "Unknown sex marker")
            }],
            _ => vec![],
        }
    }
}

pub struct HeightRule;

impl ValidationRule for HeightRule {
    fn name(&self) -> &'static str { "height" }

    fn validate(&self, form: &RecordForm) -> Vec<ValidationViolation> {
        match form.optional(FormField::Height) {
            Some(raw) if !matches!(raw.parse::<u16>(), Ok(cm) if cm > 0) => {
                vec![ValidationViolation {
                    expected: Some("whole centimetres, e.g. 175".to_string()),
                    actual: Some(raw.to_string()),
                    ..ValidationViolation::error(self.name(), FormField::Height, "Height must be a positive number")
                }]
            }
            _ => vec![],
        }
    }
}

pub struct EyeColorRule;

impl ValidationRule for EyeColorRule {
    fn name(&self) -> &'static str { "eye_color" }

    fn validate(&self, form: &RecordForm) -> Vec<ValidationViolation> {
        match form.optional(FormField::EyeColor) {
            Some(raw) if raw.parse::<EyeColor>().is_err() => {
                let choices: Vec<_> = EyeColor::ALL.iter().map(|c| c.to_string()).collect();
                vec![ValidationViolation {
                    expected: Some(choices.join(", ")),
                    actual: Some(raw.to_string()),
                    ..ValidationViolation::error(self.name(), FormField::EyeColor, "Unknown eye color")
                }]
            }
            _ => vec![],
        }
    }
}

/// Validator runs every rule over a form
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(RequiredFieldsRule),
                Box::new(DateFormatRule),
                Box::new(DateOrderRule),
                Box::new(SexRule),
                Box::new(HeightRule),
                Box::new(EyeColorRule),
            ],
        }
    }

    pub fn validate(&self, form: &RecordForm) -> ValidationResult {
        let violations = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(form))
            .collect();
        ValidationResult::from_violations(violations)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
