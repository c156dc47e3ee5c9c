use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::error::AppError;

/// The constraint a field value failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    Length { min: Option<u64>, max: Option<u64> },
    Range { min: Option<f64>, max: Option<f64> },
    Email,
    Finite,
    OneOf { allowed: Vec<String> },
    Unique,
    Other { code: String },
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Length { min, max } => match (min, max) {
                (Some(min), Some(max)) => write!(f, "length must be between {min} and {max}"),
                (Some(min), None) => write!(f, "length must be at least {min}"),
                (None, Some(max)) => write!(f, "length must be at most {max}"),
                (None, None) => write!(f, "invalid length"),
            },
            Rule::Range { min, max } => match (min, max) {
                (Some(min), Some(max)) => write!(f, "must be between {min} and {max}"),
                (Some(min), None) => write!(f, "must be at least {min}"),
                (None, Some(max)) => write!(f, "must be at most {max}"),
                (None, None) => write!(f, "out of range"),
            },
            Rule::Email => write!(f, "must be a valid email address"),
            Rule::Finite => write!(f, "must be a finite number"),
            Rule::OneOf { allowed } => write!(f, "must be one of: {}", allowed.join(", ")),
            Rule::Unique => write!(f, "must be unique"),
            Rule::Other { code } => write!(f, "failed check `{code}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    #[serde(flatten)]
    pub rule: Rule,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, rule: Rule) -> Self {
        let message = rule.to_string();
        Self {
            field: field.into(),
            rule,
            message,
        }
    }
}

/// One or more field-level constraint violations, sorted by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, rule: Rule) -> Self {
        Self {
            violations: vec![FieldViolation::new(field, rule)],
        }
    }

    pub fn one_of(field: &str, allowed: &[&str]) -> Self {
        Self::single(
            field,
            Rule::OneOf {
                allowed: allowed.iter().map(|tag| tag.to_string()).collect(),
            },
        )
    }

    pub fn unique(field: &str) -> Self {
        Self::single(field, Rule::Unique)
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn rule_for(&self, field: &str) -> Option<&Rule> {
        self.violations
            .iter()
            .find(|violation| violation.field == field)
            .map(|violation| &violation.rule)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{}: {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                let field = field.to_string();
                field_errors.iter().map(move |error| {
                    let rule = rule_from_code(&error.code, &error.params);
                    let mut violation = FieldViolation::new(field.clone(), rule);
                    if let Some(message) = &error.message {
                        violation.message = message.to_string();
                    }
                    violation
                })
            })
            .collect();

        violations.sort_by(|a, b| a.field.cmp(&b.field));
        Self { violations }
    }
}

fn rule_from_code<K>(code: &str, params: &HashMap<K, Value>) -> Rule
where
    K: std::borrow::Borrow<str> + std::hash::Hash + Eq,
{
    match code {
        "length" => Rule::Length {
            min: params.get("min").and_then(Value::as_u64),
            max: params.get("max").and_then(Value::as_u64),
        },
        "range" => Rule::Range {
            min: params.get("min").and_then(Value::as_f64),
            max: params.get("max").and_then(Value::as_f64),
        },
        "email" => Rule::Email,
        "finite" => Rule::Finite,
        other => Rule::Other {
            code: other.to_string(),
        },
    }
}

/// Runs the declared constraints of `value`, handing it back when they all hold.
pub fn check<T: Validate>(value: T) -> Result<T, ValidationError> {
    value.validate()?;
    Ok(value)
}

/// Custom `validator` check rejecting NaN and infinities, which slip past `range`.
pub fn finite(value: f64) -> Result<(), validator::ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("finite"))
    }
}

thread_local! {
    static REJECTED_TAG: RefCell<Option<ValidationError>> = const { RefCell::new(None) };
}

/// Records an enum tag rejected while deserializing, so `parse_json` can
/// report it as a field violation instead of a serde message.
pub(crate) fn rejected_tag(err: ValidationError) -> ValidationError {
    REJECTED_TAG.with(|slot| *slot.borrow_mut() = Some(err.clone()));
    err
}

/// Parses JSON. Malformed input is `BadRequest`; an out-of-set enum tag is a
/// `Validation` error on the tag's field.
pub fn parse_json<T: DeserializeOwned>(raw: &str, context: &str) -> Result<T, AppError> {
    REJECTED_TAG.with(|slot| slot.borrow_mut().take());
    serde_json::from_str(raw).map_err(|err| {
        match REJECTED_TAG.with(|slot| slot.borrow_mut().take()) {
            Some(violation) => AppError::Validation(violation),
            None => AppError::BadRequest(format!("{context}: {err}")),
        }
    })
}

/// Parses a JSON payload and checks its constraints.
pub fn decode<T>(raw: &str) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = parse_json(raw, "invalid payload")?;
    Ok(check(value)?)
}
