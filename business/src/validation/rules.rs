//! Reusable text rules.
//!
//! Every rule except [`required`] passes on an empty value, so optional fields only need to
//! be well-formed when filled in. Each takes an optional message replacing its default.

use std::sync::LazyLock;

use regex::Regex;

use super::{FieldValue, Rule, Verdict};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

// `None` only if the pattern above stops compiling, which the tests rule out.
static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

fn failure(message: Option<&str>, default: impl FnOnce() -> String) -> String {
    message.map_or_else(default, str::to_owned)
}

fn text_rule<T>(check: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static) -> Rule<T> {
    Rule::new(move |value: &FieldValue<'_>, _: &T| match check(value.as_text()) {
        Ok(()) => Verdict::Valid,
        Err(message) => Verdict::Invalid(message),
    })
}

pub fn is_email(text: &str) -> bool {
    EMAIL.as_ref().is_some_and(|pattern| pattern.is_match(text))
}

/// Rejects empty and whitespace-only text; non-text values count as missing.
pub fn required<T>(message: Option<&str>) -> Rule<T> {
    let message = failure(message, || "This field is required".to_owned());
    text_rule(move |text| {
        if text.trim().is_empty() {
            Err(message.clone())
        } else {
            Ok(())
        }
    })
}

pub fn email<T>(message: Option<&str>) -> Rule<T> {
    let message = failure(message, || "Invalid email format".to_owned());
    text_rule(move |text| {
        if text.is_empty() || is_email(text) {
            Ok(())
        } else {
            Err(message.clone())
        }
    })
}

/// Counts characters after trimming.
pub fn min_length<T>(min: usize, message: Option<&str>) -> Rule<T> {
    let message = failure(message, || format!("Minimum length: {min} characters"));
    text_rule(move |text| {
        if text.is_empty() || text.trim().chars().count() >= min {
            Ok(())
        } else {
            Err(message.clone())
        }
    })
}

/// Counts characters without trimming.
pub fn max_length<T>(max: usize, message: Option<&str>) -> Rule<T> {
    let message = failure(message, || format!("Maximum length: {max} characters"));
    text_rule(move |text| {
        if text.chars().count() <= max {
            Ok(())
        } else {
            Err(message.clone())
        }
    })
}

/// Trimmed character count within `min..=max`.
pub fn length<T>(min: usize, max: usize, message: Option<&str>) -> Rule<T> {
    let message = failure(message, || {
        format!("Length must be between {min} and {max} characters")
    });
    text_rule(move |text| {
        if text.is_empty() || (min..=max).contains(&text.trim().chars().count()) {
            Ok(())
        } else {
            Err(message.clone())
        }
    })
}

/// Rejects a value already present in `existing` (exact match).
pub fn unique<T>(existing: Vec<String>, message: Option<&str>) -> Rule<T> {
    let message = failure(message, || "This value is already in use".to_owned());
    text_rule(move |text| {
        if !text.is_empty() && existing.iter().any(|value| value == text) {
            Err(message.clone())
        } else {
            Ok(())
        }
    })
}
