//! Declarative form validation.
//!
//! A [`Validation`] owns one form value and one static rule set. Rules run in declaration
//! order and the first failing rule decides the field's error message. Errors and "touched"
//! flags are tracked per field so a form can stay quiet until the user has visited a field.

mod new_user;
pub mod rules;

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Debug, Formatter},
};

pub use new_user::{NewUserField, new_user_rules};

pub const DEFAULT_FAILURE: &str = "Validation failed";

/// The value of one form field, as seen by rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Flag(bool),
    Number(i64),
    Missing,
}

impl FieldValue<'_> {
    /// Text content; every other variant reads as empty.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Flag(_) | Self::Number(_) | Self::Missing => "",
        }
    }
}

/// A form whose fields can be inspected by name.
pub trait FormData {
    type Field: Copy + Ord + Debug;

    fn value(&self, field: Self::Field) -> FieldValue<'_>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// Failed with its own message.
    Invalid(String),
    /// Failed; the rule's fallback message applies.
    Rejected,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<bool> for Verdict {
    fn from(passed: bool) -> Self {
        if passed { Self::Valid } else { Self::Rejected }
    }
}

impl From<String> for Verdict {
    fn from(message: String) -> Self {
        Self::Invalid(message)
    }
}

impl From<&str> for Verdict {
    fn from(message: &str) -> Self {
        Self::Invalid(message.to_owned())
    }
}

type Validator<T> = dyn Fn(&FieldValue<'_>, &T) -> Verdict + Send + Sync;

pub struct Rule<T> {
    validator: Box<Validator<T>>,
    message: Option<String>,
}

impl<T> Rule<T> {
    /// `validator` receives the field value and the whole form.
    pub fn new<V, F>(validator: F) -> Self
    where
        V: Into<Verdict>,
        F: Fn(&FieldValue<'_>, &T) -> V + Send + Sync + 'static,
    {
        Self {
            validator: Box::new(move |value: &FieldValue<'_>, data: &T| {
                validator(value, data).into()
            }),
            message: None,
        }
    }

    /// Message used when the validator rejects without one.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn check(&self, value: &FieldValue<'_>, data: &T) -> Verdict {
        (self.validator)(value, data)
    }

    fn failure(&self, value: &FieldValue<'_>, data: &T) -> Option<String> {
        match self.check(value, data) {
            Verdict::Valid => None,
            Verdict::Invalid(message) => Some(message),
            Verdict::Rejected => Some(
                self.message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FAILURE.to_owned()),
            ),
        }
    }
}

impl<T> Debug for Rule<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

pub type Rules<T> = BTreeMap<<T as FormData>::Field, Vec<Rule<T>>>;

pub struct Validation<T: FormData> {
    data: T,
    rules: Rules<T>,
    errors: BTreeMap<T::Field, String>,
    touched: BTreeSet<T::Field>,
}

impl<T> Debug for Validation<T>
where
    T: FormData + Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validation")
            .field("data", &self.data)
            .field("rules", &self.rules)
            .field("errors", &self.errors)
            .field("touched", &self.touched)
            .finish()
    }
}

impl<T: FormData> Validation<T> {
    pub fn new(data: T, rules: Rules<T>) -> Self {
        Self {
            data,
            rules,
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Editing the form does not re-validate; call [`Validation::validate_field`] afterwards.
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    /// Run the field's rules, stopping at the first failure, and mark it touched.
    ///
    /// A field without rules passes, loses any stale error and keeps its touched flag.
    pub fn validate_field(&mut self, field: T::Field) -> bool {
        let Some(rules) = self.rules.get(&field) else {
            self.errors.remove(&field);
            return true;
        };

        self.touched.insert(field);
        let value = self.data.value(field);

        for rule in rules {
            if let Some(message) = rule.failure(&value, &self.data) {
                self.errors.insert(field, message);
                return false;
            }
        }

        self.errors.remove(&field);
        true
    }

    /// Validate every field that has rules, without stopping at the first failing field.
    pub fn validate_all(&mut self) -> bool {
        let fields: Vec<T::Field> = self.rules.keys().copied().collect();
        let mut valid = true;
        for field in fields {
            valid &= self.validate_field(field);
        }
        valid
    }

    pub fn is_field_valid(&self, field: T::Field) -> bool {
        !self.errors.contains_key(&field) && self.touched.contains(&field)
    }

    /// Whether every rule currently passes. Leaves errors and touched flags alone.
    pub fn is_form_valid(&self) -> bool {
        self.rules.iter().all(|(field, rules)| {
            let value = self.data.value(*field);
            rules
                .iter()
                .all(|rule| rule.check(&value, &self.data).is_valid())
        })
    }

    pub fn reset(&mut self) {
        self.errors.clear();
        self.touched.clear();
    }

    pub fn reset_field(&mut self, field: T::Field) {
        self.errors.remove(&field);
        self.touched.remove(&field);
    }

    pub fn errors(&self) -> &BTreeMap<T::Field, String> {
        &self.errors
    }

    pub fn error(&self, field: T::Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_touched(&self, field: T::Field) -> bool {
        self.touched.contains(&field)
    }
}
