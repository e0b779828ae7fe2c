use std::collections::BTreeMap;

use email_address::EmailAddress;
use serde::Serialize;

use crate::domain::{FormData, Submission};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Body,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Body];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Body => "body",
        }
    }

    fn max_length(self) -> Option<usize> {
        match self {
            Field::Name => Some(100),
            Field::Email => Some(200),
            Field::Body => None,
        }
    }
}

/// Field-level validation failures, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<Field, Vec<String>>);

impl FormErrors {
    pub(crate) const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: Field) -> &[String] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &[String])> {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }
}

/// Values that passed their own field checks; a field that failed is `None`.
#[derive(Debug, Clone, Default)]
pub(crate) struct CleanedFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub body: Option<String>,
}

impl CleanedFields {
    pub fn into_submission(self) -> Option<Submission> {
        Some(Submission {
            name: self.name?,
            email: self.email?,
            body: self.body?,
        })
    }

    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = Some(value),
            Field::Email => self.email = Some(value),
            Field::Body => self.body = Some(value),
        }
    }
}

pub(crate) fn clean_fields(data: &FormData) -> (CleanedFields, FormErrors) {
    let mut cleaned = CleanedFields::default();
    let mut errors = FormErrors::new();
    for field in Field::ALL {
        match clean_field(field, data.get(field.as_str()).map(String::as_str)) {
            Ok(value) => cleaned.set(field, value),
            Err(messages) => {
                for message in messages {
                    errors.add(field, message);
                }
            }
        }
    }
    (cleaned, errors)
}

fn clean_field(field: Field, raw: Option<&str>) -> Result<String, Vec<String>> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(vec![REQUIRED_MESSAGE.to_string()]);
    }

    let mut messages = Vec::new();
    if let Some(max) = field.max_length() {
        let length = value.chars().count();
        if length > max {
            messages.push(format!(
                "Ensure this value has at most {max} characters (it has {length})."
            ));
        }
    }
    if field == Field::Email && !EmailAddress::is_valid(value) {
        messages.push(INVALID_EMAIL_MESSAGE.to_string());
    }

    if messages.is_empty() {
        Ok(value.to_string())
    } else {
        Err(messages)
    }
}
