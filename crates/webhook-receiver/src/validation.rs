// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::model::{LogEntry, Login};
use chrono::DateTime;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::net::IpAddr;
use std::sync::OnceLock;

const REQUIRED: &str = "is required";
const MUST_BE_POSITIVE: &str = "must be a positive number";
const TOO_SHORT: &str = "must be at least 3 characters long";
const BAD_PHONE_FORMAT: &str = "must match format 555-1212-123";

const MIN_TITLE_CHARS: usize = 3;

static PHONE_FORMAT: OnceLock<Regex> = OnceLock::new();

fn phone_format() -> &'static Regex {
    #[allow(clippy::expect_used)]
    PHONE_FORMAT.get_or_init(|| Regex::new(r"^\d{3}-\d{4}-\d{3}$").expect("valid phone pattern"))
}

/// One rejected field, serialized as `{"<field>": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.field, &self.message)?;
        map.end()
    }
}

/// Checks every field and reports the first failing rule of each, in declaration order.
pub fn validate(entry: &LogEntry) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if entry.user_id == 0 {
        errors.push(FieldError::new("UserID", REQUIRED));
    } else if entry.user_id < 1 {
        errors.push(FieldError::new("UserID", MUST_BE_POSITIVE));
    }

    if entry.total == 0.0 {
        errors.push(FieldError::new("Total", REQUIRED));
    } else if entry.total < 0.0 {
        errors.push(FieldError::new("Total", MUST_BE_POSITIVE));
    }

    if entry.title.is_empty() {
        errors.push(FieldError::new("Title", REQUIRED));
    } else if entry.title.chars().count() < MIN_TITLE_CHARS {
        errors.push(FieldError::new("Title", TOO_SHORT));
    }

    if entry.meta.logins.is_empty() {
        errors.push(FieldError::new("Logins", "LogEntry.Meta.Logins is invalid"));
    }
    for (i, login) in entry.meta.logins.iter().enumerate() {
        validate_login(i, login, &mut errors);
    }

    let phones = &entry.meta.phone_numbers;
    validate_phone("Home", &phones.home, &mut errors);
    validate_phone("Mobile", &phones.mobile, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_login(index: usize, login: &Login, errors: &mut Vec<FieldError>) {
    if !is_rfc3339(&login.time) {
        errors.push(FieldError::new(
            "Time",
            format!("LogEntry.Meta.Logins[{index}].Time is invalid"),
        ));
    }
    if login.ip.parse::<IpAddr>().is_err() {
        errors.push(FieldError::new(
            "IP",
            format!("LogEntry.Meta.Logins[{index}].IP is invalid"),
        ));
    }
}

/// Strict RFC 3339: the date and time must be joined by an uppercase `T`.
fn is_rfc3339(time: &str) -> bool {
    time.as_bytes().get(10) == Some(&b'T') && DateTime::parse_from_rfc3339(time).is_ok()
}

fn validate_phone(field: &'static str, number: &str, errors: &mut Vec<FieldError>) {
    if number.is_empty() {
        errors.push(FieldError::new(field, REQUIRED));
    } else if !phone_format().is_match(number) {
        errors.push(FieldError::new(field, BAD_PHONE_FORMAT));
    }
}
