// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Payload accepted on `POST /log` and forwarded unchanged in batches.
//!
//! Every field falls back to its zero value when absent so that a missing field is reported by
//! validation, not by the decoder.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub user_id: i64,
    pub total: f64,
    pub title: String,
    pub meta: Meta,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub logins: Vec<Login>,
    pub phone_numbers: PhoneNumbers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Login {
    /// RFC 3339 timestamp
    pub time: String,
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneNumbers {
    pub home: String,
    pub mobile: String,
}
