// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::checksum::checksum;

pub const AUTHOR_SYSTEM: &str = "system";
pub const AUTHOR_USER: &str = "user";

/// Immutable snapshot descriptor of a node payload at one point in time.
///
/// Fields are private; a version cannot change after it is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    id: String,
    timestamp: DateTime<Utc>,
    checksum: String,
    description: String,
    author: String,
    size: usize,
}

impl Version {
    pub fn new(payload: &Value, description: impl Into<String>, author: impl Into<String>) -> Self {
        Self::at(payload, description, author, Utc::now())
    }

    pub(crate) fn at(
        payload: &Value,
        description: impl Into<String>,
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let serialized = payload.to_string();
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            checksum: checksum(&serialized),
            description: description.into(),
            author: author.into(),
            size: serialized.len(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Serialized payload length in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}
