// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Shekspir badge printer bridge.
//
// Wire types use camelCase field names because the browser check-in desk is
// the main caller.  Datastore records keep the snake_case column names of the
// hosted tables they mirror.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ShekspirError;

/// Correlation token minted for every inbound call.
///
/// Only ever used to tie log lines and responses together; never for dedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved printer address: where one submit call delivers its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrinterTarget {
    pub host: String,
    pub port: u16,
}

impl PrinterTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl std::fmt::Display for PrinterTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Body of a submit call.
///
/// Every field is optional at the serde level so that a missing document or
/// host is reported as a client error with the normal failure shape rather
/// than as a body rejection.  The legacy wire names (`zpl`, `printerIp`,
/// `printerPort`, `timeout`) are still accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    #[serde(default, alias = "zpl", skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, alias = "printerIp", skip_serializing_if = "Option::is_none")]
    pub target_host: Option<String>,
    #[serde(default, alias = "printerPort", skip_serializing_if = "Option::is_none")]
    pub target_port: Option<u16>,
    #[serde(default, alias = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl PrintRequest {
    /// A request carrying only a document; host and port fall back to the
    /// bridge defaults.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            ..Default::default()
        }
    }
}

/// Outcome of one submit call as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<u16>,
    pub request_id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LabelResult {
    /// Successful delivery to `target`.
    pub fn delivered(request_id: RequestId, target: &PrinterTarget) -> Self {
        Self {
            success: true,
            target_host: Some(target.host.clone()),
            target_port: Some(target.port),
            request_id,
            error: None,
        }
    }

    /// Failure; the resolved target is echoed only for device errors.
    pub fn failed(request_id: RequestId, err: &ShekspirError) -> Self {
        let target = err.target();
        Self {
            success: false,
            target_host: target.map(|t| t.host.clone()),
            target_port: target.map(|t| t.port),
            request_id,
            error: Some(err.to_string()),
        }
    }

    /// The target echoed back by the bridge, if both halves are present.
    pub fn target(&self) -> Option<PrinterTarget> {
        match (&self.target_host, self.target_port) {
            (Some(host), Some(port)) => Some(PrinterTarget::new(host.clone(), port)),
            _ => None,
        }
    }
}

/// Body of the health operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub default_printer_host: Option<String>,
    pub default_printer_port: u16,
    pub timestamp: DateTime<Utc>,
}

/// Stages of a single submit call once it has been received.
///
/// `Succeeded` and `Failed` are terminal.  There is no edge back into
/// `Connecting`: each call makes exactly one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitStage {
    Validating,
    Connecting,
    Writing,
    Closing,
    Succeeded,
    Failed,
}

impl std::fmt::Display for SubmitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Connecting => "connecting",
            Self::Writing => "writing",
            Self::Closing => "closing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// An attendee row from the event datastore.  Read-only to this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attendee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// An event row from the event datastore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Attendance row written after a badge prints.  Unique on
/// (`attended_event`, `attendee`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub attended_event: i64,
    pub attendee: String,
}

impl AttendanceEntry {
    pub fn new(event: &EventRecord, attendee: &Attendee) -> Self {
        Self {
            attended_event: event.id,
            attendee: attendee.id.clone(),
        }
    }
}
