// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Check-in: print the badge, then mark the attendee as present.
//
// Attendance lives in the hosted event datastore, which is reached through
// the `AttendanceLog` trait.  Rows are unique per (event, attendee); finding
// an existing row after a reprint is a normal outcome, not an error.  If the
// badge does not print, nothing is recorded.  Failures carry the
// plain-English notice the desk shows the volunteer.

use std::fmt;
use std::future::Future;

use tracing::{info, warn};

use shekspir_core::error::{Result, ShekspirError};
use shekspir_core::human_errors::{HumanError, humanize_error};
use shekspir_core::types::{AttendanceEntry, Attendee, EventRecord, LabelResult};
use shekspir_label::{LabelLayout, build_badge};

use crate::client::{BridgeClient, SubmitOptions};

/// The datastore's attendance table, as seen by the desk.
pub trait AttendanceLog: Send + Sync {
    /// Whether `entry` is already recorded.
    fn contains(&self, entry: &AttendanceEntry) -> impl Future<Output = Result<bool>> + Send;

    /// Insert `entry`.
    fn insert(&self, entry: &AttendanceEntry) -> impl Future<Output = Result<()>> + Send;
}

/// What happened to the attendance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Inserted,
    AlreadyPresent,
}

/// A completed check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    pub print: LabelResult,
    pub recorded: Recorded,
    /// Notification text for the desk.
    pub summary: String,
}

/// A check-in that did not complete.
#[derive(Debug)]
pub struct CheckInFailure {
    pub error: ShekspirError,
    /// What the desk shows for it.
    pub notice: HumanError,
}

impl From<ShekspirError> for CheckInFailure {
    fn from(error: ShekspirError) -> Self {
        let notice = humanize_error(&error);
        Self { error, notice }
    }
}

impl fmt::Display for CheckInFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.notice.message, self.notice.suggestion)
    }
}

impl std::error::Error for CheckInFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Prints badges through a bridge and records attendance.
pub struct CheckInDesk<L> {
    client: BridgeClient,
    log: L,
    layout: LabelLayout,
}

impl<L: AttendanceLog> CheckInDesk<L> {
    pub fn new(client: BridgeClient, log: L) -> Self {
        Self {
            client,
            log,
            layout: LabelLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: LabelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// Print `copies` badges for `attendee`, then record attendance at
    /// `event`.
    pub async fn check_in(
        &self,
        event: &EventRecord,
        attendee: &Attendee,
        copies: i64,
    ) -> std::result::Result<CheckIn, CheckInFailure> {
        self.print_and_record(event, attendee, copies)
            .await
            .map_err(|error| {
                let failure = CheckInFailure::from(error);
                warn!(
                    event = event.id,
                    attendee = %attendee.id,
                    error = %failure.error,
                    notice = %failure.notice.message,
                    "check-in failed"
                );
                failure
            })
    }

    async fn print_and_record(
        &self,
        event: &EventRecord,
        attendee: &Attendee,
        copies: i64,
    ) -> Result<CheckIn> {
        let label = build_badge(attendee, copies, self.layout);
        let print = self
            .client
            .submit(&label.to_text(), SubmitOptions::default())
            .await?;

        let entry = AttendanceEntry::new(event, attendee);
        let recorded = if self.log.contains(&entry).await? {
            Recorded::AlreadyPresent
        } else {
            self.log.insert(&entry).await?;
            Recorded::Inserted
        };

        let name = format!("{} {}", attendee.first_name, attendee.last_name);
        let summary = match recorded {
            Recorded::Inserted => format!("Printed badge for {name}"),
            Recorded::AlreadyPresent => {
                format!("Printed badge for {name} (already marked attended).")
            }
        };
        info!(
            request_id = %print.request_id,
            event = event.id,
            attendee = %attendee.id,
            ?recorded,
            "attendee checked in"
        );

        Ok(CheckIn {
            print,
            recorded,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use shekspir_core::config::PrinterSettings;
    use shekspir_core::error::ErrorClass;
    use shekspir_core::human_errors::Severity;

    #[derive(Default)]
    struct MemoryLog {
        rows: Mutex<HashSet<AttendanceEntry>>,
    }

    impl AttendanceLog for MemoryLog {
        async fn contains(&self, entry: &AttendanceEntry) -> Result<bool> {
            Ok(self.rows.lock().unwrap().contains(entry))
        }

        async fn insert(&self, entry: &AttendanceEntry) -> Result<()> {
            if !self.rows.lock().unwrap().insert(entry.clone()) {
                return Err(ShekspirError::Attendance("duplicate key".into()));
            }
            Ok(())
        }
    }

    fn event() -> EventRecord {
        EventRecord {
            id: 7,
            name: "RustConf Hallway Track".into(),
            date: None,
            created_at: None,
        }
    }

    fn ada() -> Attendee {
        Attendee {
            id: "a-1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            company: Some("Analytical Engines".into()),
            ..Default::default()
        }
    }

    fn desk(server: &MockServer) -> CheckInDesk<MemoryLog> {
        let client = BridgeClient::new(&PrinterSettings {
            service_url: server.url("/print"),
            printer_ip: "10.0.0.5".into(),
        })
        .unwrap();
        CheckInDesk::new(client, MemoryLog::default())
    }

    #[tokio::test]
    async fn prints_then_records_once() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/print")
                    .body_contains("^FO75,40^FDAda^FS")
                    .body_contains("^PQ1");
                then.status(200).json_body(json!({
                    "success": true,
                    "targetHost": "10.0.0.5",
                    "targetPort": 9100,
                    "requestId": "5b0c2a1e-8f4e-4d8a-9b1c-2f3e4d5a6b7c",
                }));
            })
            .await;
        let desk = desk(&server);

        let first = desk.check_in(&event(), &ada(), 0).await.unwrap();
        assert_eq!(first.recorded, Recorded::Inserted);
        assert_eq!(first.summary, "Printed badge for Ada Lovelace");

        let second = desk.check_in(&event(), &ada(), 1).await.unwrap();
        assert_eq!(second.recorded, Recorded::AlreadyPresent);
        assert!(second.summary.contains("already marked attended"));

        mock.assert_hits_async(2).await;
        assert_eq!(desk.log().rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_print_records_nothing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/print");
                then.status(502).json_body(json!({
                    "success": false,
                    "error": "connection to printer 10.0.0.5:9100 timed out after 10000ms while connecting",
                    "targetHost": "10.0.0.5",
                    "targetPort": 9100,
                    "requestId": "5b0c2a1e-8f4e-4d8a-9b1c-2f3e4d5a6b7c",
                }));
            })
            .await;
        let desk = desk(&server);

        let failure = desk.check_in(&event(), &ada(), 1).await.unwrap_err();

        assert_eq!(failure.error.class(), ErrorClass::Device);
        assert_eq!(
            failure.notice.message,
            "The badge printer at 10.0.0.5:9100 isn't answering."
        );
        assert_eq!(failure.notice.severity, Severity::Transient);
        assert!(desk.log().rows.lock().unwrap().is_empty());
    }

    struct BrokenLog;

    impl AttendanceLog for BrokenLog {
        async fn contains(&self, _entry: &AttendanceEntry) -> Result<bool> {
            Ok(false)
        }

        async fn insert(&self, _entry: &AttendanceEntry) -> Result<()> {
            Err(ShekspirError::Attendance("datastore offline".into()))
        }
    }

    #[tokio::test]
    async fn unsaved_attendance_tells_the_desk_the_badge_printed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/print");
                then.status(200).json_body(json!({
                    "success": true,
                    "targetHost": "10.0.0.5",
                    "targetPort": 9100,
                    "requestId": "5b0c2a1e-8f4e-4d8a-9b1c-2f3e4d5a6b7c",
                }));
            })
            .await;
        let client = BridgeClient::new(&PrinterSettings {
            service_url: server.url("/print"),
            printer_ip: "10.0.0.5".into(),
        })
        .unwrap();
        let desk = CheckInDesk::new(client, BrokenLog);

        let failure = desk.check_in(&event(), &ada(), 1).await.unwrap_err();

        assert!(matches!(failure.error, ShekspirError::Attendance(_)));
        assert_eq!(
            failure.notice.message,
            "The badge printed, but check-in was not saved."
        );
        assert!(failure.to_string().contains("mark the attendee again"));
    }
}
