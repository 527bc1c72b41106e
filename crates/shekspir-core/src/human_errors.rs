// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the volunteers staffing the check-in desk.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the desk presents the notification.

use crate::error::ShekspirError;

/// Severity of an error from the desk's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The printer or bridge is away. Trying again later may work.
    Transient,
    /// Somebody must fix a setting or the input before trying again.
    ActionRequired,
    /// Something broke that the desk cannot fix.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as the notification title).
    pub message: String,
    /// What the volunteer should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `ShekspirError` into a `HumanError` for the desk.
pub fn humanize_error(err: &ShekspirError) -> HumanError {
    match err {
        ShekspirError::MissingDocument => HumanError {
            message: "The badge came out empty.".into(),
            suggestion: "Pick the attendee again and press Print.".into(),
            severity: Severity::ActionRequired,
        },

        ShekspirError::MissingPrinterHost => HumanError {
            message: "No badge printer is set up.".into(),
            suggestion: "Enter the printer's IP address in the printer settings.".into(),
            severity: Severity::ActionRequired,
        },

        ShekspirError::InvalidRequest(detail) | ShekspirError::MalformedBody(detail) => {
            HumanError {
                message: "The print request was not accepted.".into(),
                suggestion: format!("Check the printer settings, then try again. ({detail})"),
                severity: Severity::ActionRequired,
            }
        }

        ShekspirError::Rejected { message, .. } => HumanError {
            message: "The print service refused the badge.".into(),
            suggestion: format!("Check the printer settings, then try again. ({message})"),
            severity: Severity::ActionRequired,
        },

        ShekspirError::Device { target, detail } => humanize_device_error(&target.to_string(), detail),

        ShekspirError::Transport(detail) => HumanError {
            message: "The print service isn't running.".into(),
            suggestion: format!(
                "Make sure the printer bridge is started and the service URL is right. ({detail})"
            ),
            severity: Severity::Transient,
        },

        ShekspirError::Config(detail) => HumanError {
            message: "The print service is misconfigured.".into(),
            suggestion: format!("Ask the organiser to check the bridge settings. ({detail})"),
            severity: Severity::Permanent,
        },

        ShekspirError::Attendance(detail) => HumanError {
            message: "The badge printed, but check-in was not saved.".into(),
            suggestion: format!("Check the internet connection and mark the attendee again. ({detail})"),
            severity: Severity::Transient,
        },

        ShekspirError::Io(_) | ShekspirError::Internal(_) => {
            HumanError {
                message: "Something went wrong.".into(),
                suggestion: format!("Try again. If it keeps happening, restart the print service. ({err})"),
                severity: Severity::Permanent,
            }
        }
    }
}

fn humanize_device_error(target: &str, detail: &str) -> HumanError {
    let lower = detail.to_lowercase();
    let message = if lower.contains("timed out") {
        format!("The badge printer at {target} isn't answering.")
    } else if lower.contains("refused") {
        format!("The badge printer at {target} turned the connection away.")
    } else {
        format!("We lost the connection to the badge printer at {target}.")
    };

    HumanError {
        message,
        suggestion: "Check that the printer is switched on, has labels, and is on the same network. Then press Print again.".into(),
        severity: Severity::Transient,
    }
}
