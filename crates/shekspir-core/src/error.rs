// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Shekspir.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::PrinterTarget;

/// Top-level error type for all Shekspir operations.
#[derive(Debug, Error)]
pub enum ShekspirError {
    // -- Client errors (caller must fix the input) --
    #[error("label document is required")]
    MissingDocument,

    #[error("printer host is required (send targetHost or set PRINTER_HOST)")]
    MissingPrinterHost,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("bridge rejected the label ({status}): {message}")]
    Rejected { status: u16, message: String },

    // -- Device / upstream errors --
    #[error("{detail}")]
    Device { target: PrinterTarget, detail: String },

    #[error("printer bridge unreachable: {0}")]
    Transport(String),

    // -- Everything else --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("attendance store error: {0}")]
    Attendance(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification that decides how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Bad input. Correct it; retrying unchanged will fail again.
    Client,
    /// The printer (or the bridge, seen from the desk) could not be reached.
    Device,
    /// Anything else.
    Internal,
}

impl ShekspirError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingDocument
            | Self::MissingPrinterHost
            | Self::InvalidRequest(_)
            | Self::MalformedBody(_)
            | Self::Rejected { .. } => ErrorClass::Client,
            Self::Device { .. } | Self::Transport(_) => ErrorClass::Device,
            Self::Config(_)
            | Self::Attendance(_)
            | Self::Io(_)
            | Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// The resolved printer, for errors raised after target resolution.
    pub fn target(&self) -> Option<&PrinterTarget> {
        match self {
            Self::Device { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShekspirError>;
