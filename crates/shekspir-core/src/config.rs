// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration (process-wide, immutable after startup) and the
// check-in desk's printer settings.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ShekspirError};

/// HTTP port the bridge listens on when `PORT` is unset.
pub const DEFAULT_LISTEN_PORT: u16 = 3002;

/// Conventional raw-socket print port (JetDirect).
pub const DEFAULT_PRINTER_PORT: u16 = 9100;

/// Body size limit when `MAX_LABEL_SIZE` is unset.
pub const DEFAULT_MAX_LABEL_BYTES: usize = 256 * 1024;

/// Per-call deadline when a request carries no `timeoutMs`.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Print endpoint the desk talks to when nothing else is configured.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:3002/print";

/// Bridge settings, loaded once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// TCP port for the HTTP listener.
    pub listen_port: u16,
    /// Printer used when a request names no host.
    pub default_printer_host: Option<String>,
    /// Printer port used when a request names no port.
    pub default_printer_port: u16,
    /// Largest accepted request body, in bytes.
    pub max_label_bytes: usize,
    /// Deadline for connect-write-close when a request carries none.
    pub default_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_LISTEN_PORT,
            default_printer_host: None,
            default_printer_port: DEFAULT_PRINTER_PORT,
            max_label_bytes: DEFAULT_MAX_LABEL_BYTES,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl BridgeConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_printer_host = lookup("PRINTER_HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());

        let default_printer_port: u16 =
            parse_var(&lookup, "PRINTER_PORT", defaults.default_printer_port)?;
        if default_printer_port == 0 {
            return Err(ShekspirError::Config("PRINTER_PORT must not be 0".into()));
        }

        let max_label_bytes = match lookup("MAX_LABEL_SIZE") {
            Some(raw) => parse_byte_size(&raw)
                .map_err(|e| ShekspirError::Config(format!("MAX_LABEL_SIZE: {e}")))?,
            None => defaults.max_label_bytes,
        };

        let default_timeout_ms: u64 =
            parse_var(&lookup, "PRINT_TIMEOUT_MS", defaults.default_timeout_ms)?;
        if default_timeout_ms == 0 {
            return Err(ShekspirError::Config("PRINT_TIMEOUT_MS must not be 0".into()));
        }

        Ok(Self {
            listen_port: parse_var(&lookup, "PORT", defaults.listen_port)?,
            default_printer_host,
            default_printer_port,
            max_label_bytes,
            default_timeout_ms,
        })
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ShekspirError::Config(format!("invalid {key} value {raw:?}: {e}"))),
        None => {
            debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

/// Parse a human byte size such as `256kb`, `1.5mb` or `4096`.
///
/// Units are 1024-based and case-insensitive; a bare number is bytes.
pub fn parse_byte_size(input: &str) -> std::result::Result<usize, String> {
    let normalized = input.trim().to_ascii_lowercase();
    let split = normalized
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(normalized.len());
    let (number, unit) = normalized.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("{input:?} is not a byte size"))?;

    let multiplier: f64 = match unit.trim() {
        "" | "b" => 1.0,
        "kb" => 1024.0,
        "mb" => 1024.0 * 1024.0,
        "gb" => 1024.0 * 1024.0 * 1024.0,
        other => return Err(format!("unknown size unit {other:?}")),
    };

    let bytes = (value * multiplier).floor();
    if bytes < 1.0 {
        return Err(format!("{input:?} must be at least one byte"));
    }
    Ok(bytes as usize)
}

/// Printer settings kept by the check-in desk.
///
/// Persisting these is the desk's business; the bridge client only reads
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrinterSettings {
    /// Full URL of the bridge's print endpoint.
    pub service_url: String,
    /// Printer address sent with each label; empty defers to the bridge default.
    pub printer_ip: String,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.into(),
            printer_ip: String::new(),
        }
    }
}

impl PrinterSettings {
    /// The printer host to send, if one is configured.
    pub fn printer_host(&self) -> Option<&str> {
        let host = self.printer_ip.trim();
        (!host.is_empty()).then_some(host)
    }
}

impl std::fmt::Display for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "default printer {}:{}, max label {} bytes, timeout {}ms",
            self.default_printer_host.as_deref().unwrap_or("unset"),
            self.default_printer_port,
            self.max_label_bytes,
            self.default_timeout_ms
        )
    }
}

/// Log the effective configuration once at startup.
pub fn log_config(config: &BridgeConfig) {
    info!(
        listen_port = config.listen_port,
        printer_host = config.default_printer_host.as_deref().unwrap_or("unset"),
        printer_port = config.default_printer_port,
        max_label_bytes = config.max_label_bytes,
        timeout_ms = config.default_timeout_ms,
        "bridge configuration loaded"
    );
}
