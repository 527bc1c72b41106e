// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desk-side client for the print bridge.
//
// Mirrors what the check-in desk does: POST the rendered label plus the
// configured printer address, and sort the answer into success, a rejected
// request, or an unreachable printer.  No automatic retry.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use shekspir_core::config::{DEFAULT_TIMEOUT_MS, PrinterSettings};
use shekspir_core::error::{Result, ShekspirError};
use shekspir_core::types::{HealthStatus, LabelResult, PrintRequest};

/// Extra time the HTTP call may take beyond the bridge's own printer deadline.
const RESPONSE_GRACE: Duration = Duration::from_secs(5);

/// Per-call overrides for a submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    pub port: Option<u16>,
    pub timeout_ms: Option<u64>,
}

/// HTTP client for one bridge endpoint.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    print_url: Url,
    health_url: Url,
    printer_host: Option<String>,
}

impl BridgeClient {
    pub fn new(settings: &PrinterSettings) -> Result<Self> {
        let print_url = Url::parse(settings.service_url.trim()).map_err(|e| {
            ShekspirError::Config(format!("invalid service URL {:?}: {e}", settings.service_url))
        })?;
        let health_url = print_url
            .join("health")
            .map_err(|e| ShekspirError::Config(format!("cannot derive health URL: {e}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            print_url,
            health_url,
            printer_host: settings.printer_host().map(String::from),
        })
    }

    pub fn print_url(&self) -> &Url {
        &self.print_url
    }

    pub fn health_url(&self) -> &Url {
        &self.health_url
    }

    /// Send one label through the bridge.
    pub async fn submit(&self, document: &str, options: SubmitOptions) -> Result<LabelResult> {
        let body = PrintRequest {
            document: Some(document.to_string()),
            target_host: self.printer_host.clone(),
            target_port: options.port,
            timeout_ms: options.timeout_ms,
        };
        let deadline =
            Duration::from_millis(options.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)) + RESPONSE_GRACE;

        debug!(url = %self.print_url, bytes = document.len(), "submitting label to bridge");
        let response = self
            .http
            .post(self.print_url.clone())
            .timeout(deadline)
            .json(&body)
            .send()
            .await
            .map_err(|e| ShekspirError::Transport(e.to_string()))?;

        let status = response.status();
        let result: Option<LabelResult> = response.json().await.ok();

        match (status, result) {
            (s, Some(result)) if s.is_success() && result.success => Ok(result),
            (s, result) if s.is_client_error() => Err(ShekspirError::Rejected {
                status: s.as_u16(),
                message: failure_message(s, result.as_ref()),
            }),
            (StatusCode::BAD_GATEWAY, result) => {
                let message = failure_message(StatusCode::BAD_GATEWAY, result.as_ref());
                match result.as_ref().and_then(LabelResult::target) {
                    Some(target) => Err(ShekspirError::Device {
                        target,
                        detail: message,
                    }),
                    None => Err(ShekspirError::Transport(message)),
                }
            }
            (s, result) => {
                let message = failure_message(s, result.as_ref());
                warn!(status = %s, error = %message, "unexpected bridge response");
                Err(ShekspirError::Internal(format!("bridge answered {s}: {message}")))
            }
        }
    }

    /// Ask the bridge whether it is up.
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .http
            .get(self.health_url.clone())
            .timeout(RESPONSE_GRACE)
            .send()
            .await
            .map_err(|e| ShekspirError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ShekspirError::Transport(format!(
                "health check answered {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ShekspirError::Transport(format!("unreadable health response: {e}")))
    }
}

fn failure_message(status: StatusCode, result: Option<&LabelResult>) -> String {
    result
        .and_then(|r| r.error.clone())
        .unwrap_or_else(|| {
            format!(
                "Printer responded with {}",
                status.canonical_reason().unwrap_or("an error")
            )
        })
}
