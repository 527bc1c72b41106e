// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The print bridge: one submit call in, one raw TCP delivery out.
//
// A submit call moves through
//
//   Validating → Connecting → Writing → Closing → {Succeeded | Failed}
//
// Validation failures end the call before any socket is opened.  Delivery
// failures (refused, reset, deadline) end it after exactly one attempt.  The
// bridge keeps no state between calls apart from its read-only config, so any
// number of calls can be in flight at once.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use shekspir_core::config::BridgeConfig;
use shekspir_core::error::{ErrorClass, Result, ShekspirError};
use shekspir_core::types::{HealthStatus, PrintRequest, PrinterTarget, RequestId, SubmitStage};

use crate::raw_client;

/// A validated submit call, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelJob {
    /// Trimmed label text; exactly these bytes go to the printer.
    pub document: String,
    pub target: PrinterTarget,
    pub timeout: Duration,
}

/// A completed delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub target: PrinterTarget,
    pub bytes_sent: usize,
}

/// Submit and health operations over a shared, immutable configuration.
#[derive(Debug, Clone)]
pub struct PrintBridge {
    config: Arc<BridgeConfig>,
}

impl PrintBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Liveness plus the default printer address.  No side effects.
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".into(),
            default_printer_host: self.config.default_printer_host.clone(),
            default_printer_port: self.config.default_printer_port,
            timestamp: Utc::now(),
        }
    }

    /// Validate `request` and resolve its target against the defaults.
    ///
    /// Every error returned here is `ErrorClass::Client`.
    pub fn prepare(&self, request: PrintRequest) -> Result<LabelJob> {
        let document = request
            .document
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(ShekspirError::MissingDocument)?
            .to_string();

        let host = request
            .target_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .or(self.config.default_printer_host.as_deref())
            .ok_or(ShekspirError::MissingPrinterHost)?
            .to_string();

        let port = request
            .target_port
            .unwrap_or(self.config.default_printer_port);
        if port == 0 {
            return Err(ShekspirError::InvalidRequest(
                "targetPort must be between 1 and 65535".into(),
            ));
        }

        let timeout = match request.timeout_ms {
            Some(0) => {
                return Err(ShekspirError::InvalidRequest(
                    "timeoutMs must be greater than 0".into(),
                ));
            }
            Some(ms) => Duration::from_millis(ms),
            None => self.config.default_timeout(),
        };

        Ok(LabelJob {
            document,
            target: PrinterTarget::new(host, port),
            timeout,
        })
    }

    /// Run one submit call to completion.
    ///
    /// Logs exactly one completion line tagged with `request_id`.
    pub async fn submit(&self, request_id: RequestId, request: PrintRequest) -> Result<Delivery> {
        debug!(%request_id, stage = %SubmitStage::Validating, "submit call started");

        let job = match self.prepare(request) {
            Ok(job) => job,
            Err(e) => {
                warn!(%request_id, stage = %SubmitStage::Failed, error = %e, "label rejected");
                return Err(e);
            }
        };

        match self.deliver(&job).await {
            Ok(delivery) => {
                info!(
                    %request_id,
                    stage = %SubmitStage::Succeeded,
                    bytes = delivery.bytes_sent,
                    host = %delivery.target.host,
                    port = delivery.target.port,
                    "sent {} bytes to {}",
                    delivery.bytes_sent,
                    delivery.target
                );
                Ok(delivery)
            }
            Err(e) => {
                error!(
                    %request_id,
                    stage = %SubmitStage::Failed,
                    host = %job.target.host,
                    port = job.target.port,
                    error = %e,
                    "printer send failed"
                );
                Err(e)
            }
        }
    }

    /// Deliver an already validated job.  Only `Device` errors come back from
    /// the network path; anything else is reported as `Internal`.
    pub async fn deliver(&self, job: &LabelJob) -> Result<Delivery> {
        match raw_client::send_raw(&job.target, job.document.as_bytes(), job.timeout).await {
            Ok(bytes_sent) => Ok(Delivery {
                target: job.target.clone(),
                bytes_sent,
            }),
            Err(e) if e.class() == ErrorClass::Device => Err(e),
            Err(e) => Err(ShekspirError::Internal(e.to_string())),
        }
    }
}
