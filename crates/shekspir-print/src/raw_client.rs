// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP print client (JetDirect, port 9100).
//
// The simplest possible print protocol: open a TCP socket and dump bytes.
// Label printers speak ZPL natively on this port.  The protocol is send-only:
// there is no acknowledgement to wait for, so delivery counts as done once
// the bytes are flushed and our half of the connection is closed cleanly.
//
// The whole connect-write-close sequence runs under one deadline.  When the
// deadline fires the in-flight future is dropped and the socket is closed with
// a reset (zero linger), so the printer never sees a clean end of a partial
// label and nothing still queued in the kernel goes out after we report
// failure.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use shekspir_core::error::{Result, ShekspirError};
use shekspir_core::types::{PrinterTarget, SubmitStage};

/// Write granularity, so progress shows up in debug logs for big labels.
const CHUNK_SIZE: usize = 8192;

/// Send `document` to `target`, finishing connect, write and close within
/// `deadline`.
///
/// Returns the number of bytes written.  Exactly one connection attempt is
/// made.
pub async fn send_raw(target: &PrinterTarget, document: &[u8], deadline: Duration) -> Result<usize> {
    let mut stage = SubmitStage::Connecting;
    let mut connection = None;

    let outcome = tokio::time::timeout(
        deadline,
        deliver(target, document, &mut stage, &mut connection),
    )
    .await;

    match outcome {
        Ok(result) => result,
        Err(_) => {
            debug!(%target, %stage, "raw TCP deadline expired, resetting connection");
            if let Some(stream) = connection.take() {
                abort(target, stream);
            }
            Err(ShekspirError::Device {
                target: target.clone(),
                detail: format!(
                    "connection to printer {target} timed out after {}ms while {stage}",
                    deadline.as_millis()
                ),
            })
        }
    }
}

/// Connect, write and half-close.  The connected stream is parked in
/// `connection` so the caller can still reach it if this future is dropped.
async fn deliver(
    target: &PrinterTarget,
    document: &[u8],
    stage: &mut SubmitStage,
    connection: &mut Option<TcpStream>,
) -> Result<usize> {
    debug!(%target, total = document.len(), "connecting via raw TCP");

    let stream = connection.insert(
        TcpStream::connect((target.host.as_str(), target.port))
            .await
            .map_err(|e| device(target, format!("connect to printer {target} failed: {e}")))?,
    );

    *stage = SubmitStage::Writing;
    let mut sent = 0;
    for chunk in document.chunks(CHUNK_SIZE) {
        stream.write_all(chunk).await.map_err(|e| {
            device(target, format!("send to printer {target} failed at byte {sent}: {e}"))
        })?;
        sent += chunk.len();
        debug!(sent, total = document.len(), "raw TCP progress");
    }

    stream
        .flush()
        .await
        .map_err(|e| device(target, format!("flush to printer {target} failed: {e}")))?;

    // Half-close: tells the printer the label is complete.
    *stage = SubmitStage::Closing;
    stream
        .shutdown()
        .await
        .map_err(|e| device(target, format!("closing connection to printer {target} failed: {e}")))?;

    Ok(sent)
}

/// Drop `stream` with RST instead of FIN, discarding unsent bytes.
fn abort(target: &PrinterTarget, stream: TcpStream) {
    if let Err(e) = stream.set_zero_linger() {
        warn!(%target, error = %e, "could not arm connection reset, closing normally");
    }
}

fn device(target: &PrinterTarget, detail: String) -> ShekspirError {
    ShekspirError::Device {
        target: target.clone(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::test_support::{closed_port, spawn_printer, spawn_stalled_printer};

    #[tokio::test]
    async fn delivers_exact_bytes() {
        let (target, received) = spawn_printer().await;
        let label = b"^XA\n^FO75,40^FDAda^FS\n^XZ";

        let sent = send_raw(&target, label, Duration::from_secs(5)).await.unwrap();

        assert_eq!(sent, label.len());
        assert_eq!(received.await.unwrap(), label.to_vec());
    }

    #[tokio::test]
    async fn large_documents_are_chunked_but_complete() {
        let (target, received) = spawn_printer().await;
        let label: Vec<u8> = (0..100_000u32).map(|i| b'A' + (i % 26) as u8).collect();

        let sent = send_raw(&target, &label, Duration::from_secs(5)).await.unwrap();

        assert_eq!(sent, label.len());
        assert_eq!(received.await.unwrap(), label);
    }

    #[tokio::test]
    async fn refused_connection_fails_fast() {
        let target = closed_port().await;
        let started = Instant::now();

        let err = send_raw(&target, b"^XA^XZ", Duration::from_secs(10)).await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(err.target(), Some(&target));
        assert!(err.to_string().contains("connect to printer"), "{err}");
    }

    #[tokio::test]
    async fn stalled_printer_hits_the_deadline_and_is_reset() {
        let (target, hangup) = spawn_stalled_printer(Duration::from_millis(800)).await;
        // Far more than loopback socket buffers can absorb.
        let label = vec![b'Z'; 64 * 1024 * 1024];
        let deadline = Duration::from_millis(300);
        let started = Instant::now();

        let err = send_raw(&target, &label, deadline).await.unwrap_err();

        assert!(started.elapsed() < deadline + Duration::from_millis(500));
        assert!(err.to_string().contains("timed out after 300ms while writing"), "{err}");
        let hangup = hangup.await.unwrap();
        assert!(hangup.reset, "printer saw a clean close after the deadline");
        assert!(hangup.drained < label.len());
    }

    #[tokio::test]
    async fn completed_delivery_closes_cleanly() {
        let (target, hangup) = spawn_stalled_printer(Duration::from_millis(50)).await;
        let label = b"^XA\n^FO75,40^FDAda^FS\n^XZ";

        send_raw(&target, label, Duration::from_secs(5)).await.unwrap();

        let hangup = hangup.await.unwrap();
        assert!(!hangup.reset);
        assert_eq!(hangup.drained, label.len());
    }
}
