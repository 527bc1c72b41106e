// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mock label printers for tests: real TCP listeners on loopback.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use std::io::ErrorKind;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shekspir_core::types::PrinterTarget;

async fn bind() -> (TcpListener, PrinterTarget) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, PrinterTarget::new("127.0.0.1", port))
}

/// A printer that accepts one connection and returns everything it received
/// once the sender closes.
pub(crate) async fn spawn_printer() -> (PrinterTarget, JoinHandle<Vec<u8>>) {
    let (listener, target) = bind().await;
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        socket.read_to_end(&mut received).await.unwrap();
        received
    });
    (target, handle)
}

/// A listener that only counts accepted connections.
pub(crate) async fn spawn_counting_listener() -> (PrinterTarget, Arc<AtomicUsize>) {
    let (listener, target) = bind().await;
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    tokio::spawn(async move {
        while let Ok((_socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    (target, accepted)
}

/// An address with nothing listening on it.
pub(crate) async fn closed_port() -> PrinterTarget {
    let (listener, target) = bind().await;
    drop(listener);
    target
}

/// How a connection to a stalled printer ended.
#[derive(Debug)]
pub(crate) struct Hangup {
    /// Bytes read once the printer started reading again.
    pub drained: usize,
    /// The sender reset the connection instead of closing it.
    pub reset: bool,
}

/// A printer that accepts and then never reads for `hold`.  Afterwards it
/// drains the socket and reports how the sender went away.  Panics if the
/// connection is still open ten seconds later.
pub(crate) async fn spawn_stalled_printer(hold: Duration) -> (PrinterTarget, JoinHandle<Hangup>) {
    let (listener, target) = bind().await;
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(hold).await;

        let drain = async {
            let mut buf = vec![0u8; 64 * 1024];
            let mut drained = 0;
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) => break Hangup { drained, reset: false },
                    Ok(n) => drained += n,
                    Err(e) => {
                        assert_eq!(e.kind(), ErrorKind::ConnectionReset, "{e}");
                        break Hangup { drained, reset: true };
                    }
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(10), drain)
            .await
            .expect("sender never closed the connection")
    });
    (target, handle)
}
