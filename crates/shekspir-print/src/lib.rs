// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shekspir Print — the label print bridge.  Accepts rendered labels over
// HTTP and streams them to label printers over raw TCP (port 9100), plus the
// desk-side client for that bridge and the print-then-record check-in flow.

pub mod bridge;
pub mod checkin;
pub mod client;
pub mod raw_client;
pub mod server;

#[cfg(test)]
mod test_support;

pub use bridge::{Delivery, LabelJob, PrintBridge};
pub use checkin::{AttendanceLog, CheckIn, CheckInDesk, CheckInFailure, Recorded};
pub use client::{BridgeClient, SubmitOptions};
pub use server::{router, serve};
