// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// shekspir-label — Badge label rendering for the Shekspir check-in desk.
//
// Turns an attendee record into a self-contained ZPL document ready to be
// streamed to a label printer.  Pure code: no I/O, no clock, no randomness.

pub mod zpl;

// Re-export the builder so callers can use `shekspir_label::build_badge` etc.
pub use zpl::{LabelDocument, LabelLayout, build_badge, sanitize_field};
