// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ZPL badge builder.
//
// A badge is a fixed 80 x 50 mm label (640 x 400 dots at 203 dpi) with the
// attendee's first name as the title and the company underneath.  ZPL is a
// line-oriented command language: `^` and `~` introduce commands, so any
// attendee field must be scrubbed before it lands inside a `^FD...^FS` field.
//
// Document layout:
//
// ```text
// ^XA                     start of label
// ^PW640                  print width (dots)
// ^LL400                  label length (dots)
// ^CF0,100                default font, 100 dots high
// ^FO75,40^FDAda^FS       title field
// ^CF0,60                 default font, 60 dots high
// ^FO75,200^FDAcme^FS     subtitle field
// ^PQ1                    print quantity
// ^XZ                     end of label
// ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use shekspir_core::types::Attendee;

/// Label width in dots: 80 mm at 203 dpi.
pub const DEFAULT_WIDTH_DOTS: u32 = 640;

/// Label height in dots: 50 mm at 203 dpi.
pub const DEFAULT_HEIGHT_DOTS: u32 = 400;

/// Title used when the attendee has no printable name.
pub const PLACEHOLDER_NAME: &str = "ATTENDEE";

/// Subtitle used when the attendee has no printable company.  A blank field
/// keeps the label's layout stable.
pub const PLACEHOLDER_COMPANY: &str = " ";

/// Physical label size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelLayout {
    pub width_dots: u32,
    pub height_dots: u32,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            width_dots: DEFAULT_WIDTH_DOTS,
            height_dots: DEFAULT_HEIGHT_DOTS,
        }
    }
}

/// A rendered badge: the ordered ZPL lines of one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDocument {
    lines: Vec<String>,
}

impl LabelDocument {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The document as the single text blob sent to the printer.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl std::fmt::Display for LabelDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<LabelDocument> for String {
    fn from(doc: LabelDocument) -> Self {
        doc.to_text()
    }
}

/// Make a field safe to embed in a ZPL `^FD` block.
///
/// Every character outside printable ASCII, plus the command prefixes `^` and
/// `~`, becomes a single space; the result is then trimmed.  Applying it twice
/// gives the same string as applying it once.
pub fn sanitize_field(value: Option<&str>) -> String {
    value
        .unwrap_or_default()
        .chars()
        .map(|c| if is_safe_char(c) { c } else { ' ' })
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_safe_char(c: char) -> bool {
    matches!(c, ' '..='~') && c != '^' && c != '~'
}

/// Render the badge for `attendee`.
///
/// `copies` below 1 still prints one badge.  Field lengths are not checked
/// against the label size; the printer clips overflowing text.
pub fn build_badge(attendee: &Attendee, copies: i64, layout: LabelLayout) -> LabelDocument {
    let name = sanitize_field(Some(&attendee.first_name));
    let name = if name.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        name
    };

    let company = sanitize_field(attendee.company.as_deref());
    let company = if company.is_empty() {
        PLACEHOLDER_COMPANY.to_string()
    } else {
        company
    };

    if copies < 1 {
        debug!(requested = copies, "copy count raised to 1");
    }
    let copies = copies.max(1);

    LabelDocument {
        lines: vec![
            "^XA".to_string(),
            format!("^PW{}", layout.width_dots),
            format!("^LL{}", layout.height_dots),
            "^CF0,100".to_string(),
            format!("^FO75,40^FD{name}^FS"),
            "^CF0,60".to_string(),
            format!("^FO75,200^FD{company}^FS"),
            format!("^PQ{copies}"),
            "^XZ".to_string(),
        ],
    }
}
