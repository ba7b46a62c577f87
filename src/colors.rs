//! Color utilities for request tracing output.

use axum::http::StatusCode;
use owo_colors::{AnsiColors, DynColors, OwoColorize, Style};

/// ANSI colors used to tint request IDs
///
/// Standard and bright variants only; both stay readable on light and dark
/// terminal backgrounds.
const ID_COLORS: [AnsiColors; 12] = [
    AnsiColors::Red,
    AnsiColors::Green,
    AnsiColors::Yellow,
    AnsiColors::Blue,
    AnsiColors::Magenta,
    AnsiColors::Cyan,
    AnsiColors::BrightRed,
    AnsiColors::BrightGreen,
    AnsiColors::BrightYellow,
    AnsiColors::BrightBlue,
    AnsiColors::BrightMagenta,
    AnsiColors::BrightCyan,
];

/// Deterministically picks a palette slot for a request ID
///
/// FNV-1a over the ID bytes; the same ID maps to the same color across runs,
/// which keeps a request visually traceable through interleaved log lines.
fn color_index(id: &str) -> usize {
    let hash = id.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |acc, byte| {
        (acc ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    });
    (hash % ID_COLORS.len() as u64) as usize
}

/// Formats a request ID with its deterministic color, wrapped in brackets.
pub fn colored_id(id: &str) -> String {
    let style = Style::new().color(DynColors::Ansi(ID_COLORS[color_index(id)]));
    format!("[{}]", id).style(style).to_string()
}

/// Tints a status code by its class: green for success, cyan for redirects,
/// yellow for client errors, red for everything else.
pub fn colored_status(status: StatusCode) -> String {
    let color = if status.is_success() {
        AnsiColors::Green
    } else if status.is_redirection() {
        AnsiColors::Cyan
    } else if status.is_client_error() {
        AnsiColors::Yellow
    } else {
        AnsiColors::Red
    };
    status.color(color).to_string()
}
