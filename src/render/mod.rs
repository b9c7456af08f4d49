//! Panel rendering
//!
//! Server-side HTML for the dashboard. Charts are inline SVG so the page
//! needs no scripts.

pub mod chart;
pub mod html;

pub use chart::bar_chart_svg;
pub use html::{render_page, render_panel};

/// Escape text for use in HTML element content and attribute values
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format a reading: whole numbers without a fractional part
pub fn format_value(value: f64) -> String {
    if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        value.to_string()
    }
}
