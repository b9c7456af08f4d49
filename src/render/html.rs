//! HTML panels and page
//!
//! Each panel is a card with the team title followed by exactly one of:
//! the loading text, the empty-state text, or the chart plus a table of
//! every sample.

use std::fmt::Write;
use std::time::Duration;

use super::{bar_chart_svg, escape_html, format_value};
use crate::panel::{PanelView, Team};
use crate::series::AttributeSeries;

pub const LOADING_TEXT: &str = "Loading data...";
pub const EMPTY_TEXT: &str = "No data received from STH-Comet yet.";
pub const PAGE_TITLE: &str = "Placar FIWARE";

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;padding:24px;background:#f9fafb;color:#111827}\
h1{text-align:center;font-size:28px}\
.panel{background:#fff;border:1px solid #e5e7eb;border-radius:8px;box-shadow:0 4px 12px rgba(0,0,0,.08);padding:16px;margin:24px auto;max-width:860px}\
.panel h2{text-align:center;font-size:18px;margin:0 0 12px}\
.status{text-align:center;font-size:14px;color:#6b7280}\
table{width:100%;border-collapse:collapse;font-size:14px}\
th{text-align:left;border-bottom:1px solid #e5e7eb;padding-bottom:4px}\
td{padding:4px 0}";

/// Render one panel as an HTML fragment
pub fn render_panel(team: Team, view: &PanelView) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<section class="panel" id="panel-{attr}"><h2>{title}</h2>"#,
        attr = team.attribute(),
        title = escape_html(team.title()),
    );

    match view {
        PanelView::Loading => {
            let _ = write!(html, r#"<div class="status">{}</div>"#, LOADING_TEXT);
        }
        PanelView::Empty => {
            let _ = write!(html, r#"<div class="status">{}</div>"#, EMPTY_TEXT);
        }
        PanelView::Populated { series } => {
            html.push_str(&bar_chart_svg(series, team.color()));
            html.push_str(&render_table(series));
        }
    }

    html.push_str("</section>");
    html
}

fn render_table(series: &AttributeSeries) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="events"><h4>Last {} events</h4><table><thead><tr><th>Time</th><th>Value</th></tr></thead><tbody>"#,
        series.len()
    );

    for sample in series.iter() {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(sample.label()),
            format_value(sample.value)
        );
    }

    html.push_str("</tbody></table></div>");
    html
}

/// Render the full dashboard page.
///
/// The page reloads itself every `refresh`, so it follows the pollers
/// without any client-side code.
pub fn render_page(panels: &[(Team, PanelView)], refresh: Duration) -> String {
    let refresh_secs = refresh.as_secs().max(1);

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html><html lang="pt-BR"><head><meta charset="utf-8"><meta http-equiv="refresh" content="{refresh_secs}"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{PAGE_TITLE}</title><style>{STYLE}</style></head><body><main><h1>&#9917; {PAGE_TITLE}</h1>"#
    );

    for (team, view) in panels {
        html.push_str(&render_panel(*team, view));
    }

    html.push_str("</main></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::DisplaySample;

    fn sample(timestamp: &str, display_time: &str, value: f64) -> DisplaySample {
        DisplaySample {
            timestamp: timestamp.to_string(),
            value,
            display_time: display_time.to_string(),
        }
    }

    #[test]
    fn test_loading_panel() {
        let html = render_panel(Team::Blue, &PanelView::Loading);
        assert!(html.contains("<h2>Goals – Blue Team</h2>"));
        assert!(html.contains(LOADING_TEXT));
        assert!(!html.contains(EMPTY_TEXT));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_empty_panel() {
        let html = render_panel(Team::Red, &PanelView::Empty);
        assert!(html.contains("<h2>Goals – Red Team</h2>"));
        assert!(html.contains(EMPTY_TEXT));
        assert!(!html.contains(LOADING_TEXT));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_populated_panel_has_chart_and_table() {
        let series = AttributeSeries {
            attribute: "gr".to_string(),
            samples: vec![
                sample("2024-01-01T10:00:00Z", "10:00:00", 3.0),
                sample("<raw>", "", 1.5),
            ],
        };
        let html = render_panel(Team::Red, &PanelView::Populated { series });

        assert!(html.contains("<svg"));
        assert!(html.contains("#dc3545"));
        assert!(html.contains("<h4>Last 2 events</h4>"));
        assert!(html.contains("<tr><td>10:00:00</td><td>3</td></tr>"));
        // Falls back to the escaped raw timestamp
        assert!(html.contains("<tr><td>&lt;raw&gt;</td><td>1.5</td></tr>"));
        assert!(!html.contains(LOADING_TEXT));
        assert!(!html.contains(EMPTY_TEXT));
    }

    #[test]
    fn test_page_contains_panels_in_order() {
        let page = render_page(
            &[(Team::Blue, PanelView::Empty), (Team::Red, PanelView::Loading)],
            Duration::from_millis(5000),
        );

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<meta http-equiv="refresh" content="5">"#));
        assert!(page.contains("<title>Placar FIWARE</title>"));

        let blue = page.find("panel-gb").unwrap();
        let red = page.find("panel-gr").unwrap();
        assert!(blue < red);
    }

    #[test]
    fn test_page_refresh_never_zero() {
        let page = render_page(&[], Duration::from_millis(200));
        assert!(page.contains(r#"content="1""#));
    }
}
