//! Bar Chart
//!
//! One bar per sample, x-axis labelled with the display time, y-axis with
//! integer ticks. Each bar carries a `<title>` tooltip with time and value.

use std::fmt::Write;

use super::{escape_html, format_value};
use crate::series::AttributeSeries;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 300.0;

const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 60.0;

/// Widest a bar may get
const MAX_BAR_WIDTH: f64 = 25.0;

/// Target number of y-axis gridlines
const Y_TICKS: i64 = 5;

/// Axis bounds are clamped to ±this; larger readings draw as full-height bars
const AXIS_LIMIT: f64 = 1e15;

const GRID_COLOR: &str = "#e5e7eb";
const AXIS_COLOR: &str = "#6b7280";

/// Integer y-axis domain covering every finite value and zero
#[derive(Debug, Clone, Copy, PartialEq)]
struct Domain {
    min: i64,
    max: i64,
    step: i64,
}

impl Domain {
    fn for_series(series: &AttributeSeries) -> Self {
        let finite = series.iter().map(|s| s.value).filter(|v| v.is_finite());
        let (lo, hi) = finite.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

        let min = lo.clamp(-AXIS_LIMIT, AXIS_LIMIT).floor() as i64;
        let mut max = hi.clamp(-AXIS_LIMIT, AXIS_LIMIT).ceil() as i64;
        if max == min {
            max = min.saturating_add(1);
        }

        let span = max.saturating_sub(min);
        let step = (span.saturating_add(Y_TICKS - 1) / Y_TICKS).max(1);
        let max = min.saturating_add(span.saturating_add(step - 1) / step * step);

        Self { min, max, step }
    }

    fn ticks(&self) -> impl Iterator<Item = i64> + '_ {
        (0..)
            .map(move |i| self.min + i * self.step)
            .take_while(move |t| *t <= self.max)
    }

    /// Map a value to an SVG y coordinate, clamped to the plot area
    fn y(&self, value: f64) -> f64 {
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let value = value.clamp(self.min as f64, self.max as f64);
        let ratio = (value - self.min as f64) / (self.max - self.min) as f64;
        MARGIN_TOP + plot_height * (1.0 - ratio)
    }
}

/// Render the series as an inline SVG bar chart
pub fn bar_chart_svg(series: &AttributeSeries, color: &str) -> String {
    let domain = Domain::for_series(series);
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let slot = plot_width / series.len().max(1) as f64;
    let bar_width = (slot * 0.8).min(MAX_BAR_WIDTH);
    let baseline = domain.y(0.0);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="bar-chart" viewBox="0 0 {w} {h}" width="100%" height="{h}" role="img" xmlns="http://www.w3.org/2000/svg">"#,
        w = WIDTH,
        h = HEIGHT
    );

    // Horizontal gridlines and y labels
    for tick in domain.ticks() {
        let y = domain.y(tick as f64);
        let _ = write!(
            svg,
            r#"<line x1="{x1}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="{grid}" stroke-dasharray="3 3"/><text x="{lx}" y="{ty:.1}" text-anchor="end" font-size="11" fill="{axis}">{tick}</text>"#,
            x1 = MARGIN_LEFT,
            x2 = WIDTH - MARGIN_RIGHT,
            grid = GRID_COLOR,
            lx = MARGIN_LEFT - 6.0,
            ty = y + 4.0,
            axis = AXIS_COLOR,
        );
    }

    // Bars, x labels and tooltips
    for (i, sample) in series.iter().enumerate() {
        let center = MARGIN_LEFT + slot * (i as f64 + 0.5);
        let top = domain.y(sample.value);
        let (y, height) = if top <= baseline {
            (top, baseline - top)
        } else {
            (baseline, top - baseline)
        };
        let label = escape_html(&sample.display_time);

        let _ = write!(
            svg,
            r#"<g class="bar"><title>Time: {label}&#10;Goals: {value}</title><rect x="{x:.1}" y="{y:.1}" width="{bw:.1}" height="{height:.1}" fill="{color}"/></g>"#,
            value = format_value(sample.value),
            x = center - bar_width / 2.0,
            bw = bar_width,
            color = escape_html(color),
        );
        let _ = write!(
            svg,
            r#"<text x="{center:.1}" y="{ly:.1}" text-anchor="end" font-size="11" fill="{axis}" transform="rotate(-35 {center:.1} {ly:.1})">{label}</text>"#,
            ly = HEIGHT - MARGIN_BOTTOM + 16.0,
            axis = AXIS_COLOR,
        );
    }

    // Axes
    let _ = write!(
        svg,
        r#"<line x1="{x1}" y1="{b:.1}" x2="{x2}" y2="{b:.1}" stroke="{axis}"/><line x1="{x1}" y1="{top}" x2="{x1}" y2="{bottom}" stroke="{axis}"/></svg>"#,
        x1 = MARGIN_LEFT,
        x2 = WIDTH - MARGIN_RIGHT,
        b = baseline,
        top = MARGIN_TOP,
        bottom = HEIGHT - MARGIN_BOTTOM,
        axis = AXIS_COLOR,
    );

    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::DisplaySample;

    fn series_of(values: &[f64]) -> AttributeSeries {
        AttributeSeries {
            attribute: "gb".to_string(),
            samples: values
                .iter()
                .enumerate()
                .map(|(i, &value)| DisplaySample {
                    timestamp: format!("2024-01-01T10:00:0{}Z", i),
                    value,
                    display_time: format!("10:00:0{}", i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_domain_integer_ticks() {
        let domain = Domain::for_series(&series_of(&[3.0, 7.0, 1.0]));
        assert_eq!(domain, Domain { min: 0, max: 8, step: 2 });
        assert_eq!(domain.ticks().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);

        let domain = Domain::for_series(&series_of(&[0.0]));
        assert_eq!(domain, Domain { min: 0, max: 1, step: 1 });

        let domain = Domain::for_series(&series_of(&[2.5]));
        assert_eq!(domain.ticks().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_domain_ignores_infinite_values() {
        let domain = Domain::for_series(&series_of(&[2.0, f64::INFINITY]));
        assert_eq!(domain.max, 2);
        assert_eq!(domain.y(f64::INFINITY), domain.y(2.0));
    }

    #[test]
    fn test_huge_readings_clamp_the_axis() {
        for value in [1e300, -1e300, f64::MAX, f64::MIN] {
            let domain = Domain::for_series(&series_of(&[value]));
            assert!(domain.min >= -(AXIS_LIMIT as i64));
            assert!(domain.max <= AXIS_LIMIT as i64 + domain.step);
            assert!(domain.step > 0);
            assert_eq!(domain.ticks().count(), 6);

            let svg = bar_chart_svg(&series_of(&[1.0, value]), "#007bff");
            assert_eq!(svg.matches("<rect").count(), 2);
            assert!(!svg.contains("NaN"));
        }
    }

    #[test]
    fn test_one_bar_per_sample() {
        let svg = bar_chart_svg(&series_of(&[1.0, 2.0, 3.0]), "#007bff");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 3);
        assert_eq!(svg.matches(r##"fill="#007bff""##).count(), 3);
        assert!(svg.contains(">10:00:02</text>"));
    }

    #[test]
    fn test_tooltip_shows_time_and_value() {
        let svg = bar_chart_svg(&series_of(&[4.0]), "#dc3545");
        assert!(svg.contains("<title>Time: 10:00:00&#10;Goals: 4</title>"));
    }

    #[test]
    fn test_taller_bar_for_larger_value() {
        let domain = Domain::for_series(&series_of(&[1.0, 4.0]));
        assert!(domain.y(4.0) < domain.y(1.0));
        assert_eq!(domain.y(0.0), HEIGHT - MARGIN_BOTTOM);
    }
}
