use wpmtrack::time_series::TimeSeriesPoint;

/// Compute X (seconds) and Y (WPM) bounds for the history chart
pub fn compute_chart_params(points: &[TimeSeriesPoint]) -> (f64, f64) {
    let highest_wpm = points.iter().map(|p| p.wpm).fold(0.0, f64::max);

    let overall_duration = points.last().map(|p| p.t).unwrap_or(1.0).max(1.0);

    // leave headroom so the top sample is not drawn on the border
    (overall_duration, (highest_wpm + highest_wpm / 10.0).ceil().max(10.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

/// Axis title and divisor for a duration in seconds
pub fn time_unit(seconds: f64) -> (&'static str, f64) {
    if seconds >= 2.0 * 86_400.0 {
        ("days", 86_400.0)
    } else if seconds >= 2.0 * 3_600.0 {
        ("hours", 3_600.0)
    } else if seconds >= 2.0 * 60.0 {
        ("minutes", 60.0)
    } else {
        ("seconds", 1.0)
    }
}
