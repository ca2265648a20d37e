/// WPM axis is rounded up to a multiple of this
const WPM_STEP: f64 = 10.0;

/// X and Y upper bounds for a WPM chart.
///
/// X is the last point's position (or `fallback_x` with no points); Y is the
/// highest WPM rounded up to the next step, never below one step.
pub fn compute_chart_params(points: &[(f64, f64)], fallback_x: Option<f64>) -> (f64, f64) {
    let highest_wpm = points.iter().map(|&(_, wpm)| wpm).fold(0.0, f64::max);

    let x_max = points
        .last()
        .map(|&(x, _)| x)
        .or(fallback_x)
        .unwrap_or(1.0)
        .max(1.0);

    let y_max = ((highest_wpm / WPM_STEP).ceil() * WPM_STEP).max(WPM_STEP);
    (x_max, y_max)
}

/// Axis label: whole numbers without decimals
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
