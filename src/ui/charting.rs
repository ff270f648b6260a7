use crate::metrics::WpmSample;

/// X (seconds) and Y (WPM) upper bounds for the results chart
pub fn compute_chart_params(samples: &[WpmSample], elapsed_secs: f64) -> (f64, f64) {
    let highest_wpm = samples.iter().map(|s| s.wpm).max().unwrap_or(0) as f64;

    let overall_duration = samples
        .last()
        .map(|s| s.t)
        .unwrap_or(elapsed_secs)
        .max(elapsed_secs)
        .max(1.0);

    (overall_duration, highest_wpm.max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        assert_eq!(compute_chart_params(&[], 0.4), (1.0, 1.0));
        assert_eq!(compute_chart_params(&[], 5.0), (5.0, 1.0));
    }

    #[test]
    fn test_compute_chart_params_samples() {
        let samples = [WpmSample::new(1.0, 30), WpmSample::new(2.0, 55)];
        assert_eq!(compute_chart_params(&samples, 2.4), (2.4, 55.0));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
