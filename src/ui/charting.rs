use crate::session::ScorePoint;

/// X (seconds) and Y (score) bounds for the results chart
pub fn compute_chart_params(timeline: &[ScorePoint], fallback_secs: f64) -> (f64, f64) {
    let top_score = timeline
        .iter()
        .map(|p| p.score)
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let duration = timeline
        .last()
        .map(|p| p.secs)
        .unwrap_or(fallback_secs)
        .max(1.0);

    (duration, top_score.round())
}

pub fn chart_points(timeline: &[ScorePoint]) -> Vec<(f64, f64)> {
    timeline.iter().map(|p| (p.secs, p.score)).collect()
}

/// Whole numbers without decimals, anything else with two
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

    fn point(secs: f64, score: f64) -> ScorePoint {
        ScorePoint { secs, score }
    }

    #[test]
    fn empty_timeline_uses_fallback() {
        assert_eq!(compute_chart_params(&[], 5.0), (5.0, 1.0));
        assert_eq!(compute_chart_params(&[], 0.0), (1.0, 1.0));
    }

    #[test]
    fn bounds_follow_the_timeline() {
        let timeline = [point(1.0, 2.0), point(2.0, 7.0), point(3.0, 7.0)];
        assert_eq!(compute_chart_params(&timeline, 60.0), (3.0, 7.0));
        assert_eq!(chart_points(&timeline)[1], (2.0, 7.0));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
