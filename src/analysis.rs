use crate::data::QuoteSample;

/// Percent change between the latest close and the one before it.
///
/// Samples must be ordered newest first. Returns `None` when there are fewer
/// than two samples, a close is not a number, or the previous close is zero.
pub fn percent_change(samples: &[QuoteSample]) -> Option<f64> {
    let last = samples.first()?.close_price()?;
    let previous = samples.get(1)?.close_price()?;

    if previous == 0.0 {
        return None;
    }

    Some(100.0 * (last - previous) / previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(close: &str) -> QuoteSample {
        QuoteSample {
            timestamp: "2024-05-03".to_string(),
            open: close.to_string(),
            high: close.to_string(),
            low: close.to_string(),
            close: close.to_string(),
            volume: "0".to_string(),
        }
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a value");
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_percent_change_rise_and_fall() {
        assert_close(percent_change(&[sample("110"), sample("100")]), 10.0);
        assert_close(percent_change(&[sample("90"), sample("100")]), -10.0);
        assert_close(percent_change(&[sample("183.38"), sample("173.03")]), 5.981621684101);
    }

    #[test]
    fn test_only_two_newest_samples_matter() {
        let samples = [sample("50"), sample("40"), sample("1")];
        assert_close(percent_change(&samples), 25.0);
    }

    #[test]
    fn test_insufficient_or_bad_data() {
        assert_eq!(percent_change(&[]), None);
        assert_eq!(percent_change(&[sample("10")]), None);
        assert_eq!(percent_change(&[sample("10"), sample("0")]), None);
        assert_eq!(percent_change(&[sample("abc"), sample("10")]), None);
    }
}
