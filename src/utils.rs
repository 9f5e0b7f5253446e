use chrono::{DateTime, Utc};

/// Helper function to format duration in a compact way
pub fn format_duration_compact(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let duration = end.signed_duration_since(start);
    let total_seconds = duration.num_seconds();

    if total_seconds < 60 {
        format!("{}s", total_seconds)
    } else if total_seconds < 3600 {
        format!("{}m", total_seconds / 60)
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        if minutes > 0 {
            format!("{}h{}m", hours, minutes)
        } else {
            format!("{}h", hours)
        }
    }
}

/// Format a token price with enough precision for sub-cent assets
pub fn format_price(price: f64) -> String {
    if price >= 1.0 {
        format!("{:.4}", price)
    } else if price >= 0.001 {
        format!("{:.6}", price)
    } else {
        format!("{:.10}", price)
    }
}

/// Format a signed percentage with an explicit sign
pub fn format_pct(pct: f64) -> String {
    if pct >= 0.0 {
        format!("+{:.2}%", pct)
    } else {
        format!("{:.2}%", pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_duration_compact() {
        let start = Utc::now();
        assert_eq!(format_duration_compact(start, start + Duration::seconds(45)), "45s");
        assert_eq!(format_duration_compact(start, start + Duration::seconds(150)), "2m");
        assert_eq!(
            format_duration_compact(start, start + Duration::seconds(3660)),
            "1h1m"
        );
    }

    #[test]
    fn test_format_price_scales_precision() {
        assert_eq!(format_price(12.5), "12.5000");
        assert_eq!(format_price(0.0025), "0.002500");
        assert_eq!(format_price(0.00000025), "0.0000002500");
    }

    #[test]
    fn test_format_pct_sign() {
        assert_eq!(format_pct(3.456), "+3.46%");
        assert_eq!(format_pct(-12.0), "-12.00%");
    }
}
