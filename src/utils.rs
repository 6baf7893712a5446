use std::time::{Duration, Instant};

/// Format a `Duration` with automatic unit scaling, e.g. `1.94ms` or `2.34s`.
pub fn fmt_duration(d: Duration) -> String {
    format!("{d:.2?}")
}

/// Log a warning if the elapsed time since `start` exceeds `threshold`.
pub fn log_if_slow(start: Instant, threshold: Duration, label: &str) {
    let elapsed = start.elapsed();
    if elapsed > threshold {
        tracing::warn!(duration = fmt_duration(elapsed), "slow operation: {label}");
    }
}

/// Split `camelCase`, `snake_case`, `kebab-case` and `SCREAMING_CASE`
/// identifiers into capitalized words: `paymentStatus` → `Payment Status`.
pub fn humanize_identifier(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in key.chars() {
        if matches!(ch, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_identifier() {
        assert_eq!(humanize_identifier("paymentStatus"), "Payment Status");
        assert_eq!(humanize_identifier("fee_type"), "Fee Type");
        assert_eq!(humanize_identifier("FEE_ASSIGNED"), "Fee Assigned");
        assert_eq!(humanize_identifier("login"), "Login");
        assert_eq!(humanize_identifier("student.update-profile"), "Student Update Profile");
        assert_eq!(humanize_identifier("term2Name"), "Term2 Name");
        assert_eq!(humanize_identifier(""), "");
    }

    #[test]
    fn test_fmt_duration() {
        assert_eq!(fmt_duration(Duration::from_millis(1500)), "1.50s");
    }
}
