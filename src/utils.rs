/// Number of steps on the seek bar
pub const SEEK_BAR_RESOLUTION: u32 = 500;

/// Format milliseconds as `MM:SS`, or `H:MM:SS` once past the hour
pub fn format_time(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Seek bar value for a position within a track
pub fn seek_value(position_ms: u64, duration_ms: u64) -> u32 {
    if duration_ms == 0 {
        return 0;
    }
    let ratio = (position_ms as f64 / duration_ms as f64).clamp(0.0, 1.0);
    (ratio * SEEK_BAR_RESOLUTION as f64).round() as u32
}

/// Position in milliseconds for a seek bar value
pub fn position_from_seek(value: f64, duration_ms: u64) -> u64 {
    let ratio = (value / SEEK_BAR_RESOLUTION as f64).clamp(0.0, 1.0);
    (ratio * duration_ms as f64).round() as u64
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(61_500), "01:01");
        assert_eq!(format_time(3_725_000), "1:02:05");
    }

    #[test]
    fn test_seek_conversion() {
        assert_eq!(seek_value(30_000, 60_000), 250);
        assert_eq!(seek_value(90_000, 60_000), 500);
        assert_eq!(seek_value(1_000, 0), 0);
        assert_eq!(position_from_seek(250.0, 60_000), 30_000);
        assert_eq!(position_from_seek(900.0, 60_000), 60_000);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a longer title", 5), "a lo…");
    }
}
