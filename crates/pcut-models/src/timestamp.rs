//! Timestamp parsing for edit-plan time ranges.
//!
//! Prompts reference points in the source video as `SS`, `MM:SS`, or
//! `HH:MM:SS`, each with optional fractional seconds.

use thiserror::Error;

/// Errors from timestamp parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("timestamp cannot be empty")]
    Empty,

    #[error("invalid timestamp component '{0}'")]
    InvalidComponent(String),

    #[error("timestamp cannot be negative: {0}")]
    Negative(String),

    #[error("invalid timestamp format '{0}': use SS, MM:SS, or HH:MM:SS")]
    TooManyComponents(String),
}

/// Parse a timestamp string into non-negative seconds.
///
/// Accepts one to three colon-separated components, most significant first.
/// Each component may carry a fractional part.
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::TooManyComponents(ts.to_string()));
    }

    let mut total = 0.0;
    for part in &parts {
        let value: f64 = part
            .trim()
            .parse()
            .map_err(|_| TimestampError::InvalidComponent(part.to_string()))?;
        if value < 0.0 {
            return Err(TimestampError::Negative(ts.to_string()));
        }
        total = total * 60.0 + value;
    }

    Ok(total)
}

/// Format seconds as `HH:MM:SS` (with milliseconds when non-integral),
/// for logs and error messages.
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if secs.fract().abs() > 1e-4 {
        format!("{hours:02}:{mins:02}:{secs:06.3}")
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}
