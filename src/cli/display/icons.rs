//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (all containers ready)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (partially ready)
    pub const WARNING: &'static str = "⚠";

    /// Error icon (nothing ready)
    pub const ERROR: &'static str = "✗";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    /// Get status icon based on ready/total counts
    pub fn get_readiness_icon(ready: u32, total: u32) -> &'static str {
        if total == 0 {
            Self::UNKNOWN
        } else if ready == total {
            Self::SUCCESS
        } else if ready > 0 {
            Self::WARNING
        } else {
            Self::ERROR
        }
    }
}

/// Parse a `ready/total` readiness string into counts.
pub fn parse_readiness(readiness: &str) -> (u32, u32) {
    match readiness.split_once('/') {
        Some((ready, total)) => (
            ready.trim().parse().unwrap_or(0),
            total.trim().parse().unwrap_or(0),
        ),
        None => (0, 0),
    }
}
