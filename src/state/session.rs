//! Session identifiers.

use chrono::{DateTime, Local, Utc};
use std::fmt;

/// Identifier of one process run against a progress file.
///
/// Format: `setup_{YYYYmmdd_HHMMSS}_{pid_hex}`. Informational only; it is
/// rewritten by every process that saves the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    timestamp: DateTime<Utc>,
    pid: u32,
}

impl SessionId {
    /// Generate an id for the current process.
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            pid: std::process::id(),
        }
    }

    /// Build an id from explicit parts.
    pub fn from_parts(timestamp: DateTime<Utc>, pid: u32) -> Self {
        Self { timestamp, pid }
    }

    /// When the session started.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> String {
        self.to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "setup_{}_{:x}",
            self.timestamp
                .with_timezone(&Local)
                .format("%Y%m%d_%H%M%S"),
            self.pid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_has_prefix() {
        let id = SessionId::new();
        assert!(id.as_str().starts_with("setup_"));
    }

    #[test]
    fn session_id_includes_pid_hex() {
        let id = SessionId::from_parts(Utc::now(), 255);
        assert!(id.as_str().ends_with("_ff"));
    }

    #[test]
    fn session_id_timestamp_is_recent() {
        let id = SessionId::new();
        let now = Utc::now();
        assert!(now.signed_duration_since(id.timestamp()).num_seconds() < 2);
    }

    #[test]
    fn session_id_shape() {
        let id = SessionId::new().to_string();
        let parts: Vec<&str> = id.split('_').collect();
        // setup, date, time, pid
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
    }
}
