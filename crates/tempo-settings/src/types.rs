//! Settings structure.
//!
//! Every section derives `Default` and deserializes with
//! `#[serde(default)]`, so a partial settings file only has to name the
//! keys it changes.

use serde::{Deserialize, Serialize};

/// Root settings for the Tempo backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TempoSettings {
    /// Network binding.
    pub server: ServerSettings,
    /// Database location.
    pub database: DatabaseSettings,
    /// Day-boundary timezone.
    pub time: TimeSettings,
    /// Background loop cadences.
    pub scheduler: SchedulerSettings,
    /// Log output shape.
    pub logging: LoggingSettings,
}

/// Server network settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

/// Database settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Path to the SQLite file.
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "tempo.db".to_string(),
        }
    }
}

/// Time settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSettings {
    /// IANA timezone whose midnight defines the day boundary.
    pub timezone: String,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

/// Scheduler cadences in seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerSettings {
    /// Due-check tick interval.
    pub due_check_secs: u64,
    /// Retention sweep interval.
    pub retention_check_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            due_check_secs: 60,
            retention_check_secs: 3600,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default tracing filter, e.g. `info` or `tempo_server=debug`.
    pub level: String,
    /// Emit JSON-structured lines instead of human-readable ones.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let settings = TempoSettings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.database.path, "tempo.db");
        assert_eq!(settings.time.timezone, "UTC");
        assert_eq!(settings.scheduler.due_check_secs, 60);
        assert_eq!(settings.scheduler.retention_check_secs, 3600);
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
    }

    #[test]
    fn serializes_in_camel_case() {
        let json = serde_json::to_value(TempoSettings::default()).unwrap();
        assert_eq!(json["scheduler"]["dueCheckSecs"], 60);
        assert_eq!(json["scheduler"]["retentionCheckSecs"], 3600);
        assert_eq!(json["time"]["timezone"], "UTC");
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: TempoSettings =
            serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.database.path, "tempo.db");
    }
}
