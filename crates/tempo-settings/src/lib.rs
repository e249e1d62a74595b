//! Layered configuration for the Tempo daemon.
//!
//! Settings are resolved from three layers, lowest priority first:
//!
//! 1. **Compiled defaults** — [`TempoSettings::default()`]
//! 2. **User file** — `~/.tempo/settings.json`, deep-merged over defaults
//! 3. **Environment variables** — `TEMPO_*` overrides
//!
//! [`load_settings`] walks all three layers and validates the result (the
//! configured timezone must name a real IANA zone). Callers that need a
//! non-standard file location go through [`load_settings_from_path`].

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
