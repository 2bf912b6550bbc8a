use std::fs;
use std::path::Path;
use std::time::Duration;

use coupon_core::{utc_offset, FormDefaults, SessionSettings};
use coupon_engine::ApiSettings;
use coupon_logging::{coupon_info, coupon_warn};
use serde::{Deserialize, Serialize};

const ENGINE_WAIT_MARGIN_SECS: u64 = 10;

/// Settings file contents. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Offset of the wall clock the dispatch time is typed in, east of UTC.
    pub utc_offset_minutes: i32,
    pub default_sales_manager: String,
    pub default_sender_phone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        let session = SessionSettings::default();
        Self {
            api_base_url: api.base_url,
            connect_timeout_secs: api.connect_timeout.as_secs(),
            request_timeout_secs: api.request_timeout.as_secs(),
            utc_offset_minutes: session.utc_offset_minutes,
            default_sales_manager: session.defaults.sales_manager,
            default_sender_phone: session.defaults.sender_phone,
        }
    }
}

impl AppConfig {
    pub fn api_settings(&self, base_url_override: Option<&str>) -> ApiSettings {
        ApiSettings {
            base_url: base_url_override
                .unwrap_or(&self.api_base_url)
                .to_string(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        let default_offset = SessionSettings::default().utc_offset_minutes;
        let utc_offset_minutes = if utc_offset(self.utc_offset_minutes).is_some() {
            self.utc_offset_minutes
        } else {
            coupon_warn!(
                "Ignoring utc_offset_minutes {}, using {}",
                self.utc_offset_minutes,
                default_offset
            );
            default_offset
        };
        SessionSettings {
            defaults: FormDefaults {
                sales_manager: self.default_sales_manager.clone(),
                sender_phone: self.default_sender_phone.clone(),
            },
            utc_offset_minutes,
        }
    }

    /// How long a command waits for one engine result. Longer than any HTTP
    /// call can take, so a timeout only happens when the engine is stuck.
    pub fn engine_wait(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs
                .saturating_add(self.request_timeout_secs)
                .saturating_add(ENGINE_WAIT_MARGIN_SECS),
        )
    }
}

/// Loads the settings file, falling back to defaults when it is missing or
/// unreadable.
pub(crate) fn load_config(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            coupon_warn!("Failed to read settings from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            coupon_info!("Loaded settings from {:?}", path);
            config
        }
        Err(err) => {
            coupon_warn!("Failed to parse settings from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}
