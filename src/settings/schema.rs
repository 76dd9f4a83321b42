use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assistant::AssistantMode;
use crate::document::txt::DEFAULT_PAGE_SIZE;
use crate::pdf::{DEFAULT_SCALE, MAX_SCALE, MIN_SCALE, ZOOM_STEP, ZoomLimits};

pub const SETTINGS_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub schema_version: u32,
    pub appearance: AppearanceSettings,
    pub assistant: AssistantSettings,
    pub viewer: ViewerSettings,
    pub updates: UpdateSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION,
            appearance: AppearanceSettings::default(),
            assistant: AssistantSettings::default(),
            viewer: ViewerSettings::default(),
            updates: UpdateSettings::default(),
        }
    }
}

impl Settings {
    pub fn migrate(mut self) -> Self {
        if self.schema_version > SETTINGS_SCHEMA_VERSION {
            return self;
        }

        // v1 had no viewer section; serde defaults filled it, but a zero page
        // size written by early builds would make every page one line long.
        if self.schema_version < 2 && self.viewer.text_page_size == 0 {
            self.viewer.text_page_size = DEFAULT_PAGE_SIZE;
        }

        self.schema_version = SETTINGS_SCHEMA_VERSION;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    pub theme: ThemePreference,
    pub show_assistant_panel: bool,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: ThemePreference::System,
            show_assistant_panel: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ThemePreference {
    #[default]
    System,
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub default_mode: AssistantMode,
    pub simulate_latency: bool,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            default_mode: AssistantMode::Cloud,
            simulate_latency: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub text_page_size: usize,
    pub default_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            text_page_size: DEFAULT_PAGE_SIZE,
            default_zoom: DEFAULT_SCALE,
            min_zoom: MIN_SCALE,
            max_zoom: MAX_SCALE,
            zoom_step: ZOOM_STEP,
        }
    }
}

impl ViewerSettings {
    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits::from_factors(self.default_zoom, self.min_zoom, self.max_zoom, self.zoom_step)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateSettings {
    pub last_seen_version: String,
    pub last_check_utc: Option<DateTime<Utc>>,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            last_seen_version: env!("CARGO_PKG_VERSION").to_string(),
            last_check_utc: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"schema_version":1,"appearance":{"theme":"Dark"}}"#)
                .expect("parses");
        assert_eq!(settings.appearance.theme, ThemePreference::Dark);
        assert_eq!(settings.viewer.text_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.assistant.default_mode, AssistantMode::Cloud);
    }

    #[test]
    fn migrate_repairs_zero_page_size_from_v1() {
        let mut settings = Settings {
            schema_version: 1,
            ..Settings::default()
        };
        settings.viewer.text_page_size = 0;

        let migrated = settings.migrate();
        assert_eq!(migrated.schema_version, SETTINGS_SCHEMA_VERSION);
        assert_eq!(migrated.viewer.text_page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn migrate_leaves_newer_schemas_alone() {
        let settings = Settings {
            schema_version: SETTINGS_SCHEMA_VERSION + 1,
            ..Settings::default()
        };
        assert_eq!(settings.migrate().schema_version, SETTINGS_SCHEMA_VERSION + 1);
    }

    #[test]
    fn viewer_zoom_limits_use_hundredths() {
        let limits = ViewerSettings::default().zoom_limits();
        assert_eq!(limits, ZoomLimits::default());
        assert_eq!((limits.default, limits.min, limits.max, limits.step), (120, 50, 300, 20));
    }

    #[test]
    fn sections_dropped_from_older_files_are_ignored() {
        let settings: Settings = serde_json::from_str(
            r#"{"schema_version":2,"editor":{"spell_check":true},"updates":{"check_on_startup":false,"last_seen_version":"0.3.0"}}"#,
        )
        .expect("parses");
        assert_eq!(settings.updates.last_seen_version, "0.3.0");
        assert!(!settings.assistant.simulate_latency);
    }
}
