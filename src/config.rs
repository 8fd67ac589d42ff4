//! Runtime configuration handed over by the hosting page.
//!
//! Every field has a default so the page may pass `undefined`, `"{}"` or only the
//! fields it wants to override (typically `apiKey`).

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Local storage slot holding the persisted curriculum.
    pub storage_key: String,
    /// Convenience gate only, compared in plain text on the client.
    pub unlock_passcode: String,
    /// Convenience gate only, compared in plain text on the client.
    pub admin_passcode: String,
    /// Judge score (0-10) at or above which a drawing passes.
    pub pass_score: f64,
    pub replay_step_ms: i32,
    /// Ink line width is `canvas width / stroke_ratio`.
    pub stroke_ratio: f64,
    pub feedback_ms: i32,
    pub passcode_error_ms: i32,
    pub prompt_ms: i32,
    pub api_base: String,
    pub api_key: String,
    pub judge_model: String,
    pub generate_model: String,
    pub export_file_name: String,
    /// Cover image given to lessons created in the editor.
    pub placeholder_image: String,
    /// Initial pronunciation, `zh-HK` or `zh-CN`.
    pub speech_lang: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: "rainbow_academy_lessons".into(),
            unlock_passcode: "Rainbow888".into(),
            admin_passcode: "Admin888".into(),
            pass_score: 6.0,
            replay_step_ms: 12,
            stroke_ratio: 18.0,
            feedback_ms: 1000,
            passcode_error_ms: 2000,
            prompt_ms: 3000,
            api_base: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: String::new(),
            judge_model: "gemini-3-flash-preview".into(),
            generate_model: "gemini-3-pro-preview".into(),
            export_file_name: "rainbow_academy_curriculum.json".into(),
            placeholder_image: "https://images.unsplash.com/photo-1591123120675-6f7f1aae0e5b".into(),
            speech_lang: "zh-HK".into(),
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: Option<&str>) -> Result<Self, ConfigError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => Ok(serde_json::from_str(text)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let cfg = AppConfig::from_json(None).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.pass_score, 6.0);
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let cfg = AppConfig::from_json(Some(r#"{"apiKey":"k","passScore":7.5}"#)).unwrap();
        assert_eq!(cfg.api_key, "k");
        assert_eq!(cfg.pass_score, 7.5);
        assert_eq!(cfg.unlock_passcode, "Rainbow888");
    }

    #[test]
    fn malformed_config_is_rejected() {
        assert!(AppConfig::from_json(Some("{nope")).is_err());
    }
}
