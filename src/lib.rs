//! Rainbow Brush core crate.
//!
//! A children's Chinese-learning game: lessons of characters unlocked by handwriting
//! practice, phrase and picture mini-games, a story builder and a passcode-gated
//! curriculum editor with AI lesson generation. The page calls `start_app()` once;
//! everything else is driven by DOM events.

use wasm_bindgen::prelude::*;

pub mod admin;
pub mod ai;
pub mod app;
pub mod challenges;
pub mod config;
pub mod curriculum;
pub mod error;
pub mod progression;
pub mod speech;
pub mod store;
pub mod story;
pub mod strokes;

pub use app::{Action, App, Effect, Screen};
pub use config::AppConfig;
pub use curriculum::{Character, Curriculum, Lesson, MatchQuestion, Phrase, default_curriculum};
pub use error::{AiError, ConfigError, CurriculumError, StorageError};
pub use store::{CurriculumStore, LoadSource, MemoryStorage, SlotStorage};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (hot reload) fails harmlessly.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Mount the game. `config_json` may override any `AppConfig` field (camelCase keys).
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_app(config_json: Option<String>) -> Result<(), JsValue> {
    let config = AppConfig::from_json(config_json.as_deref())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    app::start(config)
}
