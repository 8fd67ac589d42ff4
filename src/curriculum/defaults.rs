// Built-in curriculum shipped with the game.
// The JSON lives next to the crate so the editor's export can be dropped in as-is.
use super::Curriculum;

const DEFAULT_CURRICULUM_JSON: &str = include_str!("../../assets/default_curriculum.json");

pub fn default_curriculum() -> Curriculum {
    Curriculum::from_json(DEFAULT_CURRICULUM_JSON).unwrap_or_else(|err| {
        log::error!("built-in curriculum is broken: {err}");
        Curriculum::default()
    })
}
