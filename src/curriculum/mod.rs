//! Curriculum data model: lessons, their characters, phrases and picture questions.
//!
//! The serialized form is the one the page has always stored in local storage
//! (camelCase keys, the glyph under `"char"`), so older saves keep loading. Fields
//! added after the first release are defaulted on read.

use serde::{Deserialize, Serialize};

use crate::error::CurriculumError;
use crate::strokes::{Point, Stroke};

mod defaults;

pub use defaults::default_curriculum;

/// One recorded demonstration stroke stored alongside a character.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StrokeInfo {
    pub order: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub path: Vec<Point>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Character {
    #[serde(rename = "char")]
    pub glyph: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub jyutping: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<StrokeInfo>>,
}

impl Character {
    pub fn new(glyph: &str, pinyin: &str, jyutping: &str, meaning: &str, order: u32) -> Self {
        Self {
            glyph: glyph.to_string(),
            pinyin: pinyin.to_string(),
            jyutping: jyutping.to_string(),
            meaning: meaning.to_string(),
            unlocked: false,
            order,
            strokes: None,
        }
    }

    /// Recorded demonstration strokes, in drawing order.
    pub fn recorded_strokes(&self) -> Vec<Stroke> {
        let mut infos: Vec<&StrokeInfo> = self.strokes.iter().flatten().collect();
        infos.sort_by_key(|s| s.order);
        infos.into_iter().map(|s| Stroke::new(s.path.clone())).collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Phrase {
    pub text: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub jyutping: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuestion {
    pub image_url: String,
    #[serde(rename = "correctChar")]
    pub correct_glyph: String,
}

fn enabled() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default = "enabled")]
    pub enable_phrases: bool,
    #[serde(default = "enabled")]
    pub enable_match: bool,
    pub characters: Vec<Character>,
    #[serde(default)]
    pub phrases: Vec<Phrase>,
    #[serde(default)]
    pub match_questions: Vec<MatchQuestion>,
}

impl Lesson {
    /// Empty, locked lesson with both challenges enabled.
    pub fn blank(id: impl Into<String>, title: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: image.into(),
            unlocked: false,
            enable_phrases: true,
            enable_match: true,
            characters: Vec::new(),
            phrases: Vec::new(),
            match_questions: Vec::new(),
        }
    }

    /// A lesson is complete once every character in it is unlocked.
    pub fn is_complete(&self) -> bool {
        self.characters.iter().all(|c| c.unlocked)
    }

    pub fn character(&self, glyph: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.glyph == glyph)
    }

    /// Match answers that do not name a character of this lesson.
    pub fn dangling_match_answers(&self) -> Vec<&str> {
        self.match_questions
            .iter()
            .filter(|q| self.character(&q.correct_glyph).is_none())
            .map(|q| q.correct_glyph.as_str())
            .collect()
    }
}

/// Ordered lessons; insertion order is progression order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Curriculum {
    lessons: Vec<Lesson>,
}

impl Curriculum {
    pub fn from_lessons(lessons: Vec<Lesson>) -> Self {
        let mut curriculum = Self { lessons };
        curriculum.normalize();
        curriculum
    }

    /// Parse a persisted or imported curriculum. Anything but a JSON array is rejected.
    pub fn from_json(text: &str) -> Result<Self, CurriculumError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_array() {
            return Err(CurriculumError::NotAnArray);
        }
        let lessons: Vec<Lesson> = serde_json::from_value(value)?;
        Ok(Self::from_lessons(lessons))
    }

    pub fn to_json(&self) -> Result<String, CurriculumError> {
        Ok(serde_json::to_string_pretty(&self.lessons)?)
    }

    // First lesson is always reachable; bad match answers are only reported.
    fn normalize(&mut self) {
        if let Some(first) = self.lessons.first_mut() {
            first.unlocked = true;
        }
        for lesson in &self.lessons {
            for glyph in lesson.dangling_match_answers() {
                log::warn!(
                    "lesson '{}' has a match question answered by '{}' which it does not teach",
                    lesson.id,
                    glyph
                );
            }
        }
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub(crate) fn lessons_mut(&mut self) -> &mut [Lesson] {
        &mut self.lessons
    }

    pub fn into_lessons(self) -> Vec<Lesson> {
        self.lessons
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn lesson_index(&self, id: &str) -> Option<usize> {
        self.lessons.iter().position(|l| l.id == id)
    }

    /// Character `index` of lesson `lesson_id`.
    pub fn character_at(&self, lesson_id: &str, index: usize) -> Option<&Character> {
        self.lesson(lesson_id)?.characters.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"[
        {"id":"a","title":"A","image":"x.png","unlocked":false,
         "characters":[{"char":"一","pinyin":"yī","jyutping":"jat1","meaning":"One","unlocked":false,"order":0}],
         "phrases":[]}
    ]"#;

    #[test]
    fn legacy_save_gets_defaults() {
        let c = Curriculum::from_json(LEGACY).unwrap();
        let lesson = &c.lessons()[0];
        assert!(lesson.enable_phrases);
        assert!(lesson.enable_match);
        assert!(lesson.match_questions.is_empty());
        assert!(lesson.unlocked, "first lesson is unlocked on load");
        assert_eq!(lesson.characters[0].glyph, "一");
        assert!(lesson.characters[0].strokes.is_none());
    }

    #[test]
    fn object_root_is_not_a_curriculum() {
        let err = Curriculum::from_json(r#"{"id":"a"}"#).unwrap_err();
        assert!(matches!(err, CurriculumError::NotAnArray));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = Curriculum::from_json("not json").unwrap_err();
        assert!(matches!(err, CurriculumError::Parse(_)));
    }

    #[test]
    fn serialized_form_keeps_wire_names() {
        let c = Curriculum::from_json(LEGACY).unwrap();
        let text = c.to_json().unwrap();
        assert!(text.contains("\"char\": \"一\""));
        assert!(text.contains("\"enablePhrases\": true"));
        assert!(text.contains("\"matchQuestions\": []"));
        assert!(!text.contains("strokes"));
    }

    #[test]
    fn characters_are_addressed_by_lesson_and_position() {
        let mut a = Lesson::blank("a", "A", "");
        a.characters.push(Character::new("一", "yī", "jat1", "One", 0));
        let mut b = Lesson::blank("b", "B", "");
        b.characters.push(Character::new("木", "mù", "muk6", "Wood", 0));
        b.characters.push(Character::new("山", "shān", "saan1", "Mountain", 1));
        let c = Curriculum::from_lessons(vec![a, b]);
        assert_eq!(c.character_at("b", 1).map(|ch| ch.glyph.as_str()), Some("山"));
        assert_eq!(c.character_at("b", 2), None);
        assert_eq!(c.character_at("z", 0), None);
        assert_eq!(c.character_at("a", 0).map(|ch| ch.order), Some(0));
    }

    #[test]
    fn dangling_match_answers_are_reported() {
        let mut lesson = Lesson::blank("a", "A", "");
        lesson.characters.push(Character::new("人", "rén", "jan4", "Person", 0));
        lesson.match_questions.push(MatchQuestion {
            image_url: "p.png".into(),
            correct_glyph: "人".into(),
        });
        lesson.match_questions.push(MatchQuestion {
            image_url: "q.png".into(),
            correct_glyph: "口".into(),
        });
        assert_eq!(lesson.dangling_match_answers(), vec!["口"]);
    }

    #[test]
    fn recorded_strokes_follow_order_field() {
        let mut ch = Character::new("十", "shí", "sap6", "Ten", 0);
        ch.strokes = Some(vec![
            StrokeInfo {
                order: 1,
                name: String::new(),
                description: String::new(),
                path: vec![Point::new(50.0, 10.0), Point::new(50.0, 50.0), Point::new(50.0, 90.0)],
            },
            StrokeInfo {
                order: 0,
                name: String::new(),
                description: String::new(),
                path: vec![Point::new(10.0, 50.0), Point::new(50.0, 50.0), Point::new(90.0, 50.0)],
            },
        ]);
        let strokes = ch.recorded_strokes();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].points()[0], Point::new(10.0, 50.0));
    }
}
