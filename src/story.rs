//! Sentence builder over the characters a learner has already unlocked.

use crate::curriculum::Lesson;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoryBoard {
    glyphs: Vec<String>,
}

impl StoryBoard {
    /// Glyphs of `lesson` that may be used in a sentence.
    pub fn bank(lesson: &Lesson) -> Vec<&str> {
        lesson
            .characters
            .iter()
            .filter(|c| c.unlocked)
            .map(|c| c.glyph.as_str())
            .collect()
    }

    /// Append a glyph; only glyphs from the bank are accepted.
    pub fn push(&mut self, lesson: &Lesson, glyph: &str) -> bool {
        if !Self::bank(lesson).contains(&glyph) {
            return false;
        }
        self.glyphs.push(glyph.to_string());
        true
    }

    pub fn remove(&mut self, position: usize) {
        if position < self.glyphs.len() {
            self.glyphs.remove(position);
        }
    }

    pub fn clear(&mut self) {
        self.glyphs.clear();
    }

    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    pub fn sentence(&self) -> String {
        self.glyphs.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::Character;

    #[test]
    fn only_unlocked_glyphs_can_be_used() {
        let mut lesson = Lesson::blank("a", "A", "");
        lesson.characters.push(Character::new("大", "dà", "daai6", "Big", 0));
        lesson.characters.push(Character::new("小", "xiǎo", "siu2", "Small", 1));
        lesson.characters[0].unlocked = true;

        let mut story = StoryBoard::default();
        assert!(story.push(&lesson, "大"));
        assert!(!story.push(&lesson, "小"));
        assert!(story.push(&lesson, "大"));
        assert_eq!(story.sentence(), "大大");

        story.remove(0);
        story.remove(9);
        assert_eq!(story.glyphs().len(), 1);
        story.clear();
        assert!(story.sentence().is_empty());
    }
}
