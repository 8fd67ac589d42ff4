// Picture match: pick the glyph that names the picture.
use rand::Rng;
use rand::seq::SliceRandom;

use super::{ChallengeEffect, Feedback};
use crate::curriculum::{Lesson, MatchQuestion};

/// The correct glyph plus up to this many distractors.
pub const DISTRACTORS: usize = 3;

#[derive(Clone, Debug)]
pub struct PictureMatch {
    questions: Vec<MatchQuestion>,
    glyphs: Vec<String>,
    index: usize,
    options: Vec<String>,
    selected: Option<String>,
    feedback: Feedback,
}

impl PictureMatch {
    /// `None` when the lesson has no match questions.
    pub fn new<R: Rng + ?Sized>(lesson: &Lesson, rng: &mut R) -> Option<Self> {
        if lesson.match_questions.is_empty() {
            return None;
        }
        let mut game = Self {
            questions: lesson.match_questions.clone(),
            glyphs: lesson.characters.iter().map(|c| c.glyph.clone()).collect(),
            index: 0,
            options: Vec::new(),
            selected: None,
            feedback: Feedback::Playing,
        };
        game.deal(rng);
        Some(game)
    }

    fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let correct = self.questions[self.index].correct_glyph.clone();
        let mut others: Vec<String> = Vec::new();
        for g in &self.glyphs {
            if *g != correct && !others.contains(g) {
                others.push(g.clone());
            }
        }
        others.shuffle(rng);
        others.truncate(DISTRACTORS);
        others.push(correct);
        others.shuffle(rng);
        self.options = others;
        self.selected = None;
        self.feedback = Feedback::Playing;
    }

    pub fn question(&self) -> &MatchQuestion {
        &self.questions[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    /// Every pick is pronounced, right or wrong.
    pub fn select(&mut self, glyph: &str) -> Vec<ChallengeEffect> {
        if self.feedback != Feedback::Playing || !self.options.iter().any(|o| o == glyph) {
            return Vec::new();
        }
        self.selected = Some(glyph.to_string());
        let speak = ChallengeEffect::Speak(glyph.to_string());
        if glyph == self.question().correct_glyph {
            self.feedback = Feedback::Success;
            vec![speak]
        } else {
            self.feedback = Feedback::Error;
            vec![speak, ChallengeEffect::ScheduleReset]
        }
    }

    pub fn reset_attempt(&mut self) {
        if self.feedback == Feedback::Error {
            self.selected = None;
            self.feedback = Feedback::Playing;
        }
    }

    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<ChallengeEffect> {
        if self.feedback != Feedback::Success {
            return Vec::new();
        }
        if self.is_last() {
            return vec![ChallengeEffect::Finished];
        }
        self.index += 1;
        self.deal(rng);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::Character;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn lesson() -> Lesson {
        let mut l = Lesson::blank("L", "L", "");
        for (i, g) in ["木", "山", "水", "火", "土", "天"].iter().enumerate() {
            l.characters.push(Character::new(g, "", "", "", i as u32));
        }
        for g in ["山", "水"] {
            l.match_questions.push(MatchQuestion {
                image_url: format!("{g}.png"),
                correct_glyph: g.into(),
            });
        }
        l
    }

    #[test]
    fn no_questions_means_not_configured() {
        let mut l = lesson();
        l.match_questions.clear();
        assert!(PictureMatch::new(&l, &mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn correct_glyph_appears_exactly_once_among_four() {
        for seed in 0..50 {
            let game = PictureMatch::new(&lesson(), &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(game.options().len(), 4);
            assert_eq!(game.options().iter().filter(|o| *o == "山").count(), 1);
        }
    }

    #[test]
    fn small_lesson_offers_fewer_options() {
        let mut l = lesson();
        l.characters.truncate(2);
        let game = PictureMatch::new(&l, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(game.options().len(), 2);
    }

    #[test]
    fn wrong_pick_is_spoken_and_reset() {
        let mut game = PictureMatch::new(&lesson(), &mut StdRng::seed_from_u64(4)).unwrap();
        let wrong = game.options().iter().find(|o| *o != "山").unwrap().clone();
        let fx = game.select(&wrong);
        assert_eq!(
            fx,
            vec![ChallengeEffect::Speak(wrong.clone()), ChallengeEffect::ScheduleReset]
        );
        assert_eq!(game.selected(), Some(wrong.as_str()));
        assert!(game.select("山").is_empty(), "blocked during error flash");
        game.reset_attempt();
        assert_eq!(game.selected(), None);
        assert_eq!(game.select("山"), vec![ChallengeEffect::Speak("山".into())]);
        assert_eq!(game.feedback(), Feedback::Success);
    }

    #[test]
    fn finishing_the_list_signals_completion() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut game = PictureMatch::new(&lesson(), &mut rng).unwrap();
        game.select("山");
        assert!(game.next(&mut rng).is_empty());
        assert_eq!(game.question().correct_glyph, "水");
        assert!(game.is_last());
        game.select("水");
        assert_eq!(game.next(&mut rng), vec![ChallengeEffect::Finished]);
    }
}
