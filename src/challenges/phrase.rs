// Phrase unscramble: rebuild a phrase from its shuffled glyphs.
use rand::Rng;
use rand::seq::SliceRandom;

use super::{ChallengeEffect, Feedback};
use crate::curriculum::Phrase;

#[derive(Clone, Debug)]
pub struct PhraseGame {
    phrases: Vec<Phrase>,
    index: usize,
    /// Shuffled glyphs of the active phrase.
    pool: Vec<String>,
    /// Pool indices in slot order.
    placed: Vec<usize>,
    feedback: Feedback,
}

impl PhraseGame {
    /// `None` when the lesson has no phrases to play.
    pub fn new<R: Rng + ?Sized>(phrases: &[Phrase], rng: &mut R) -> Option<Self> {
        if phrases.is_empty() {
            return None;
        }
        let mut game = Self {
            phrases: phrases.to_vec(),
            index: 0,
            pool: Vec::new(),
            placed: Vec::new(),
            feedback: Feedback::Playing,
        };
        game.deal(rng);
        Some(game)
    }

    fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pool = self.phrases[self.index]
            .text
            .chars()
            .map(String::from)
            .collect();
        self.pool.shuffle(rng);
        self.placed.clear();
        self.feedback = Feedback::Playing;
    }

    pub fn phrase(&self) -> &Phrase {
        &self.phrases[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.phrases.len()
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    pub fn is_placed(&self, pool_index: usize) -> bool {
        self.placed.contains(&pool_index)
    }

    /// One entry per glyph of the target: the pool index and glyph placed there.
    pub fn slots(&self) -> Vec<Option<(usize, &str)>> {
        (0..self.pool.len())
            .map(|slot| {
                self.placed
                    .get(slot)
                    .map(|&pi| (pi, self.pool[pi].as_str()))
            })
            .collect()
    }

    pub fn attempt(&self) -> String {
        self.placed.iter().map(|&pi| self.pool[pi].as_str()).collect()
    }

    /// Move a tile between the pool and the slots. The answer is checked once
    /// every slot is filled.
    pub fn toggle_tile(&mut self, pool_index: usize) -> Vec<ChallengeEffect> {
        if self.feedback != Feedback::Playing || pool_index >= self.pool.len() {
            return Vec::new();
        }
        if let Some(pos) = self.placed.iter().position(|&pi| pi == pool_index) {
            self.placed.remove(pos);
            return Vec::new();
        }
        self.placed.push(pool_index);
        if self.placed.len() < self.pool.len() {
            return Vec::new();
        }

        let attempt = self.attempt();
        if attempt == self.phrase().text {
            self.feedback = Feedback::Success;
            vec![ChallengeEffect::Speak(attempt)]
        } else {
            self.feedback = Feedback::Error;
            vec![ChallengeEffect::Speak(attempt), ChallengeEffect::ScheduleReset]
        }
    }

    /// End of the error flash: every placed tile goes back to the pool.
    pub fn reset_attempt(&mut self) {
        if self.feedback == Feedback::Error {
            self.placed.clear();
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
