//! Lesson mini-games.
//!
//! Both games share one loop: present a question, take one answer-building action,
//! validate, then either celebrate (and wait for "next") or flash an error and
//! reset the attempt once the runtime's feedback timer fires.

mod phrase;
mod picture_match;

pub use phrase::PhraseGame;
pub use picture_match::PictureMatch;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Feedback {
    #[default]
    Playing,
    Success,
    /// Wrong answer on display; input is blocked until `reset_attempt`.
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChallengeEffect {
    Speak(String),
    /// Ask the runtime to call `reset_attempt` after the error flash.
    ScheduleReset,
    /// The last question was answered and "next" was pressed.
    Finished,
}

/// Which mini-game a screen refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeKind {
    Phrase,
    PictureMatch,
}
