//! Handwriting pad: stroke capture, demonstration replay and judging.
//!
//! Coordinates are stored on a 0-100 logical grid in both axes so a demonstration
//! recorded on a phone replays in the right place on a tablet; pixels only appear
//! at draw time.
//!
//! The pad is a small state machine. `PadMode` says what the strokes are for
//! (free drawing, an adult recording the canonical order, a child tracing it) and
//! `PadPhase` says what the pad is doing right now. Pointer input is only accepted
//! in `PadPhase::Idle`, which is what keeps a replay, a pending judgment and live
//! ink from overlapping.

use serde::{Deserialize, Serialize};

use crate::ai::Judgment;
use crate::curriculum::Character;
use crate::error::AiError;
use crate::speech::SpeechLang;

mod replay;

pub use replay::Replay;

/// Point on the 0-100 logical grid.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const GRID: f64 = 100.0;

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Normalize a canvas-local pixel position.
    pub fn from_pixels(px: f64, py: f64, width: f64, height: f64) -> Self {
        let nx = if width > 0.0 { px / width * Self::GRID } else { 0.0 };
        let ny = if height > 0.0 { py / height * Self::GRID } else { 0.0 };
        Self::new(nx, ny)
    }

    pub fn to_pixels(self, width: f64, height: f64) -> (f64, f64) {
        (self.x / Self::GRID * width, self.y / Self::GRID * height)
    }
}

/// Paths with this many points or fewer are taps, not strokes.
pub const TAP_MAX_POINTS: usize = 2;

/// One pointer-down to pointer-up path.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_tap(&self) -> bool {
        self.points.len() <= TAP_MAX_POINTS
    }
}

pub const FREE_INK: &str = "#2d3748";
pub const RECORDING_INK: &str = "#3b82f6";
pub const PRACTICE_INK: &str = "#f472b6";
pub const DEMO_INK: &str = "rgba(59, 130, 246, 0.5)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadMode {
    /// Unconstrained drawing, judged as a whole on request.
    Free,
    /// An adult is capturing the canonical stroke sequence.
    Recording,
    /// The child traces recorded strokes one at a time.
    Practicing { stroke_index: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum PadPhase {
    Idle,
    Drawing { path: Vec<Point> },
    Demoing,
    Verifying,
    Passed,
}

/// Transient message over the pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    PracticeStarted,
    TryAgain,
}

/// Side effects requested by the pad; the runtime performs them.
#[derive(Clone, Debug, PartialEq)]
pub enum PadEffect {
    ClearInk,
    ClearDemo,
    /// Animate recorded stroke `n` on the overlay surface.
    PlayDemo(usize),
    /// Rasterize the ink surface and send it to the judge.
    Judge,
    Speak { text: String, lang: SpeechLang },
    Prompt(Prompt),
    /// A finished recording to keep with the character.
    SaveStrokes(Vec<Stroke>),
}

/// What a judgment means for the learner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Retry,
}

/// A score at or above `pass_score`, or an explicit pass, succeeds. An unreachable
/// judge counts as a pass so an outage never blocks a child.
pub fn verdict(result: &Result<Judgment, AiError>, pass_score: f64) -> Verdict {
    match result {
        Ok(j) if j.is_pass || j.score >= pass_score => Verdict::Pass,
        Ok(_) => Verdict::Retry,
        Err(err) => {
            log::warn!("handwriting judge failed ({err}); accepting attempt");
            Verdict::Pass
        }
    }
}

#[derive(Clone, Debug)]
pub struct WritingPad {
    glyph: String,
    mode: PadMode,
    phase: PadPhase,
    recorded: Vec<Stroke>,
    has_ink: bool,
    lang: SpeechLang,
    prompt: Option<Prompt>,
}

impl WritingPad {
    pub fn new(character: &Character) -> Self {
        Self {
            glyph: character.glyph.clone(),
            mode: PadMode::Free,
            phase: PadPhase::Idle,
            recorded: character.recorded_strokes(),
            has_ink: false,
            lang: SpeechLang::default(),
            prompt: None,
        }
    }

    pub fn with_lang(mut self, lang: SpeechLang) -> Self {
        self.lang = lang;
        self
    }

    pub fn glyph(&self) -> &str {
        &self.glyph
    }

    pub fn mode(&self) -> PadMode {
        self.mode
    }

    pub fn phase(&self) -> &PadPhase {
        &self.phase
    }

    pub fn recorded(&self) -> &[Stroke] {
        &self.recorded
    }

    pub fn has_ink(&self) -> bool {
        self.has_ink
    }

    pub fn lang(&self) -> SpeechLang {
        self.lang
    }

    pub fn prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    pub fn is_passed(&self) -> bool {
        self.phase == PadPhase::Passed
    }

    pub fn is_verifying(&self) -> bool {
        self.phase == PadPhase::Verifying
    }

    pub fn ink_color(&self) -> &'static str {
        match self.mode {
            PadMode::Free => FREE_INK,
            PadMode::Recording => RECORDING_INK,
            PadMode::Practicing { .. } => PRACTICE_INK,
        }
    }

    /// Start a new path. Returns false when input is currently blocked.
    pub fn pointer_down(&mut self, at: Point) -> bool {
        if self.phase != PadPhase::Idle {
            return false;
        }
        self.phase = PadPhase::Drawing { path: vec![at] };
        self.has_ink = true;
        true
    }

    /// Extend the current path; returns the segment to ink.
    pub fn pointer_move(&mut self, at: Point) -> Option<(Point, Point)> {
        let PadPhase::Drawing { path } = &mut self.phase else {
            return None;
        };
        let from = *path.last()?;
        path.push(at);
        Some((from, at))
    }

    pub fn pointer_up(&mut self) -> Vec<PadEffect> {
        if !matches!(self.phase, PadPhase::Drawing { .. }) {
            return Vec::new();
        }
        let PadPhase::Drawing { path } = std::mem::replace(&mut self.phase, PadPhase::Idle) else {
            return Vec::new();
        };
        match self.mode {
            PadMode::Free => Vec::new(),
            PadMode::Recording => {
                let stroke = Stroke::new(path);
                if stroke.is_tap() {
                    log::debug!("discarding tap of {} points", stroke.points().len());
                } else {
                    self.recorded.push(stroke);
                }
                Vec::new()
            }
            PadMode::Practicing { stroke_index } => {
                let next = stroke_index + 1;
                if next < self.recorded.len() {
                    self.mode = PadMode::Practicing { stroke_index: next };
                    self.phase = PadPhase::Demoing;
                    vec![PadEffect::ClearDemo, PadEffect::PlayDemo(next)]
                } else {
                    self.phase = PadPhase::Verifying;
                    vec![PadEffect::Judge]
                }
            }
        }
    }

    pub fn start_recording(&mut self) -> Vec<PadEffect> {
        if self.is_verifying() {
            return Vec::new();
        }
        self.recorded.clear();
        self.mode = PadMode::Recording;
        self.reset_surface()
    }

    pub fn cancel_recording(&mut self) -> Vec<PadEffect> {
        if self.mode != PadMode::Recording {
            return Vec::new();
        }
        self.recorded.clear();
        self.mode = PadMode::Free;
        self.reset_surface()
    }

    /// Begin tracing the recorded strokes from the first one.
    pub fn start_practicing(&mut self) -> Vec<PadEffect> {
        if self.recorded.is_empty() || self.is_verifying() {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if self.mode == PadMode::Recording {
            effects.push(PadEffect::SaveStrokes(self.recorded.clone()));
        }
        self.mode = PadMode::Practicing { stroke_index: 0 };
        effects.extend(self.reset_surface());
        self.phase = PadPhase::Demoing;
        self.prompt = Some(Prompt::PracticeStarted);
        effects.push(PadEffect::PlayDemo(0));
        effects.push(PadEffect::Prompt(Prompt::PracticeStarted));
        effects
    }

    pub fn leave_practice(&mut self) -> Vec<PadEffect> {
        if !matches!(self.mode, PadMode::Practicing { .. }) || self.is_verifying() {
            return Vec::new();
        }
        self.mode = PadMode::Free;
        self.reset_surface()
    }

    /// Wipe the ink. Outside practice this also forgets the recorded strokes.
    pub fn clear(&mut self) -> Vec<PadEffect> {
        if self.is_verifying() {
            return Vec::new();
        }
        if !matches!(self.mode, PadMode::Practicing { .. }) {
            self.recorded.clear();
            self.mode = PadMode::Free;
        }
        self.reset_surface()
    }

    pub fn demo_finished(&mut self) {
        if self.phase == PadPhase::Demoing {
            self.phase = PadPhase::Idle;
        }
    }

    /// Explicit submission of free drawing.
    pub fn submit(&mut self) -> Vec<PadEffect> {
        if self.mode != PadMode::Free || !self.has_ink || self.phase != PadPhase::Idle {
            return Vec::new();
        }
        self.phase = PadPhase::Verifying;
        vec![PadEffect::Judge]
    }

    pub fn judgment(&mut self, result: Result<Judgment, AiError>, pass_score: f64) -> Vec<PadEffect> {
        if !self.is_verifying() {
            return Vec::new();
        }
        match verdict(&result, pass_score) {
            Verdict::Pass => {
                self.phase = PadPhase::Passed;
                vec![PadEffect::Speak {
                    text: self.glyph.clone(),
                    lang: self.lang,
                }]
            }
            Verdict::Retry => {
                self.phase = PadPhase::Idle;
                self.prompt = Some(Prompt::TryAgain);
                vec![PadEffect::Prompt(Prompt::TryAgain)]
            }
        }
    }

    pub fn toggle_lang(&mut self) {
        self.lang = self.lang.toggled();
    }

    pub fn clear_prompt(&mut self) {
        self.prompt = None;
    }

    /// 1-based number of the active stroke and where to draw it.
    pub fn badge(&self) -> Option<(usize, Point)> {
        let idx = match self.mode {
            PadMode::Practicing { stroke_index } if !self.is_passed() => stroke_index,
            PadMode::Recording if !self.recorded.is_empty() => self.recorded.len() - 1,
            _ => return None,
        };
        let start = *self.recorded.get(idx)?.points().first()?;
        Some((idx + 1, Point::new(start.x, start.y - 4.0)))
    }

    fn reset_surface(&mut self) -> Vec<PadEffect> {
        self.phase = PadPhase::Idle;
        self.has_ink = false;
        vec![PadEffect::ClearInk, PadEffect::ClearDemo]
    }
}
