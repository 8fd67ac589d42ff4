//! Application root.
//!
//! `App` owns the curriculum store and the active screen. Every input arrives as an
//! [`Action`]; `update` mutates state and returns the [`Effect`]s the browser
//! runtime has to perform (persist, speak, draw, call the model, start timers).
//! Nothing in this module touches the DOM, which keeps the whole flow testable
//! natively.

use rand::Rng;

use crate::admin::AdminEditor;
use crate::challenges::{ChallengeEffect, ChallengeKind, PhraseGame, PictureMatch};
use crate::config::AppConfig;
use crate::curriculum::Lesson;
use crate::progression::{self, LessonStatus};
use crate::speech::SpeechLang;
use crate::store::CurriculumStore;
use crate::story::StoryBoard;
use crate::strokes::{PadEffect, Point, Stroke, WritingPad};

mod action;
pub mod render;
#[cfg(target_arch = "wasm32")]
mod runtime;

pub use action::{Action, AdminAction, DomEvent, Timer, parse_edit};
#[cfg(target_arch = "wasm32")]
pub use runtime::start;

/// Screen tagged union; each variant carries exactly its own state.
#[derive(Debug)]
pub enum Screen {
    Map {
        lesson_id: String,
    },
    /// `index` is the character's position in its lesson.
    Writing {
        lesson_id: String,
        index: usize,
        pad: WritingPad,
    },
    /// `game` is `None` when the lesson has no phrases.
    Phrase {
        lesson_id: String,
        game: Option<PhraseGame>,
    },
    /// `game` is `None` when the lesson has no match questions.
    Match {
        lesson_id: String,
        game: Option<PictureMatch>,
    },
    Story {
        lesson_id: String,
        board: StoryBoard,
    },
    Admin {
        editor: AdminEditor,
        topic: String,
    },
}

impl Screen {
    pub fn lesson_id(&self) -> Option<&str> {
        match self {
            Screen::Map { lesson_id }
            | Screen::Writing { lesson_id, .. }
            | Screen::Phrase { lesson_id, .. }
            | Screen::Match { lesson_id, .. }
            | Screen::Story { lesson_id, .. } => Some(lesson_id),
            Screen::Admin { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasscodeModal {
    pub input: String,
    pub error: bool,
}

/// Work for the runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Write the curriculum to its storage slot.
    Persist,
    Speak {
        text: String,
        lang: SpeechLang,
    },
    Ink {
        from: Point,
        to: Point,
        color: &'static str,
    },
    ClearInk,
    /// Stop any running demonstration and wipe the overlay.
    ClearDemo,
    PlayDemo(Stroke),
    Judge {
        glyph: String,
    },
    Generate {
        topic: String,
    },
    Schedule {
        timer: Timer,
        after_ms: i32,
    },
    Download {
        file_name: String,
        contents: String,
    },
    PickImportFile,
}

pub struct App<R> {
    config: AppConfig,
    store: CurriculumStore,
    screen: Screen,
    passcode: Option<PasscodeModal>,
    lang: SpeechLang,
    rng: R,
}

impl<R: Rng> App<R> {
    pub fn new(config: AppConfig, store: CurriculumStore, rng: R) -> Self {
        let lesson_id = current_lesson_id(store.curriculum().lessons());
        let lang = SpeechLang::from_tag(&config.speech_lang);
        Self {
            config,
            store,
            screen: Screen::Map { lesson_id },
            passcode: None,
            lang,
            rng,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &CurriculumStore {
        &self.store
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn passcode(&self) -> Option<&PasscodeModal> {
        self.passcode.as_ref()
    }

    pub fn lang(&self) -> SpeechLang {
        self.lang
    }

    /// Lesson the current screen belongs to, falling back to the first one.
    pub fn lesson(&self) -> Option<&Lesson> {
        let lessons = self.store.curriculum().lessons();
        self.screen
            .lesson_id()
            .and_then(|id| lessons.iter().find(|l| l.id == id))
            .or_else(|| lessons.first())
    }

    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::SelectLesson(id) => {
                let open = self
                    .store
                    .curriculum()
                    .lesson(&id)
                    .is_some_and(|l| l.unlocked);
                if open && matches!(self.screen, Screen::Map { .. }) {
                    self.screen = Screen::Map { lesson_id: id };
                }
                Vec::new()
            }
            Action::NextLesson => {
                let next = self.lesson().and_then(|current| {
                    let lessons = self.store.curriculum().lessons();
                    let i = lessons.iter().position(|l| l.id == current.id)?;
                    let complete = progression::lesson_status(current) == LessonStatus::Complete;
                    lessons
                        .get(i + 1)
                        .filter(|n| complete && n.unlocked)
                        .map(|n| n.id.clone())
                });
                if let Some(lesson_id) = next {
                    self.screen = Screen::Map { lesson_id };
                }
                Vec::new()
            }
            Action::OpenCharacter(index) => self.open_character(index),
            Action::OpenChallenge(kind) => {
                self.open_challenge(kind);
                Vec::new()
            }
            Action::OpenStory => {
                if let Screen::Map { lesson_id } = &self.screen {
                    let lesson_id = lesson_id.clone();
                    self.screen = Screen::Story {
                        lesson_id,
                        board: StoryBoard::default(),
                    };
                }
                Vec::new()
            }
            Action::BackToMap => {
                let leaving_pad = matches!(self.screen, Screen::Writing { .. });
                let lesson_id = match &self.screen {
                    Screen::Admin { editor, .. } if editor.is_generating() => return Vec::new(),
                    Screen::Writing { pad, .. } if pad.is_verifying() => return Vec::new(),
                    Screen::Admin { .. } => current_lesson_id(self.store.curriculum().lessons()),
                    other => other.lesson_id().unwrap_or_default().to_string(),
                };
                self.screen = Screen::Map { lesson_id };
                if leaving_pad {
                    vec![Effect::ClearDemo]
                } else {
                    Vec::new()
                }
            }

            Action::OpenPasscode => {
                self.passcode = Some(PasscodeModal::default());
                Vec::new()
            }
            Action::PasscodeInput(text) => {
                if let Some(modal) = &mut self.passcode {
                    modal.input = text;
                }
                Vec::new()
            }
            Action::SubmitPasscode => self.submit_passcode(),
            Action::ClosePasscode => {
                self.passcode = None;
                Vec::new()
            }

            // A fresh path is inked as a dot so a tap is visible to the judge.
            Action::PadDown(at) => {
                if let Screen::Writing { pad, .. } = &mut self.screen {
                    if pad.pointer_down(at) {
                        return vec![Effect::Ink {
                            from: at,
                            to: at,
                            color: pad.ink_color(),
                        }];
                    }
                }
                Vec::new()
            }
            Action::PadMove(at) => match &mut self.screen {
                Screen::Writing { pad, .. } => pad
                    .pointer_move(at)
                    .map(|(from, to)| Effect::Ink {
                        from,
                        to,
                        color: pad.ink_color(),
                    })
                    .into_iter()
                    .collect(),
                _ => Vec::new(),
            },
            Action::PadUp => self.on_pad(WritingPad::pointer_up),
            Action::StartRecording => self.on_pad(WritingPad::start_recording),
            Action::CancelRecording => self.on_pad(WritingPad::cancel_recording),
            Action::StartPracticing => self.on_pad(WritingPad::start_practicing),
            Action::LeavePractice => self.on_pad(WritingPad::leave_practice),
            Action::ClearPad => self.on_pad(WritingPad::clear),
            Action::SubmitDrawing => self.on_pad(WritingPad::submit),
            Action::DemoFinished => self.on_pad(|pad| {
                pad.demo_finished();
                Vec::new()
            }),
            Action::ToggleLang => {
                if let Screen::Writing { pad, .. } = &mut self.screen {
                    pad.toggle_lang();
                    self.lang = pad.lang();
                }
                Vec::new()
            }
            Action::SpeakGlyph => match &self.screen {
                Screen::Writing { pad, .. } => vec![Effect::Speak {
                    text: pad.glyph().to_string(),
                    lang: pad.lang(),
                }],
                _ => Vec::new(),
            },
            Action::Judged { glyph, result } => {
                let pass_score = self.config.pass_score;
                let current = matches!(&self.screen, Screen::Writing { pad, .. } if pad.glyph() == glyph);
                if !current {
                    log::debug!("dropping judgment for '{glyph}'; pad is gone");
                    return Vec::new();
                }
                self.on_pad(|pad| pad.judgment(result, pass_score))
            }
            Action::ContinueAfterPass => self.continue_after_pass(),

            Action::ToggleTile(i) => {
                let fx = match &mut self.screen {
                    Screen::Phrase { game: Some(game), .. } => game.toggle_tile(i),
                    _ => return Vec::new(),
                };
                self.challenge_effects(fx)
            }
            Action::SelectOption(glyph) => {
                let fx = match &mut self.screen {
                    Screen::Match { game: Some(game), .. } => game.select(&glyph),
                    _ => return Vec::new(),
                };
                self.challenge_effects(fx)
            }
            Action::NextQuestion => {
                let fx = match &mut self.screen {
                    Screen::Phrase { game: Some(game), .. } => game.next(&mut self.rng),
                    Screen::Match { game: Some(game), .. } => game.next(&mut self.rng),
                    _ => return Vec::new(),
                };
                self.challenge_effects(fx)
            }

            Action::StoryPush(glyph) => {
                if let Screen::Story { lesson_id, board } = &mut self.screen {
                    if let Some(lesson) = self.store.curriculum().lesson(lesson_id) {
                        board.push(lesson, &glyph);
                    }
                }
                Vec::new()
            }
            Action::StoryRemove(position) => {
                if let Screen::Story { board, .. } = &mut self.screen {
                    board.remove(position);
                }
                Vec::new()
            }
            Action::StoryClear => {
                if let Screen::Story { board, .. } = &mut self.screen {
                    board.clear();
                }
                Vec::new()
            }
            Action::StorySpeak => match &self.screen {
                Screen::Story { board, .. } if !board.glyphs().is_empty() => vec![Effect::Speak {
                    text: board.sentence(),
                    lang: self.lang,
                }],
                _ => Vec::new(),
            },

            Action::Admin(action) => self.admin_update(action),
            Action::Timer(timer) => {
                self.timer_fired(timer);
                Vec::new()
            }
        }
    }

    fn open_character(&mut self, index: usize) -> Vec<Effect> {
        let Screen::Map { lesson_id } = &self.screen else {
            return Vec::new();
        };
        let Some(lesson) = self.store.curriculum().lesson(lesson_id) else {
            return Vec::new();
        };
        let Some(character) = lesson.characters.get(index) else {
            return Vec::new();
        };
        if !progression::node_states(lesson)[index].is_clickable() {
            log::debug!("character #{index} of '{lesson_id}' is still locked");
            return Vec::new();
        }
        let pad = WritingPad::new(character).with_lang(self.lang);
        let lesson_id = lesson_id.clone();
        self.screen = Screen::Writing {
            lesson_id,
            index,
            pad,
        };
        vec![Effect::ClearInk, Effect::ClearDemo]
    }

    fn open_challenge(&mut self, kind: ChallengeKind) {
        let Screen::Map { lesson_id } = &self.screen else {
            return;
        };
        let Some(lesson) = self.store.curriculum().lesson(lesson_id) else {
            return;
        };
        let lesson_id = lesson_id.clone();
        self.screen = match kind {
            ChallengeKind::Phrase if lesson.enable_phrases => Screen::Phrase {
                game: PhraseGame::new(&lesson.phrases, &mut self.rng),
                lesson_id,
            },
            ChallengeKind::PictureMatch if lesson.enable_match => Screen::Match {
                game: PictureMatch::new(lesson, &mut self.rng),
                lesson_id,
            },
            _ => return,
        };
    }

    fn submit_passcode(&mut self) -> Vec<Effect> {
        let Some(modal) = &mut self.passcode else {
            return Vec::new();
        };
        let code = modal.input.as_str();
        if code == self.config.unlock_passcode {
            self.passcode = None;
            self.store.unlock_all();
            vec![Effect::Persist]
        } else if code == self.config.admin_passcode {
            self.passcode = None;
            log::info!("opening curriculum editor");
            self.screen = Screen::Admin {
                editor: AdminEditor::new(
                    self.store.curriculum(),
                    self.config.placeholder_image.clone(),
                ),
                topic: String::new(),
            };
            Vec::new()
        } else {
            log::warn!("wrong passcode entered");
            modal.error = true;
            vec![Effect::Schedule {
                timer: Timer::PasscodeError,
                after_ms: self.config.passcode_error_ms,
            }]
        }
    }

    fn on_pad(&mut self, f: impl FnOnce(&mut WritingPad) -> Vec<PadEffect>) -> Vec<Effect> {
        let Screen::Writing {
            lesson_id,
            index,
            pad,
        } = &mut self.screen
        else {
            return Vec::new();
        };
        let fx = f(&mut *pad);
        let mut out = Vec::new();
        for effect in fx {
            match effect {
                PadEffect::ClearInk => out.push(Effect::ClearInk),
                PadEffect::ClearDemo => out.push(Effect::ClearDemo),
                PadEffect::PlayDemo(n) => {
                    if let Some(stroke) = pad.recorded().get(n) {
                        out.push(Effect::PlayDemo(stroke.clone()));
                    }
                }
                PadEffect::Judge => out.push(Effect::Judge {
                    glyph: pad.glyph().to_string(),
                }),
                PadEffect::Speak { text, lang } => out.push(Effect::Speak { text, lang }),
                PadEffect::Prompt(_) => out.push(Effect::Schedule {
                    timer: Timer::Prompt,
                    after_ms: self.config.prompt_ms,
                }),
                PadEffect::SaveStrokes(strokes) => {
                    if self.store.record_strokes(lesson_id, *index, &strokes) {
                        log::info!("saved {} strokes for '{}'", strokes.len(), pad.glyph());
                        out.push(Effect::Persist);
                    }
                }
            }
        }
        out
    }

    fn continue_after_pass(&mut self) -> Vec<Effect> {
        let Screen::Writing {
            lesson_id,
            index,
            pad,
        } = &self.screen
        else {
            return Vec::new();
        };
        if !pad.is_passed() {
            return Vec::new();
        }
        let (lesson_id, index) = (lesson_id.clone(), *index);
        self.store.complete_character(&lesson_id, index);
        self.screen = Screen::Map { lesson_id };
        vec![Effect::ClearDemo, Effect::Persist]
    }

    fn challenge_effects(&mut self, fx: Vec<ChallengeEffect>) -> Vec<Effect> {
        let mut out = Vec::new();
        for effect in fx {
            match effect {
                ChallengeEffect::Speak(text) => out.push(Effect::Speak {
                    text,
                    lang: self.lang,
                }),
                ChallengeEffect::ScheduleReset => out.push(Effect::Schedule {
                    timer: Timer::Feedback,
                    after_ms: self.config.feedback_ms,
                }),
                ChallengeEffect::Finished => {
                    let lesson_id = self.screen.lesson_id().unwrap_or_default().to_string();
                    self.screen = Screen::Map { lesson_id };
                }
            }
        }
        out
    }

    fn timer_fired(&mut self, timer: Timer) {
        match timer {
            Timer::Feedback => match &mut self.screen {
                Screen::Phrase { game: Some(game), .. } => game.reset_attempt(),
                Screen::Match { game: Some(game), .. } => game.reset_attempt(),
                _ => {}
            },
            Timer::PasscodeError => {
                if let Some(modal) = &mut self.passcode {
                    modal.error = false;
                }
            }
            Timer::Prompt => {
                if let Screen::Writing { pad, .. } = &mut self.screen {
                    pad.clear_prompt();
                }
            }
        }
    }

    fn admin_update(&mut self, action: AdminAction) -> Vec<Effect> {
        let Screen::Admin { editor, topic } = &mut self.screen else {
            return Vec::new();
        };
        if editor.is_generating() && !matches!(action, AdminAction::Generated { .. }) {
            log::debug!("editor busy generating; ignoring {action:?}");
            return Vec::new();
        }
        match action {
            AdminAction::Select(id) => editor.select(&id),
            AdminAction::AddLesson { id } => editor.add_lesson(id),
            AdminAction::RequestDelete(id) => editor.request_delete(&id),
            AdminAction::Confirm => editor.confirm(),
            AdminAction::DismissModal => editor.dismiss_modal(),
            AdminAction::Move(index, dir) => editor.move_lesson(index, dir),
            AdminAction::Edit(edit, value) => editor.edit(edit, &value),
            AdminAction::AddCharacter => editor.add_character(),
            AdminAction::DeleteCharacter(i) => editor.delete_character(i),
            AdminAction::AddPhrase => editor.add_phrase(),
            AdminAction::DeletePhrase(i) => editor.delete_phrase(i),
            AdminAction::AddMatch => editor.add_match_question(),
            AdminAction::DeleteMatch(i) => editor.delete_match_question(i),
            AdminAction::PickImport => return vec![Effect::PickImportFile],
            AdminAction::Import(text) => {
                // The editor reports the outcome in its own dialog.
                let _ = editor.import_json(&text);
            }
            AdminAction::Export => match editor.export_json() {
                Ok(contents) => {
                    return vec![Effect::Download {
                        file_name: self.config.export_file_name.clone(),
                        contents,
                    }];
                }
                Err(err) => log::error!("export failed: {err}"),
            },
            AdminAction::OpenGenerator => {
                topic.clear();
                editor.open_generator();
            }
            AdminAction::TopicInput(text) => *topic = text,
            AdminAction::Generate => {
                if editor.begin_generation(topic) {
                    return vec![Effect::Generate {
                        topic: topic.trim().to_string(),
                    }];
                }
            }
            AdminAction::Generated { id, result } => editor.finish_generation(result, id),
            AdminAction::Save => {
                let lessons = editor.save();
                self.store.replace_lessons(lessons);
                log::info!("curriculum saved from editor");
                return vec![Effect::Persist];
            }
            AdminAction::Exit => {
                self.screen = Screen::Map {
                    lesson_id: current_lesson_id(self.store.curriculum().lessons()),
                };
            }
        }
        Vec::new()
    }
}

/// The learner's current lesson: the last unlocked one, else the first.
fn current_lesson_id(lessons: &[Lesson]) -> String {
    lessons
        .iter()
        .rev()
        .find(|l| l.unlocked)
        .or_else(|| lessons.first())
        .map(|l| l.id.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Judgment;
    use crate::challenges::Feedback;
    use crate::curriculum::{Character, Curriculum, MatchQuestion, Phrase};
    use crate::error::AiError;
    use crate::progression::NodeState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn curriculum() -> Curriculum {
        let mut a = Lesson::blank("A", "A", "");
        a.characters.push(Character::new("一", "yī", "jat1", "One", 0));
        a.characters.push(Character::new("二", "èr", "ji6", "Two", 1));
        a.phrases.push(Phrase {
            text: "一二".into(),
            meaning: String::new(),
            pinyin: String::new(),
            jyutping: String::new(),
        });
        a.match_questions.push(MatchQuestion {
            image_url: "one.png".into(),
            correct_glyph: "一".into(),
        });
        let b = Lesson::blank("B", "B", "");
        Curriculum::from_lessons(vec![a, b])
    }

    fn app() -> App<StdRng> {
        App::new(
            AppConfig::default(),
            CurriculumStore::new(curriculum(), "k"),
            StdRng::seed_from_u64(1),
        )
    }

    fn learn(app: &mut App<StdRng>, index: usize, glyph: &str) {
        app.update(Action::OpenCharacter(index));
        app.update(Action::PadDown(Point::new(10.0, 10.0)));
        app.update(Action::PadMove(Point::new(20.0, 20.0)));
        app.update(Action::PadUp);
        assert_eq!(app.update(Action::SubmitDrawing), vec![Effect::Judge { glyph: glyph.into() }]);
        app.update(Action::Judged {
            glyph: glyph.into(),
            result: Err(AiError::MissingKey),
        });
        let fx = app.update(Action::ContinueAfterPass);
        assert!(fx.contains(&Effect::Persist));
    }

    #[test]
    fn only_the_next_character_opens() {
        let mut app = app();
        assert!(app.update(Action::OpenCharacter(1)).is_empty());
        assert!(app.update(Action::OpenCharacter(7)).is_empty());
        assert!(matches!(app.screen(), Screen::Map { .. }));
        app.update(Action::OpenCharacter(0));
        assert!(matches!(app.screen(), Screen::Writing { index: 0, .. }));
    }

    #[test]
    fn repeated_glyphs_are_learned_separately() {
        let mut editor = AdminEditor::new(&Curriculum::default(), "");
        editor.add_lesson("A".into());
        editor.add_character();
        editor.add_character();
        editor.add_lesson("B".into());
        editor.add_character();
        let mut app = App::new(
            AppConfig::default(),
            CurriculumStore::new(Curriculum::from_lessons(editor.save()), "k"),
            StdRng::seed_from_u64(4),
        );
        let glyph = app.store().curriculum().lessons()[0].characters[1].glyph.clone();
        assert_eq!(app.store().curriculum().lessons()[0].characters[0].glyph, glyph);

        learn(&mut app, 0, &glyph);
        learn(&mut app, 1, &glyph);
        let lessons = app.store().curriculum().lessons();
        assert_eq!(
            progression::node_states(&lessons[0]),
            vec![NodeState::Unlocked, NodeState::Unlocked]
        );
        assert!(lessons[1].unlocked);
        assert!(!lessons[1].characters[0].unlocked);
    }

    #[test]
    fn pen_down_inks_a_dot() {
        let mut app = app();
        app.update(Action::OpenCharacter(0));
        let at = Point::new(30.0, 40.0);
        assert!(matches!(
            &app.update(Action::PadDown(at))[..],
            [Effect::Ink { from, to, .. }] if *from == at && *to == at
        ));
        // Already drawing: a second press is ignored.
        assert!(app.update(Action::PadDown(at)).is_empty());
    }

    #[test]
    fn learning_a_lesson_unlocks_the_next() {
        let mut app = app();
        learn(&mut app, 0, "一");
        assert!(!app.store().curriculum().lesson("B").unwrap().unlocked);
        learn(&mut app, 1, "二");
        assert!(app.store().curriculum().lesson("B").unwrap().unlocked);

        app.update(Action::NextLesson);
        assert_eq!(app.screen().lesson_id(), Some("B"));
    }

    #[test]
    fn failed_judgment_keeps_learner_on_pad() {
        let mut app = app();
        app.update(Action::OpenCharacter(0));
        app.update(Action::PadDown(Point::new(10.0, 10.0)));
        app.update(Action::PadUp);
        app.update(Action::SubmitDrawing);
        let fx = app.update(Action::Judged {
            glyph: "一".into(),
            result: Ok(Judgment { score: 2.0, is_pass: false }),
        });
        assert_eq!(
            fx,
            vec![Effect::Schedule { timer: Timer::Prompt, after_ms: 3000 }]
        );
        assert!(app.update(Action::ContinueAfterPass).is_empty());
        assert!(!app.store().curriculum().character_at("A", 0).unwrap().unlocked);
    }

    #[test]
    fn passcodes() {
        let mut app = app();
        app.update(Action::OpenPasscode);
        app.update(Action::PasscodeInput("nope".into()));
        let fx = app.update(Action::SubmitPasscode);
        assert!(matches!(fx[0], Effect::Schedule { timer: Timer::PasscodeError, .. }));
        assert!(app.passcode().unwrap().error);
        app.update(Action::Timer(Timer::PasscodeError));
        assert_eq!(
            app.passcode(),
            Some(&PasscodeModal {
                input: "nope".into(),
                error: false
            })
        );

        app.update(Action::PasscodeInput(" Rainbow888".into()));
        assert!(matches!(app.update(Action::SubmitPasscode)[..], [Effect::Schedule { .. }]));
        app.update(Action::PasscodeInput("Rainbow888".into()));
        assert_eq!(app.update(Action::SubmitPasscode), vec![Effect::Persist]);
        assert!(app.passcode().is_none());
        assert!(app.store().curriculum().lessons().iter().all(|l| l.unlocked));

        app.update(Action::OpenPasscode);
        app.update(Action::PasscodeInput("Admin888".into()));
        app.update(Action::SubmitPasscode);
        assert!(matches!(app.screen(), Screen::Admin { .. }));
    }

    #[test]
    fn disabled_challenge_does_not_open() {
        let mut lessons = curriculum().into_lessons();
        lessons[0].enable_match = false;
        let mut app = App::new(
            AppConfig::default(),
            CurriculumStore::new(Curriculum::from_lessons(lessons), "k"),
            StdRng::seed_from_u64(2),
        );
        app.update(Action::OpenChallenge(ChallengeKind::PictureMatch));
        assert!(matches!(app.screen(), Screen::Map { .. }));
        app.update(Action::OpenChallenge(ChallengeKind::Phrase));
        assert!(matches!(app.screen(), Screen::Phrase { game: Some(_), .. }));
    }

    #[test]
    fn match_game_round_trip() {
        let mut app = app();
        app.update(Action::OpenChallenge(ChallengeKind::PictureMatch));
        let fx = app.update(Action::SelectOption("二".into()));
        assert!(fx.contains(&Effect::Schedule { timer: Timer::Feedback, after_ms: 1000 }));
        app.update(Action::Timer(Timer::Feedback));
        app.update(Action::SelectOption("一".into()));
        let Screen::Match { game: Some(game), .. } = app.screen() else {
            panic!("expected match screen");
        };
        assert_eq!(game.feedback(), Feedback::Success);
        app.update(Action::NextQuestion);
        assert!(matches!(app.screen(), Screen::Map { .. }));
    }

    #[test]
    fn recording_is_saved_to_the_character() {
        let mut app = app();
        app.update(Action::OpenCharacter(0));
        app.update(Action::StartRecording);
        app.update(Action::PadDown(Point::new(10.0, 50.0)));
        app.update(Action::PadMove(Point::new(50.0, 50.0)));
        app.update(Action::PadMove(Point::new(90.0, 50.0)));
        app.update(Action::PadUp);
        let fx = app.update(Action::StartPracticing);
        assert_eq!(fx[0], Effect::Persist);
        assert!(fx.iter().any(|e| matches!(e, Effect::PlayDemo(s) if s.points().len() == 3)));
        let ch = app.store().curriculum().character_at("A", 0).unwrap();
        assert_eq!(ch.recorded_strokes().len(), 1);
    }

    #[test]
    fn editor_save_commits_working_copy() {
        let mut app = app();
        app.update(Action::OpenPasscode);
        app.update(Action::PasscodeInput("Admin888".into()));
        app.update(Action::SubmitPasscode);
        app.update(Action::Admin(AdminAction::AddLesson { id: "lesson-1".into() }));
        assert_eq!(app.store().curriculum().lessons().len(), 2, "not committed yet");
        assert_eq!(app.update(Action::Admin(AdminAction::Save)), vec![Effect::Persist]);
        assert_eq!(app.store().curriculum().lessons().len(), 3);

        app.update(Action::Admin(AdminAction::TopicInput("space".into())));
        let fx = app.update(Action::Admin(AdminAction::Generate));
        assert_eq!(fx, vec![Effect::Generate { topic: "space".into() }]);
        assert!(app.update(Action::Admin(AdminAction::Save)).is_empty(), "blocked while generating");
        app.update(Action::Admin(AdminAction::Generated {
            id: "lesson-ai-1".into(),
            result: Err(AiError::Status(503)),
        }));
        app.update(Action::Admin(AdminAction::Exit));
        assert!(matches!(app.screen(), Screen::Map { .. }));
    }
}
