// User and runtime inputs to `App::update`, plus decoding of DOM `data-action` names.
use crate::admin::{CharacterField, Direction, Edit, LessonField, MatchField, PhraseField};
use crate::ai::{GeneratedLesson, Judgment};
use crate::challenges::ChallengeKind;
use crate::error::AiError;
use crate::strokes::Point;

/// Delayed follow-ups requested through `Effect::Schedule`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    /// End of a mini-game error flash.
    Feedback,
    PasscodeError,
    /// Hide the pad's practice / retry message.
    Prompt,
}

#[derive(Debug)]
pub enum Action {
    SelectLesson(String),
    NextLesson,
    /// Position of the character in the current lesson.
    OpenCharacter(usize),
    OpenChallenge(ChallengeKind),
    OpenStory,
    BackToMap,

    OpenPasscode,
    PasscodeInput(String),
    SubmitPasscode,
    ClosePasscode,

    PadDown(Point),
    PadMove(Point),
    PadUp,
    StartRecording,
    CancelRecording,
    StartPracticing,
    LeavePractice,
    ClearPad,
    SubmitDrawing,
    ToggleLang,
    SpeakGlyph,
    DemoFinished,
    Judged {
        glyph: String,
        result: Result<Judgment, AiError>,
    },
    ContinueAfterPass,

    ToggleTile(usize),
    SelectOption(String),
    NextQuestion,

    StoryPush(String),
    StoryRemove(usize),
    StoryClear,
    StorySpeak,

    Admin(AdminAction),
    Timer(Timer),
}

#[derive(Debug)]
pub enum AdminAction {
    Select(String),
    AddLesson { id: String },
    RequestDelete(String),
    Confirm,
    DismissModal,
    Move(usize, Direction),
    Edit(Edit, String),
    AddCharacter,
    DeleteCharacter(usize),
    AddPhrase,
    DeletePhrase(usize),
    AddMatch,
    DeleteMatch(usize),
    PickImport,
    Import(String),
    Export,
    OpenGenerator,
    TopicInput(String),
    Generate,
    Generated {
        id: String,
        result: Result<GeneratedLesson, AiError>,
    },
    Save,
    Exit,
}

impl Action {
    /// Keystrokes and pointer moves update state without rebuilding the screen, so
    /// focused inputs and an active pointer capture survive.
    pub fn rerenders(&self) -> bool {
        !matches!(
            self,
            Action::PadDown(_)
                | Action::PadMove(_)
                | Action::PasscodeInput(_)
                | Action::Admin(AdminAction::TopicInput(_))
                | Action::Admin(AdminAction::Edit(..))
        )
    }
}

/// A delegated DOM event reduced to the element's `data-action`, `data-arg` and,
/// for form controls, the current value.
#[derive(Clone, Debug, Default)]
pub struct DomEvent<'a> {
    pub action: &'a str,
    pub arg: Option<&'a str>,
    pub value: Option<String>,
    /// `Date.now()` at dispatch; used for new lesson ids.
    pub now_ms: f64,
}

impl DomEvent<'_> {
    pub fn to_action(&self) -> Option<Action> {
        let arg = || self.arg.map(str::to_string);
        let index = || self.arg.and_then(|a| a.parse::<usize>().ok());
        let value = || self.value.clone().unwrap_or_default();
        let admin = |a: AdminAction| Some(Action::Admin(a));

        match self.action {
            "select-lesson" => arg().map(Action::SelectLesson),
            "next-lesson" => Some(Action::NextLesson),
            "open-char" => index().map(Action::OpenCharacter),
            "open-phrase" => Some(Action::OpenChallenge(ChallengeKind::Phrase)),
            "open-match" => Some(Action::OpenChallenge(ChallengeKind::PictureMatch)),
            "open-story" => Some(Action::OpenStory),
            "back" => Some(Action::BackToMap),

            "passcode-open" => Some(Action::OpenPasscode),
            "passcode-input" => Some(Action::PasscodeInput(value())),
            "passcode-submit" => Some(Action::SubmitPasscode),
            "passcode-close" => Some(Action::ClosePasscode),

            "pad-record" => Some(Action::StartRecording),
            "pad-cancel" => Some(Action::CancelRecording),
            "pad-practice" => Some(Action::StartPracticing),
            "pad-leave" => Some(Action::LeavePractice),
            "pad-clear" => Some(Action::ClearPad),
            "pad-submit" => Some(Action::SubmitDrawing),
            "pad-lang" => Some(Action::ToggleLang),
            "pad-speak" => Some(Action::SpeakGlyph),
            "pad-continue" => Some(Action::ContinueAfterPass),

            "tile" => index().map(Action::ToggleTile),
            "option" => arg().map(Action::SelectOption),
            "next-question" => Some(Action::NextQuestion),

            "story-add" => arg().map(Action::StoryPush),
            "story-remove" => index().map(Action::StoryRemove),
            "story-clear" => Some(Action::StoryClear),
            "story-speak" => Some(Action::StorySpeak),

            "admin-select" => arg().and_then(|id| admin(AdminAction::Select(id))),
            "admin-add-lesson" => admin(AdminAction::AddLesson {
                id: format!("lesson-{}", self.now_ms as u64),
            }),
            "admin-delete" => arg().and_then(|id| admin(AdminAction::RequestDelete(id))),
            "admin-confirm" => admin(AdminAction::Confirm),
            "admin-dismiss" => admin(AdminAction::DismissModal),
            "admin-up" => index().and_then(|i| admin(AdminAction::Move(i, Direction::Up))),
            "admin-down" => index().and_then(|i| admin(AdminAction::Move(i, Direction::Down))),
            "admin-field" => {
                let edit = self.arg.and_then(parse_edit)?;
                admin(AdminAction::Edit(edit, value()))
            }
            "admin-add-char" => admin(AdminAction::AddCharacter),
            "admin-del-char" => index().and_then(|i| admin(AdminAction::DeleteCharacter(i))),
            "admin-add-phrase" => admin(AdminAction::AddPhrase),
            "admin-del-phrase" => index().and_then(|i| admin(AdminAction::DeletePhrase(i))),
            "admin-add-match" => admin(AdminAction::AddMatch),
            "admin-del-match" => index().and_then(|i| admin(AdminAction::DeleteMatch(i))),
            "admin-import" => admin(AdminAction::PickImport),
            "admin-export" => admin(AdminAction::Export),
            "admin-ai" => admin(AdminAction::OpenGenerator),
            "admin-topic" => admin(AdminAction::TopicInput(value())),
            "admin-generate" => admin(AdminAction::Generate),
            "admin-save" => admin(AdminAction::Save),
            "admin-exit" => admin(AdminAction::Exit),
            _ => None,
        }
    }
}

/// `lesson.title`, `char.2.pinyin`, `phrase.0.text`, `match.1.answer`, ...
pub fn parse_edit(path: &str) -> Option<Edit> {
    let mut parts = path.split('.');
    let scope = parts.next()?;
    if scope == "lesson" {
        let field = match parts.next()? {
            "title" => LessonField::Title,
            "image" => LessonField::Image,
            "unlocked" => LessonField::Unlocked,
            "phrases" => LessonField::EnablePhrases,
            "match" => LessonField::EnableMatch,
            _ => return None,
        };
        return Some(Edit::Lesson(field));
    }
    let index: usize = parts.next()?.parse().ok()?;
    let name = parts.next()?;
    let edit = match (scope, name) {
        ("char", "glyph") => Edit::Character(index, CharacterField::Glyph),
        ("char", "pinyin") => Edit::Character(index, CharacterField::Pinyin),
        ("char", "jyutping") => Edit::Character(index, CharacterField::Jyutping),
        ("char", "meaning") => Edit::Character(index, CharacterField::Meaning),
        ("phrase", "text") => Edit::Phrase(index, PhraseField::Text),
        ("phrase", "pinyin") => Edit::Phrase(index, PhraseField::Pinyin),
        ("phrase", "jyutping") => Edit::Phrase(index, PhraseField::Jyutping),
        ("phrase", "meaning") => Edit::Phrase(index, PhraseField::Meaning),
        ("match", "image") => Edit::Match(index, MatchField::ImageUrl),
        ("match", "answer") => Edit::Match(index, MatchField::CorrectGlyph),
        _ => return None,
    };
    Some(edit)
}
