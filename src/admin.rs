//! Curriculum editor.
//!
//! All edits go to a private working copy of the lessons; nothing reaches the
//! shared store until `save` hands the copy back to the caller.

use crate::ai::GeneratedLesson;
use crate::curriculum::{Character, Curriculum, Lesson, MatchQuestion, Phrase};
use crate::error::{AiError, CurriculumError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminModal {
    Info { title: String, message: String },
    ConfirmDelete { lesson_id: String },
    TopicPrompt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonField {
    Title,
    Image,
    Unlocked,
    EnablePhrases,
    EnableMatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterField {
    Glyph,
    Pinyin,
    Jyutping,
    Meaning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhraseField {
    Text,
    Pinyin,
    Jyutping,
    Meaning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchField {
    ImageUrl,
    CorrectGlyph,
}

/// A single field edit on the selected lesson.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    Lesson(LessonField),
    Character(usize, CharacterField),
    Phrase(usize, PhraseField),
    Match(usize, MatchField),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Debug)]
pub struct AdminEditor {
    working: Vec<Lesson>,
    selected: Option<String>,
    modal: Option<AdminModal>,
    generating: bool,
    placeholder_image: String,
}

impl AdminEditor {
    pub fn new(curriculum: &Curriculum, placeholder_image: impl Into<String>) -> Self {
        let working = curriculum.lessons().to_vec();
        let selected = working.first().map(|l| l.id.clone());
        Self {
            working,
            selected,
            modal: None,
            generating: false,
            placeholder_image: placeholder_image.into(),
        }
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.working
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_lesson(&self) -> Option<&Lesson> {
        let id = self.selected.as_deref()?;
        self.working.iter().find(|l| l.id == id)
    }

    fn selected_lesson_mut(&mut self) -> Option<&mut Lesson> {
        let id = self.selected.clone()?;
        self.working.iter_mut().find(|l| l.id == id)
    }

    pub fn modal(&self) -> Option<&AdminModal> {
        self.modal.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    fn info(&mut self, title: &str, message: impl Into<String>) {
        self.modal = Some(AdminModal::Info {
            title: title.to_string(),
            message: message.into(),
        });
    }

    pub fn select(&mut self, id: &str) {
        if self.working.iter().any(|l| l.id == id) {
            self.selected = Some(id.to_string());
        }
    }

    pub fn add_lesson(&mut self, id: String) {
        let lesson = Lesson::blank(id.clone(), "新課程 New Lesson", self.placeholder_image.clone());
        self.working.push(lesson);
        self.selected = Some(id);
    }

    /// Deleting a whole lesson asks first.
    pub fn request_delete(&mut self, id: &str) {
        if self.working.iter().any(|l| l.id == id) {
            self.modal = Some(AdminModal::ConfirmDelete {
                lesson_id: id.to_string(),
            });
        }
    }

    /// Confirm the open dialog (delete confirmation or info acknowledgement).
    pub fn confirm(&mut self) {
        match self.modal.take() {
            Some(AdminModal::ConfirmDelete { lesson_id }) => {
                self.working.retain(|l| l.id != lesson_id);
                self.selected = self.working.first().map(|l| l.id.clone());
            }
            Some(AdminModal::TopicPrompt) => self.modal = Some(AdminModal::TopicPrompt),
            Some(AdminModal::Info { .. }) | None => {}
        }
    }

    pub fn dismiss_modal(&mut self) {
        self.modal = None;
    }

    /// Swap with a neighbour; no-op at either end.
    pub fn move_lesson(&mut self, index: usize, dir: Direction) {
        let target = match dir {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1),
        };
        if let Some(target) = target {
            if index < self.working.len() && target < self.working.len() {
                self.working.swap(index, target);
            }
        }
    }

    /// Apply a text or checkbox value to a field of the selected lesson.
    pub fn edit(&mut self, edit: Edit, value: &str) {
        let Some(lesson) = self.selected_lesson_mut() else {
            return;
        };
        let flag = matches!(value, "true" | "on" | "1");
        match edit {
            Edit::Lesson(field) => match field {
                LessonField::Title => lesson.title = value.to_string(),
                LessonField::Image => lesson.image = value.to_string(),
                LessonField::Unlocked => lesson.unlocked = flag,
                LessonField::EnablePhrases => lesson.enable_phrases = flag,
                LessonField::EnableMatch => lesson.enable_match = flag,
            },
            Edit::Character(i, field) => {
                if let Some(c) = lesson.characters.get_mut(i) {
                    let slot = match field {
                        CharacterField::Glyph => &mut c.glyph,
                        CharacterField::Pinyin => &mut c.pinyin,
                        CharacterField::Jyutping => &mut c.jyutping,
                        CharacterField::Meaning => &mut c.meaning,
                    };
                    *slot = value.to_string();
                }
            }
            Edit::Phrase(i, field) => {
                if let Some(p) = lesson.phrases.get_mut(i) {
                    let slot = match field {
                        PhraseField::Text => &mut p.text,
                        PhraseField::Pinyin => &mut p.pinyin,
                        PhraseField::Jyutping => &mut p.jyutping,
                        PhraseField::Meaning => &mut p.meaning,
                    };
                    *slot = value.to_string();
                }
            }
            Edit::Match(i, field) => {
                if let Some(q) = lesson.match_questions.get_mut(i) {
                    match field {
                        MatchField::ImageUrl => q.image_url = value.to_string(),
                        MatchField::CorrectGlyph => q.correct_glyph = value.to_string(),
                    }
                }
            }
        }
    }

    pub fn add_character(&mut self) {
        if let Some(lesson) = self.selected_lesson_mut() {
            let order = lesson.characters.len() as u32;
            lesson
                .characters
                .push(Character::new("新", "xīn", "san1", "New", order));
        }
    }

    pub fn delete_character(&mut self, index: usize) {
        if let Some(lesson) = self.selected_lesson_mut() {
            if index < lesson.characters.len() {
                lesson.characters.remove(index);
            }
        }
    }

    pub fn add_phrase(&mut self) {
        if let Some(lesson) = self.selected_lesson_mut() {
            lesson.phrases.push(Phrase {
                text: "詞語".into(),
                meaning: "Phrase".into(),
                pinyin: "cí yǔ".into(),
                jyutping: "ci4 jyu5".into(),
            });
        }
    }

    pub fn delete_phrase(&mut self, index: usize) {
        if let Some(lesson) = self.selected_lesson_mut() {
            if index < lesson.phrases.len() {
                lesson.phrases.remove(index);
            }
        }
    }

    pub fn add_match_question(&mut self) {
        let image = self.placeholder_image.clone();
        if let Some(lesson) = self.selected_lesson_mut() {
            lesson.match_questions.push(MatchQuestion {
                image_url: image,
                correct_glyph: String::new(),
            });
        }
    }

    pub fn delete_match_question(&mut self, index: usize) {
        if let Some(lesson) = self.selected_lesson_mut() {
            if index < lesson.match_questions.len() {
                lesson.match_questions.remove(index);
            }
        }
    }

    /// Replace the working copy with an imported file. On failure the working copy
    /// is left untouched.
    pub fn import_json(&mut self, text: &str) -> Result<(), CurriculumError> {
        match Curriculum::from_json(text) {
            Ok(curriculum) => {
                self.working = curriculum.into_lessons();
                self.selected = self.working.first().map(|l| l.id.clone());
                log::info!("imported {} lessons into the editor", self.working.len());
                self.info("導入成功", "數據導入成功！記得點擊「儲存」以永久生效。");
                Ok(())
            }
            Err(err) => {
                log::warn!("import rejected: {err}");
                self.info("導入失敗", "JSON 格式錯誤，請檢查文件。");
                Err(err)
            }
        }
    }

    pub fn export_json(&self) -> Result<String, CurriculumError> {
        Ok(serde_json::to_string_pretty(&self.working)?)
    }

    pub fn open_generator(&mut self) {
        if !self.generating {
            self.modal = Some(AdminModal::TopicPrompt);
        }
    }

    /// Returns false (and does nothing) for a blank topic or while a request is pending.
    pub fn begin_generation(&mut self, topic: &str) -> bool {
        if topic.trim().is_empty() || self.generating {
            return false;
        }
        self.modal = None;
        self.generating = true;
        log::info!("generating lesson for topic '{}'", topic.trim());
        true
    }

    /// Append the generated lesson, or report the failure without adding anything.
    pub fn finish_generation(&mut self, result: Result<GeneratedLesson, AiError>, id: String) {
        if !self.generating {
            return;
        }
        self.generating = false;
        match result {
            Ok(generated) => {
                let lesson = generated.into_lesson(id.clone(), self.placeholder_image.clone());
                let title = lesson.title.clone();
                self.working.push(lesson);
                self.selected = Some(id);
                self.info("生成成功", format!("AI 已為您準備好「{title}」課程！"));
            }
            Err(err) => {
                log::error!("lesson generation failed: {err}");
                self.info("生成失敗", "AI 暫時無法處理您的請求，請稍後再試。");
            }
        }
    }

    /// The lessons to commit to the shared store.
    pub fn save(&mut self) -> Vec<Lesson> {
        self.info("儲存成功", "所有課程內容已成功更新！");
        self.working.clone()
    }
}
