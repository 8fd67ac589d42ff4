//! Owned curriculum store and its on-device persistence slot.
//!
//! The application root is the only owner; screens request changes through the
//! store's methods and the runtime persists after each accepted change.

use std::collections::HashMap;

use crate::curriculum::{Curriculum, Lesson, StrokeInfo, default_curriculum};
use crate::error::StorageError;
use crate::progression::{self, Completion};
use crate::strokes::Stroke;

/// Named text slots (browser `localStorage` or an in-memory map).
pub trait SlotStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`.
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        let win = web_sys::window().ok_or(StorageError::Unavailable)?;
        let inner = win
            .local_storage()
            .map_err(|e| StorageError::Js(format!("{e:?}")))?
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { inner })
    }
}

impl SlotStorage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|e| StorageError::Js(format!("{e:?}")))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|e| StorageError::Js(format!("{e:?}")))
    }
}

#[derive(Default, Debug)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl SlotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Where the curriculum came from at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource {
    Saved,
    Defaults,
    /// Saved data existed but could not be read; defaults were used instead.
    Fallback,
}

#[derive(Clone, Debug)]
pub struct CurriculumStore {
    curriculum: Curriculum,
    key: String,
}

impl CurriculumStore {
    pub fn new(curriculum: Curriculum, key: impl Into<String>) -> Self {
        Self {
            curriculum,
            key: key.into(),
        }
    }

    /// Load the saved curriculum, falling back to the built-in one when the slot is
    /// empty, unreadable or malformed.
    pub fn load(storage: &dyn SlotStorage, key: &str) -> (Self, LoadSource) {
        let (curriculum, source) = match storage.read(key) {
            Ok(Some(text)) => match Curriculum::from_json(&text) {
                Ok(c) if !c.is_empty() => (c, LoadSource::Saved),
                Ok(_) => {
                    log::warn!("saved curriculum is empty; using built-in lessons");
                    (default_curriculum(), LoadSource::Fallback)
                }
                Err(err) => {
                    log::error!("saved curriculum unreadable ({err}); using built-in lessons");
                    (default_curriculum(), LoadSource::Fallback)
                }
            },
            Ok(None) => (default_curriculum(), LoadSource::Defaults),
            Err(err) => {
                log::error!("cannot read saved curriculum ({err}); using built-in lessons");
                (default_curriculum(), LoadSource::Fallback)
            }
        };
        log::info!(
            "curriculum loaded from {:?}: {} lessons",
            source,
            curriculum.lessons().len()
        );
        (Self::new(curriculum, key), source)
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn complete_character(&mut self, lesson_id: &str, index: usize) -> Option<Completion> {
        let done = progression::complete_character(&mut self.curriculum, lesson_id, index);
        match &done {
            Some(c) => log::info!(
                "character #{} learned (lesson {}, complete: {}, opened: {:?})",
                index,
                c.lesson_id,
                c.lesson_completed,
                c.next_unlocked
            ),
            None => log::warn!("completed character #{index} of '{lesson_id}' is not in the curriculum"),
        }
        done
    }

    pub fn unlock_all(&mut self) {
        progression::unlock_all(&mut self.curriculum);
        log::info!("all lessons unlocked by passcode");
    }

    /// Commit an edited lesson list wholesale. The first lesson is always unlocked.
    pub fn replace_lessons(&mut self, lessons: Vec<Lesson>) {
        if let Some(first) = lessons.first().filter(|l| !l.unlocked) {
            log::warn!("first lesson '{}' saved as locked; keeping it unlocked", first.id);
        }
        self.curriculum = Curriculum::from_lessons(lessons);
    }

    /// Store demonstration strokes on character `index` of `lesson_id`. Returns false
    /// if there is no such character.
    pub fn record_strokes(&mut self, lesson_id: &str, index: usize, strokes: &[Stroke]) -> bool {
        let Some(li) = self.curriculum.lesson_index(lesson_id) else {
            return false;
        };
        let Some(ch) = self.curriculum.lessons_mut()[li].characters.get_mut(index) else {
            return false;
        };
        let infos = strokes
            .iter()
            .enumerate()
            .map(|(i, s)| StrokeInfo {
                order: i as u32,
                name: format!("stroke {}", i + 1),
                description: String::new(),
                path: s.points().to_vec(),
            })
            .collect();
        ch.strokes = Some(infos);
        true
    }

    /// Last write wins.
    pub fn persist(&self, storage: &mut dyn SlotStorage) -> Result<(), StorageError> {
        let text = self
            .curriculum
            .to_json()
            .map_err(|e| StorageError::Js(e.to_string()))?;
        storage.write(&self.key, &text)
    }
}
