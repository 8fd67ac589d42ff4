//! Unlock rules over the curriculum.
//!
//! A character unlocks when its writing challenge is passed; a lesson unlocks when
//! every character of the lesson before it is unlocked. Both transitions are one-way.

use crate::curriculum::{Curriculum, Lesson};

/// Outcome of completing one character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub lesson_id: String,
    /// Every character of the lesson is now unlocked.
    pub lesson_completed: bool,
    /// Id of the following lesson when this completion unlocked it.
    pub next_unlocked: Option<String>,
}

/// Mark character `index` of lesson `lesson_id` as learned and open the next lesson
/// when its lesson is finished. Returns `None` (and changes nothing) when there is no
/// such character. Glyphs may repeat, so characters are addressed by position.
pub fn complete_character(
    curriculum: &mut Curriculum,
    lesson_id: &str,
    index: usize,
) -> Option<Completion> {
    let li = curriculum.lesson_index(lesson_id)?;
    let lessons = curriculum.lessons_mut();
    lessons[li].characters.get_mut(index)?.unlocked = true;

    let lesson_completed = lessons[li].is_complete();
    let mut next_unlocked = None;
    if lesson_completed {
        if let Some(next) = lessons.get_mut(li + 1) {
            if !next.unlocked {
                next.unlocked = true;
                next_unlocked = Some(next.id.clone());
            }
        }
    }
    Some(Completion {
        lesson_id: lessons[li].id.clone(),
        lesson_completed,
        next_unlocked,
    })
}

/// Developer override: every lesson and character becomes available.
pub fn unlock_all(curriculum: &mut Curriculum) {
    for lesson in curriculum.lessons_mut() {
        lesson.unlocked = true;
        for ch in &mut lesson.characters {
            ch.unlocked = true;
        }
    }
}

/// How a character is shown on the lesson map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Locked,
    /// The single character the learner may attempt next.
    Next,
    Unlocked,
}

impl NodeState {
    pub fn is_clickable(self) -> bool {
        !matches!(self, NodeState::Locked)
    }
}

/// Per-character map state. Only the character right after the last unlocked one
/// (or the first, if none are unlocked) is `Next`; nothing is reachable in a
/// locked lesson.
pub fn node_states(lesson: &Lesson) -> Vec<NodeState> {
    if !lesson.unlocked {
        return vec![NodeState::Locked; lesson.characters.len()];
    }
    let next = match lesson.characters.iter().rposition(|c| c.unlocked) {
        Some(last) => last + 1,
        None => 0,
    };
    lesson
        .characters
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if c.unlocked {
                NodeState::Unlocked
            } else if i == next {
                NodeState::Next
            } else {
                NodeState::Locked
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonStatus {
    Locked,
    InProgress,
    Complete,
}

pub fn lesson_status(lesson: &Lesson) -> LessonStatus {
    if !lesson.unlocked {
        LessonStatus::Locked
    } else if lesson.is_complete() {
        LessonStatus::Complete
    } else {
        LessonStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::Character;

    fn lesson(id: &str, glyphs: &[&str]) -> Lesson {
        let mut l = Lesson::blank(id, id, "");
        for (i, g) in glyphs.iter().enumerate() {
            l.characters.push(Character::new(g, "", "", "", i as u32));
        }
        l
    }

    #[test]
    fn completing_a_missing_character_is_a_no_op() {
        let mut c = Curriculum::from_lessons(vec![lesson("a", &["一"])]);
        let before = c.clone();
        assert_eq!(complete_character(&mut c, "a", 1), None);
        assert_eq!(complete_character(&mut c, "z", 0), None);
        assert_eq!(c, before);
    }

    #[test]
    fn repeated_glyphs_unlock_one_at_a_time() {
        let mut c = Curriculum::from_lessons(vec![lesson("a", &["新", "新"]), lesson("b", &["一"])]);
        let done = complete_character(&mut c, "a", 0).unwrap();
        assert!(!done.lesson_completed);
        assert_eq!(
            node_states(&c.lessons()[0]),
            vec![NodeState::Unlocked, NodeState::Next]
        );

        let done = complete_character(&mut c, "a", 1).unwrap();
        assert!(done.lesson_completed);
        assert_eq!(done.next_unlocked.as_deref(), Some("b"));
        assert_eq!(
            node_states(&c.lessons()[0]),
            vec![NodeState::Unlocked, NodeState::Unlocked]
        );
    }

    #[test]
    fn last_lesson_completion_unlocks_nothing_further() {
        let mut c = Curriculum::from_lessons(vec![lesson("a", &["一"])]);
        let done = complete_character(&mut c, "a", 0).unwrap();
        assert!(done.lesson_completed);
        assert_eq!(done.next_unlocked, None);
    }

    #[test]
    fn next_node_follows_last_unlocked() {
        let mut l = lesson("a", &["一", "二", "三"]);
        l.unlocked = true;
        assert_eq!(
            node_states(&l),
            vec![NodeState::Next, NodeState::Locked, NodeState::Locked]
        );
        l.characters[0].unlocked = true;
        assert_eq!(
            node_states(&l),
            vec![NodeState::Unlocked, NodeState::Next, NodeState::Locked]
        );
    }

    #[test]
    fn gaps_leave_a_single_next_node() {
        let mut l = lesson("a", &["一", "二", "三", "四"]);
        l.unlocked = true;
        l.characters[2].unlocked = true;
        let states = node_states(&l);
        assert_eq!(states.iter().filter(|s| **s == NodeState::Next).count(), 1);
        assert_eq!(states[3], NodeState::Next);
        assert!(!states[1].is_clickable());
    }

    #[test]
    fn locked_lesson_has_no_reachable_nodes() {
        let l = lesson("b", &["一", "二"]);
        assert!(node_states(&l).iter().all(|s| *s == NodeState::Locked));
        assert_eq!(lesson_status(&l), LessonStatus::Locked);
    }

    #[test]
    fn unlock_all_opens_everything() {
        let mut c = Curriculum::from_lessons(vec![lesson("a", &["一"]), lesson("b", &["二", "三"])]);
        unlock_all(&mut c);
        for l in c.lessons() {
            assert_eq!(lesson_status(l), LessonStatus::Complete);
        }
    }
}
