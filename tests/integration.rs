// Integration tests (native) for the `rainbow-brush` crate.
// These tests avoid wasm-specific functionality and exercise pure Rust logic so
// they can run under `cargo test` on the host.

use rand::SeedableRng;
use rand::rngs::StdRng;

use rainbow_brush::admin::AdminEditor;
use rainbow_brush::app::Timer;
use rainbow_brush::challenges::{ChallengeKind, PictureMatch};
use rainbow_brush::progression::{self, NodeState};
use rainbow_brush::strokes::{PadEffect, Point, WritingPad};
use rainbow_brush::{
    Action, AiError, App, AppConfig, Character, Curriculum, CurriculumStore, Effect, Lesson,
    LoadSource, MatchQuestion, MemoryStorage, Screen, SlotStorage,
};

fn two_lessons() -> Curriculum {
    let mut a = Lesson::blank("A", "Lesson A", "");
    a.characters.push(Character::new("日", "rì", "jat6", "Sun", 0));
    a.characters.push(Character::new("月", "yuè", "jyut6", "Moon", 1));
    let mut b = Lesson::blank("B", "Lesson B", "");
    b.characters.push(Character::new("山", "shān", "saan1", "Mountain", 0));
    Curriculum::from_lessons(vec![a, b])
}

// Lesson A (2 locked characters) then Lesson B (locked).
#[test]
fn completing_a_lesson_unlocks_the_next_one() {
    let mut c = two_lessons();

    let done = progression::complete_character(&mut c, "A", 0).unwrap();
    assert!(!done.lesson_completed);
    assert!(c.lesson("A").unwrap().unlocked);
    assert!(c.character_at("A", 0).unwrap().unlocked);
    assert!(!c.character_at("A", 1).unwrap().unlocked);
    assert!(!c.lesson("B").unwrap().unlocked);

    let done = progression::complete_character(&mut c, "A", 1).unwrap();
    assert!(done.lesson_completed);
    assert_eq!(done.next_unlocked.as_deref(), Some("B"));
    assert!(c.character_at("A", 1).unwrap().unlocked);
    assert!(c.lesson("B").unwrap().unlocked);
    assert!(!c.character_at("B", 0).unwrap().unlocked);
}

#[test]
fn completing_a_missing_character_changes_nothing() {
    let mut c = two_lessons();
    let before = c.clone();
    assert!(progression::complete_character(&mut c, "A", 2).is_none());
    assert!(progression::complete_character(&mut c, "C", 0).is_none());
    assert_eq!(c, before);
}

#[test]
fn node_states_expose_one_next_character() {
    let mut c = two_lessons();
    let a = c.lesson("A").unwrap();
    assert_eq!(progression::node_states(a), vec![NodeState::Next, NodeState::Locked]);
    assert_eq!(progression::node_states(c.lesson("B").unwrap()), vec![NodeState::Locked]);

    progression::complete_character(&mut c, "A", 0);
    let a = c.lesson("A").unwrap();
    assert_eq!(progression::node_states(a), vec![NodeState::Unlocked, NodeState::Next]);
}

#[test]
fn unlock_all_leaves_nothing_locked() {
    let mut c = rainbow_brush::default_curriculum();
    progression::unlock_all(&mut c);
    for lesson in c.lessons() {
        assert!(lesson.unlocked, "lesson {} still locked", lesson.id);
        assert!(lesson.characters.iter().all(|ch| ch.unlocked));
    }
}

#[test]
fn rejected_import_keeps_working_copy() {
    let mut editor = AdminEditor::new(&two_lessons(), "cover.png");
    let before = editor.lessons().to_vec();
    assert!(editor.import_json(r#"{"id":"A"}"#).is_err());
    assert!(editor.import_json("<html>").is_err());
    assert_eq!(editor.lessons(), before.as_slice());
}

#[test]
fn match_options_are_shuffled_across_deals() {
    let mut lesson = Lesson::blank("L", "L", "");
    for (i, g) in ["木", "山", "水", "火", "土"].iter().enumerate() {
        lesson.characters.push(Character::new(g, "", "", "", i as u32));
    }
    lesson.match_questions.push(MatchQuestion {
        image_url: "tree.png".into(),
        correct_glyph: "木".into(),
    });

    let mut orders = std::collections::HashSet::new();
    for seed in 0..20 {
        let game = PictureMatch::new(&lesson, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert_eq!(game.options().len(), 4);
        assert_eq!(game.options().iter().filter(|o| *o == "木").count(), 1);
        orders.insert(game.options().to_vec());
    }
    assert!(orders.len() > 1, "option order never changed");
}

#[test]
fn recorder_never_keeps_taps() {
    let mut pad = WritingPad::new(&Character::new("人", "rén", "jan4", "Person", 0));
    pad.start_recording();
    for _ in 0..3 {
        assert!(pad.pointer_down(Point::new(50.0, 50.0)));
        pad.pointer_move(Point::new(51.0, 51.0));
        pad.pointer_up();
    }
    assert!(pad.recorded().is_empty());

    pad.pointer_down(Point::new(50.0, 10.0));
    pad.pointer_move(Point::new(30.0, 60.0));
    pad.pointer_move(Point::new(10.0, 90.0));
    pad.pointer_up();
    assert_eq!(pad.recorded().len(), 1);
}

#[test]
fn judge_outage_counts_as_pass() {
    let mut pad = WritingPad::new(&Character::new("人", "rén", "jan4", "Person", 0));
    pad.pointer_down(Point::new(50.0, 10.0));
    pad.pointer_move(Point::new(10.0, 90.0));
    pad.pointer_up();
    assert_eq!(pad.submit(), vec![PadEffect::Judge]);
    let fx = pad.judgment(Err(AiError::transport("network down")), 6.0);
    assert!(pad.is_passed());
    assert!(matches!(&fx[..], [PadEffect::Speak { text, .. }] if text == "人"));
}

#[test]
fn progress_persists_through_the_app() {
    let mut storage = MemoryStorage::default();
    let (store, source) = CurriculumStore::load(&storage, "slot");
    assert_eq!(source, LoadSource::Defaults);
    let mut app = App::new(AppConfig::default(), store, StdRng::seed_from_u64(3));
    assert_eq!(app.screen().lesson_id(), Some("L1-1"));

    app.update(Action::OpenCharacter(0));
    assert!(matches!(app.screen(), Screen::Writing { .. }));
    app.update(Action::PadDown(Point::new(10.0, 50.0)));
    let fx = app.update(Action::PadMove(Point::new(90.0, 50.0)));
    assert!(matches!(fx[..], [Effect::Ink { .. }]));
    app.update(Action::PadUp);
    app.update(Action::SubmitDrawing);
    app.update(Action::Judged {
        glyph: "一".into(),
        result: Err(AiError::MissingKey),
    });
    let fx = app.update(Action::ContinueAfterPass);
    assert!(fx.contains(&Effect::Persist));
    app.store().persist(&mut storage).unwrap();

    let (reloaded, source) = CurriculumStore::load(&storage, "slot");
    assert_eq!(source, LoadSource::Saved);
    assert!(reloaded.curriculum().character_at("L1-1", 0).unwrap().unlocked);
    assert!(storage.read("slot").unwrap().is_some());
}

// Editor-made lessons start every new character as the same placeholder glyph.
#[test]
fn lesson_with_repeated_glyphs_can_be_finished() {
    let mut editor = AdminEditor::new(&Curriculum::default(), "cover.png");
    editor.add_lesson("A".into());
    editor.add_character();
    editor.add_character();
    editor.add_lesson("B".into());
    editor.add_character();
    let store = CurriculumStore::new(Curriculum::from_lessons(editor.save()), "slot");
    let mut app = App::new(AppConfig::default(), store, StdRng::seed_from_u64(9));

    for index in 0..2 {
        app.update(Action::OpenCharacter(index));
        let glyph = match app.screen() {
            Screen::Writing { pad, .. } => pad.glyph().to_string(),
            other => panic!("character {index} did not open: {other:?}"),
        };
        app.update(Action::PadDown(Point::new(20.0, 20.0)));
        app.update(Action::PadMove(Point::new(80.0, 80.0)));
        app.update(Action::PadUp);
        app.update(Action::SubmitDrawing);
        app.update(Action::Judged {
            glyph,
            result: Err(AiError::transport("offline")),
        });
        app.update(Action::ContinueAfterPass);
    }

    let a = app.store().curriculum().lesson("A").unwrap();
    assert_eq!(progression::node_states(a), vec![NodeState::Unlocked, NodeState::Unlocked]);
    assert!(app.store().curriculum().lesson("B").unwrap().unlocked);
}

#[test]
fn phrase_challenge_speaks_wrong_attempts_and_resets() {
    let (store, _) = CurriculumStore::load(&MemoryStorage::default(), "slot");
    let mut app = App::new(AppConfig::default(), store, StdRng::seed_from_u64(5));
    app.update(Action::OpenChallenge(ChallengeKind::Phrase));
    let Screen::Phrase { game: Some(game), .. } = app.screen() else {
        panic!("expected a phrase game");
    };
    let target: Vec<String> = game.phrase().text.chars().map(String::from).collect();
    let pool = game.pool().to_vec();

    // Place the tiles in reverse target order, which is wrong for any phrase of
    // distinct glyphs.
    let mut used = Vec::new();
    let mut fx = Vec::new();
    for glyph in target.iter().rev() {
        let i = (0..pool.len())
            .find(|i| pool[*i] == *glyph && !used.contains(i))
            .unwrap();
        used.push(i);
        fx = app.update(Action::ToggleTile(i));
    }
    assert!(matches!(fx[0], Effect::Speak { .. }));
    assert!(fx.contains(&Effect::Schedule {
        timer: Timer::Feedback,
        after_ms: 1000
    }));

    app.update(Action::Timer(Timer::Feedback));
    let Screen::Phrase { game: Some(game), .. } = app.screen() else {
        panic!("expected a phrase game");
    };
    assert!(game.slots().iter().all(Option::is_none));
}
