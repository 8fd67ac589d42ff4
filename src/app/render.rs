//! HTML for the active screen.
//!
//! The runtime replaces `#rb-screen` with `render(app)` after every action that
//! changes what is shown. Controls carry `data-action` / `data-arg` attributes that
//! the runtime's delegated listener turns back into [`Action`](super::Action)s. The
//! handwriting canvases are not part of this markup; they live in a persistent
//! element that the runtime moves into `#rb-pad-slot`.

use std::f64::consts::PI;

use rand::Rng;

use super::{App, PasscodeModal, Screen};
use crate::admin::{AdminEditor, AdminModal};
use crate::challenges::{Feedback, PhraseGame, PictureMatch};
use crate::curriculum::Lesson;
use crate::progression::{self, LessonStatus, NodeState};
use crate::story::StoryBoard;
use crate::strokes::{PadMode, Prompt, WritingPad};

/// Escape text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Position of node `i` of `n` on the lesson map arc, in percent of the map box.
pub fn node_position(i: usize, n: usize) -> (f64, f64) {
    let t = if n <= 1 {
        PI / 2.0
    } else {
        i as f64 / (n - 1) as f64 * PI
    };
    (22.0 + 52.0 * t.sin(), 54.0 - 28.0 * t.cos())
}

fn button(action: &str, arg: Option<&str>, label: &str, class: &str, disabled: bool) -> String {
    let arg = arg
        .map(|a| format!(" data-arg=\"{}\"", escape(a)))
        .unwrap_or_default();
    let disabled = if disabled { " disabled" } else { "" };
    format!("<button class=\"{class}\" data-action=\"{action}\"{arg}{disabled}>{label}</button>")
}

pub fn render<R: Rng>(app: &App<R>) -> String {
    let mut html = match app.screen() {
        Screen::Map { .. } => match app.lesson() {
            Some(lesson) => map(app.store().curriculum().lessons(), lesson),
            None => empty_curriculum(),
        },
        Screen::Writing {
            lesson_id,
            index,
            pad,
        } => writing(app, lesson_id, *index, pad),
        Screen::Phrase { game, .. } => match game {
            Some(game) => phrase(game),
            None => not_configured("詞語重組", "這課還沒有詞語。"),
        },
        Screen::Match { game, .. } => match game {
            Some(game) => picture_match(game),
            None => not_configured("看圖識字", "這課還沒有配對題目。"),
        },
        Screen::Story { board, .. } => match app.lesson() {
            Some(lesson) => story(lesson, board),
            None => empty_curriculum(),
        },
        Screen::Admin { editor, topic } => admin(editor, topic),
    };
    if let Some(modal) = app.passcode() {
        html.push_str(&passcode(modal));
    }
    html
}

fn empty_curriculum() -> String {
    format!(
        "<section class=\"rb-map rb-empty\"><p>還沒有課程。</p>{}</section>",
        button("passcode-open", None, "🔒", "rb-lock", false)
    )
}

fn not_configured(title: &str, message: &str) -> String {
    format!(
        "<section class=\"rb-not-configured\"><h2>{}</h2><p>{}</p>{}</section>",
        escape(title),
        escape(message),
        button("back", None, "返回地圖", "rb-back", false)
    )
}

fn map(lessons: &[Lesson], lesson: &Lesson) -> String {
    let mut html = String::from("<section class=\"rb-map\"><nav class=\"rb-lessons\">");
    for l in lessons {
        let class = match (l.id == lesson.id, l.unlocked) {
            (true, _) => "rb-lesson-tab rb-active",
            (false, true) => "rb-lesson-tab",
            (false, false) => "rb-lesson-tab rb-locked",
        };
        html.push_str(&button("select-lesson", Some(&l.id), &escape(&l.title), class, !l.unlocked));
    }
    html.push_str(&button("passcode-open", None, "🔒", "rb-lock", false));
    html.push_str("</nav>");

    html.push_str(&format!(
        "<header class=\"rb-lesson-head\"><img src=\"{}\" alt=\"\"><h1>{}</h1></header>",
        escape(&lesson.image),
        escape(&lesson.title)
    ));

    html.push_str("<div class=\"rb-arc\">");
    let states = progression::node_states(lesson);
    let n = lesson.characters.len();
    for (i, (ch, state)) in lesson.characters.iter().zip(&states).enumerate() {
        let (x, y) = node_position(i, n);
        let class = match state {
            NodeState::Locked => "rb-node rb-locked",
            NodeState::Next => "rb-node rb-next",
            NodeState::Unlocked => "rb-node rb-done",
        };
        let label = if state.is_clickable() { escape(&ch.glyph) } else { "🔒".to_string() };
        html.push_str(&format!(
            "<button class=\"{class}\" style=\"left:{x:.1}%;top:{y:.1}%\" data-action=\"open-char\" data-arg=\"{i}\"{}>{label}</button>",
            if state.is_clickable() { "" } else { " disabled" }
        ));
    }
    html.push_str("</div><div class=\"rb-challenges\">");
    if lesson.enable_phrases {
        html.push_str(&button("open-phrase", None, "詞語重組", "rb-challenge", !lesson.unlocked));
    }
    if lesson.enable_match {
        html.push_str(&button("open-match", None, "看圖識字", "rb-challenge", !lesson.unlocked));
    }
    html.push_str(&button("open-story", None, "故事創作", "rb-challenge", !lesson.unlocked));
    html.push_str("</div>");

    let has_next = lessons
        .iter()
        .position(|l| l.id == lesson.id)
        .and_then(|i| lessons.get(i + 1))
        .is_some_and(|next| next.unlocked);
    if progression::lesson_status(lesson) == LessonStatus::Complete && has_next {
        html.push_str(&button("next-lesson", None, "下一課 ➜", "rb-next-lesson", false));
    }
    html.push_str("</section>");
    html
}

fn writing<R: Rng>(app: &App<R>, lesson_id: &str, index: usize, pad: &WritingPad) -> String {
    let character = app.store().curriculum().character_at(lesson_id, index);
    let mut html = String::from("<section class=\"rb-writing\">");
    html.push_str(&button("back", None, "←", "rb-back", pad.is_verifying()));
    if let Some(ch) = character {
        html.push_str(&format!(
            "<header class=\"rb-glyph-info\"><span class=\"rb-glyph\">{}</span><span>{}</span><span>{}</span><span>{}</span></header>",
            escape(&ch.glyph),
            escape(&ch.pinyin),
            escape(&ch.jyutping),
            escape(&ch.meaning)
        ));
    }
    html.push_str(&button("pad-lang", None, pad.lang().label(), "rb-lang", false));
    html.push_str(&button("pad-speak", None, "🔊", "rb-speak", false));

    html.push_str("<div id=\"rb-pad-slot\" class=\"rb-pad-slot\" style=\"position:relative;aspect-ratio:1/1\">");
    if let Some((number, at)) = pad.badge() {
        html.push_str(&format!(
            "<span class=\"rb-badge\" style=\"position:absolute;z-index:2;left:{:.1}%;top:{:.1}%\">{number}</span>",
            at.x, at.y
        ));
    }
    match pad.prompt() {
        Some(Prompt::PracticeStarted) => {
            html.push_str("<div class=\"rb-prompt\">跟著藍色筆順寫一寫！</div>")
        }
        Some(Prompt::TryAgain) => html.push_str("<div class=\"rb-prompt rb-retry\">再試一次！</div>"),
        None => {}
    }
    if pad.is_verifying() {
        html.push_str("<div class=\"rb-verifying\">評分中...</div>");
    }
    html.push_str("</div>");

    if pad.is_passed() {
        html.push_str("<div class=\"rb-success\"><p>太棒了！</p>");
        html.push_str(&button("pad-continue", None, "繼續 ➜", "rb-continue", false));
        html.push_str("</div>");
    } else {
        html.push_str("<div class=\"rb-pad-tools\">");
        let busy = pad.is_verifying();
        match pad.mode() {
            PadMode::Free => {
                html.push_str(&button("pad-record", None, "錄製筆順", "rb-tool", busy));
                html.push_str(&button(
                    "pad-practice",
                    None,
                    "練習筆順",
                    "rb-tool",
                    busy || pad.recorded().is_empty(),
                ));
                html.push_str(&button("pad-clear", None, "清除", "rb-tool", busy));
                html.push_str(&button("pad-submit", None, "完成", "rb-submit", busy || !pad.has_ink()));
            }
            PadMode::Recording => {
                html.push_str(&button(
                    "pad-practice",
                    None,
                    "完成錄製",
                    "rb-tool",
                    pad.recorded().is_empty(),
                ));
                html.push_str(&button("pad-cancel", None, "取消", "rb-tool", false));
            }
            PadMode::Practicing { .. } => {
                html.push_str(&button("pad-leave", None, "自由書寫", "rb-tool", busy));
                html.push_str(&button("pad-clear", None, "重來", "rb-tool", busy));
            }
        }
        html.push_str("</div>");
    }
    html.push_str("</section>");
    html
}

fn feedback_class(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::Playing => "",
        Feedback::Success => " rb-ok",
        Feedback::Error => " rb-error",
    }
}

fn phrase(game: &PhraseGame) -> String {
    let target = game.phrase();
    let mut html = format!(
        "<section class=\"rb-phrase{}\">{}<p class=\"rb-progress\">{} / {}</p><p class=\"rb-hint\">{} · {}</p><div class=\"rb-slots\">",
        feedback_class(game.feedback()),
        button("back", None, "←", "rb-back", false),
        game.index() + 1,
        game.phrase_count(),
        escape(&target.meaning),
        escape(&target.pinyin)
    );
    for slot in game.slots() {
        match slot {
            Some((pool_index, glyph)) => html.push_str(&button(
                "tile",
                Some(&pool_index.to_string()),
                &escape(glyph),
                "rb-slot rb-filled",
                false,
            )),
            None => html.push_str("<span class=\"rb-slot\"></span>"),
        }
    }
    html.push_str("</div><div class=\"rb-pool\">");
    for (i, glyph) in game.pool().iter().enumerate() {
        html.push_str(&button(
            "tile",
            Some(&i.to_string()),
            &escape(glyph),
            "rb-tile",
            game.is_placed(i),
        ));
    }
    html.push_str("</div>");
    if game.feedback() == Feedback::Success {
        let label = if game.is_last() { "完成！" } else { "下一題 ➜" };
        html.push_str(&button("next-question", None, label, "rb-next", false));
    }
    html.push_str("</section>");
    html
}

fn picture_match(game: &PictureMatch) -> String {
    let mut html = format!(
        "<section class=\"rb-match{}\">{}<p class=\"rb-progress\">{} / {}</p><img class=\"rb-picture\" src=\"{}\" alt=\"\"><div class=\"rb-options\">",
        feedback_class(game.feedback()),
        button("back", None, "←", "rb-back", false),
        game.index() + 1,
        game.question_count(),
        escape(&game.question().image_url)
    );
    for option in game.options() {
        let class = if game.selected() == Some(option.as_str()) {
            "rb-option rb-selected"
        } else {
            "rb-option"
        };
        html.push_str(&button("option", Some(option), &escape(option), class, false));
    }
    html.push_str("</div>");
    if game.feedback() == Feedback::Success {
        let label = if game.is_last() { "完成！" } else { "下一題 ➜" };
        html.push_str(&button("next-question", None, label, "rb-next", false));
    }
    html.push_str("</section>");
    html
}

fn story(lesson: &Lesson, board: &StoryBoard) -> String {
    let mut html = format!(
        "<section class=\"rb-story\">{}<div class=\"rb-sentence\">",
        button("back", None, "←", "rb-back", false)
    );
    for (i, glyph) in board.glyphs().iter().enumerate() {
        html.push_str(&button("story-remove", Some(&i.to_string()), &escape(glyph), "rb-word", false));
    }
    html.push_str("</div><div class=\"rb-bank\">");
    let bank = StoryBoard::bank(lesson);
    if bank.is_empty() {
        html.push_str("<p>先學會一些字再來創作吧！</p>");
    }
    for glyph in bank {
        html.push_str(&button("story-add", Some(glyph), &escape(glyph), "rb-tile", false));
    }
    html.push_str("</div><div class=\"rb-story-tools\">");
    let empty = board.glyphs().is_empty();
    html.push_str(&button("story-speak", None, "🔊 朗讀", "rb-tool", empty));
    html.push_str(&button("story-clear", None, "清除", "rb-tool", empty));
    html.push_str("</div></section>");
    html
}

fn passcode(modal: &PasscodeModal) -> String {
    format!(
        "<div class=\"rb-modal\"><div class=\"rb-dialog{}\"><h2>家長密碼</h2><input id=\"rb-passcode\" type=\"password\" data-action=\"passcode-input\" value=\"{}\">{}{}{}</div></div>",
        if modal.error { " rb-error" } else { "" },
        escape(&modal.input),
        if modal.error { "<p class=\"rb-error-text\">密碼錯誤</p>" } else { "" },
        button("passcode-submit", None, "確定", "rb-confirm", false),
        button("passcode-close", None, "取消", "rb-cancel", false)
    )
}

fn text_field(path: &str, label: &str, value: &str) -> String {
    format!(
        "<label>{label}<input type=\"text\" data-action=\"admin-field\" data-arg=\"{path}\" value=\"{}\"></label>",
        escape(value)
    )
}

fn check_field(path: &str, label: &str, checked: bool, disabled: bool) -> String {
    format!(
        "<label><input type=\"checkbox\" data-action=\"admin-field\" data-arg=\"{path}\"{}{}>{label}</label>",
        if checked { " checked" } else { "" },
        if disabled { " disabled" } else { "" }
    )
}

fn admin(editor: &AdminEditor, topic: &str) -> String {
    let busy = editor.is_generating();
    let mut html = String::from("<section class=\"rb-admin\"><div class=\"rb-admin-bar\">");
    for (action, label) in [
        ("admin-add-lesson", "新增課程"),
        ("admin-import", "導入"),
        ("admin-export", "導出"),
        ("admin-ai", "AI 生成"),
        ("admin-save", "儲存"),
        ("admin-exit", "離開"),
    ] {
        html.push_str(&button(action, None, label, "rb-tool", busy));
    }
    html.push_str("</div><aside class=\"rb-admin-lessons\">");
    let count = editor.lessons().len();
    for (i, lesson) in editor.lessons().iter().enumerate() {
        let active = editor.selected_id() == Some(lesson.id.as_str());
        html.push_str(&format!(
            "<div class=\"rb-admin-lesson{}\">",
            if active { " rb-active" } else { "" }
        ));
        html.push_str(&button("admin-select", Some(&lesson.id), &escape(&lesson.title), "rb-link", busy));
        let index = i.to_string();
        html.push_str(&button("admin-up", Some(&index), "▲", "rb-icon", busy || i == 0));
        html.push_str(&button("admin-down", Some(&index), "▼", "rb-icon", busy || i + 1 == count));
        html.push_str(&button("admin-delete", Some(&lesson.id), "✕", "rb-icon", busy));
        html.push_str("</div>");
    }
    html.push_str("</aside>");

    if let Some(lesson) = editor.selected_lesson() {
        let first = editor.lessons().first().is_some_and(|l| l.id == lesson.id);
        html.push_str(&lesson_form(lesson, first));
    }

    match editor.modal() {
        Some(AdminModal::Info { title, message }) => html.push_str(&format!(
            "<div class=\"rb-modal\"><div class=\"rb-dialog\"><h2>{}</h2><p>{}</p>{}</div></div>",
            escape(title),
            escape(message),
            button("admin-dismiss", None, "好的", "rb-confirm", false)
        )),
        Some(AdminModal::ConfirmDelete { lesson_id }) => {
            let title = editor
                .lessons()
                .iter()
                .find(|l| &l.id == lesson_id)
                .map(|l| l.title.as_str())
                .unwrap_or_default();
            html.push_str(&format!(
                "<div class=\"rb-modal\"><div class=\"rb-dialog\"><h2>刪除課程</h2><p>確定要刪除「{}」嗎？</p>{}{}</div></div>",
                escape(title),
                button("admin-confirm", None, "刪除", "rb-danger", false),
                button("admin-dismiss", None, "取消", "rb-cancel", false)
            ));
        }
        Some(AdminModal::TopicPrompt) => html.push_str(&format!(
            "<div class=\"rb-modal\"><div class=\"rb-dialog\"><h2>AI 生成課程</h2><input id=\"rb-topic\" type=\"text\" data-action=\"admin-topic\" placeholder=\"主題，例如：海洋動物\" value=\"{}\">{}{}</div></div>",
            escape(topic),
            button("admin-generate", None, "生成", "rb-confirm", false),
            button("admin-dismiss", None, "取消", "rb-cancel", false)
        )),
        None => {}
    }
    if busy {
        html.push_str("<div class=\"rb-modal rb-blocking\"><p>AI 正在準備課程...</p></div>");
    }
    html.push_str("</section>");
    html
}

/// The first lesson is always unlocked, so its checkbox is fixed.
fn lesson_form(lesson: &Lesson, first: bool) -> String {
    let mut html = String::from("<div class=\"rb-admin-form\"><fieldset>");
    html.push_str(&text_field("lesson.title", "標題", &lesson.title));
    html.push_str(&text_field("lesson.image", "封面圖片", &lesson.image));
    html.push_str(&check_field("lesson.unlocked", "已解鎖", lesson.unlocked || first, first));
    html.push_str(&check_field("lesson.phrases", "詞語重組", lesson.enable_phrases, false));
    html.push_str(&check_field("lesson.match", "看圖識字", lesson.enable_match, false));
    html.push_str("</fieldset><fieldset><legend>字</legend>");
    for (i, ch) in lesson.characters.iter().enumerate() {
        html.push_str("<div class=\"rb-row\">");
        html.push_str(&text_field(&format!("char.{i}.glyph"), "字", &ch.glyph));
        html.push_str(&text_field(&format!("char.{i}.pinyin"), "拼音", &ch.pinyin));
        html.push_str(&text_field(&format!("char.{i}.jyutping"), "粵拼", &ch.jyutping));
        html.push_str(&text_field(&format!("char.{i}.meaning"), "意思", &ch.meaning));
        html.push_str(&button("admin-del-char", Some(&i.to_string()), "✕", "rb-icon", false));
        html.push_str("</div>");
    }
    html.push_str(&button("admin-add-char", None, "+ 字", "rb-tool", false));
    html.push_str("</fieldset><fieldset><legend>詞語</legend>");
    for (i, p) in lesson.phrases.iter().enumerate() {
        html.push_str("<div class=\"rb-row\">");
        html.push_str(&text_field(&format!("phrase.{i}.text"), "詞語", &p.text));
        html.push_str(&text_field(&format!("phrase.{i}.pinyin"), "拼音", &p.pinyin));
        html.push_str(&text_field(&format!("phrase.{i}.jyutping"), "粵拼", &p.jyutping));
        html.push_str(&text_field(&format!("phrase.{i}.meaning"), "意思", &p.meaning));
        html.push_str(&button("admin-del-phrase", Some(&i.to_string()), "✕", "rb-icon", false));
        html.push_str("</div>");
    }
    html.push_str(&button("admin-add-phrase", None, "+ 詞語", "rb-tool", false));
    html.push_str("</fieldset><fieldset><legend>看圖識字</legend>");
    for (i, q) in lesson.match_questions.iter().enumerate() {
        html.push_str("<div class=\"rb-row\">");
        html.push_str(&format!("<img class=\"rb-thumb\" src=\"{}\" alt=\"\">", escape(&q.image_url)));
        html.push_str(&text_field(&format!("match.{i}.image"), "圖片", &q.image_url));
        html.push_str(&text_field(&format!("match.{i}.answer"), "答案", &q.correct_glyph));
        html.push_str(&button("admin-del-match", Some(&i.to_string()), "✕", "rb-icon", false));
        html.push_str("</div>");
    }
    html.push_str(&button("admin-add-match", None, "+ 題目", "rb-tool", false));
    html.push_str("</fieldset></div>");
    html
}
