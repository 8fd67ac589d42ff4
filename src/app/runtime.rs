//! Browser runtime: owns the `App`, wires DOM events to actions and performs the
//! returned effects (canvas drawing, timers, storage, speech, model calls).

use std::cell::RefCell;

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, Event, HtmlAnchorElement, HtmlCanvasElement,
    HtmlElement, HtmlInputElement, KeyboardEvent, PointerEvent, window,
};

use super::{Action, AdminAction, App, DomEvent, Effect, Timer, render};
use crate::ai;
use crate::config::AppConfig;
use crate::speech;
use crate::store::{CurriculumStore, LocalStorage, MemoryStorage, SlotStorage};
use crate::strokes::{DEMO_INK, Point, Replay, Stroke};

/// Backing resolution of both pad canvases; CSS scales them to the slot.
const PAD_SIZE: u32 = 600;
const PNG_PREFIX: &str = "data:image/png;base64,";

struct Surfaces {
    host: HtmlElement,
    ink: HtmlCanvasElement,
    ink_ctx: CanvasRenderingContext2d,
    demo_ctx: CanvasRenderingContext2d,
}

struct Ui {
    storage: Box<dyn SlotStorage>,
    screen: HtmlElement,
    pad: Surfaces,
    picker: HtmlInputElement,
    line_width: f64,
    replay_step_ms: i32,
}

struct ReplayTimer {
    handle: i32,
    // Kept alive until the next demonstration replaces it.
    _tick: Closure<dyn FnMut()>,
}

thread_local! {
    static APP: RefCell<Option<App<StdRng>>> = const { RefCell::new(None) };
    static UI: RefCell<Option<Ui>> = const { RefCell::new(None) };
    static REPLAY: RefCell<Option<ReplayTimer>> = const { RefCell::new(None) };
}

pub fn start(config: AppConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let storage: Box<dyn SlotStorage> = match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            log::warn!("{err}; progress will only last for this visit");
            Box::new(MemoryStorage::default())
        }
    };
    let (store, _) = CurriculumStore::load(storage.as_ref(), &config.storage_key);
    let line_width = f64::from(PAD_SIZE) / config.stroke_ratio.max(1.0);
    let replay_step_ms = config.replay_step_ms.max(1);
    let app = App::new(config, store, StdRng::from_entropy());

    // Create / reuse the screen container inside #rb-root (or <body>)
    let root: Element = match doc.get_element_by_id("rb-root") {
        Some(el) => el,
        None => doc
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .into(),
    };
    let screen: HtmlElement = match doc.get_element_by_id("rb-screen") {
        Some(el) => el.dyn_into()?,
        None => {
            let div: HtmlElement = doc.create_element("div")?.dyn_into()?;
            div.set_id("rb-screen");
            root.append_child(&div)?;
            div
        }
    };
    let pad = create_pad(&doc)?;
    let picker = create_picker(&doc, &root)?;
    attach_screen_listeners(&screen)?;
    attach_pad_listeners(&pad.ink)?;

    APP.with(|cell| cell.replace(Some(app)));
    UI.with(|cell| {
        cell.replace(Some(Ui {
            storage,
            screen,
            pad,
            picker,
            line_width,
            replay_step_ms,
        }))
    });
    refresh();
    log::info!("app started");
    Ok(())
}

/// Run one action through the app, redraw and perform its effects.
fn dispatch(action: Action) {
    let rerender = action.rerenders();
    let effects = APP.with(|cell| cell.borrow_mut().as_mut().map(|app| app.update(action)));
    let Some(effects) = effects else {
        return;
    };
    if rerender {
        refresh();
    }
    for effect in effects {
        if let Err(err) = perform(effect) {
            log::error!("effect failed: {err:?}");
        }
    }
}

fn refresh() {
    let Some(html) = APP.with(|cell| cell.borrow().as_ref().map(|app| render::render(app))) else {
        return;
    };
    UI.with(|cell| {
        let ui = cell.borrow();
        let Some(ui) = ui.as_ref() else {
            return;
        };
        ui.screen.set_inner_html(&html);
        // The pad survives re-renders; move it into the fresh slot when there is one.
        let Some(slot) = window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("rb-pad-slot"))
        else {
            return;
        };
        if let Err(err) = slot.insert_before(&ui.pad.host, slot.first_child().as_ref()) {
            log::error!("cannot mount pad: {err:?}");
        }
    });
}

fn perform(effect: Effect) -> Result<(), JsValue> {
    match effect {
        Effect::Persist => persist(),
        Effect::Speak { text, lang } => speech::speak(&text, lang),
        Effect::Ink { from, to, color } => with_ui(|ui| {
            draw_segment(&ui.pad.ink_ctx, from, to, color, ui.line_width);
        }),
        Effect::ClearInk => with_ui(|ui| clear(&ui.pad.ink_ctx)),
        Effect::ClearDemo => {
            stop_replay();
            with_ui(|ui| clear(&ui.pad.demo_ctx));
        }
        Effect::PlayDemo(stroke) => play_demo(&stroke)?,
        Effect::Judge { glyph } => {
            let data_url = UI.with(|cell| {
                cell.borrow()
                    .as_ref()
                    .map(|ui| ui.pad.ink.to_data_url())
                    .transpose()
            })?;
            let image = data_url.unwrap_or_default();
            let image = image.strip_prefix(PNG_PREFIX).unwrap_or(&image).to_string();
            let Some(config) = config() else {
                return Ok(());
            };
            log::info!("judging '{glyph}'");
            spawn_local(async move {
                let result = ai::judge_handwriting(&config, &glyph, &image).await;
                dispatch(Action::Judged { glyph, result });
            });
        }
        Effect::Generate { topic } => {
            let Some(config) = config() else {
                return Ok(());
            };
            spawn_local(async move {
                let result = ai::generate_lesson(&config, &topic).await;
                let id = format!("lesson-ai-{}", js_sys::Date::now() as u64);
                dispatch(Action::Admin(AdminAction::Generated { id, result }));
            });
        }
        Effect::Schedule { timer, after_ms } => schedule(timer, after_ms)?,
        Effect::Download {
            file_name,
            contents,
        } => download(&file_name, &contents)?,
        Effect::PickImportFile => with_ui(|ui| ui.picker.click()),
    }
    Ok(())
}

fn with_ui(f: impl FnOnce(&Ui)) {
    UI.with(|cell| {
        if let Some(ui) = cell.borrow().as_ref() {
            f(ui);
        }
    });
}

fn config() -> Option<AppConfig> {
    APP.with(|cell| cell.borrow().as_ref().map(|app| app.config().clone()))
}

fn persist() {
    APP.with(|app| {
        UI.with(|ui| {
            let app = app.borrow();
            let mut ui = ui.borrow_mut();
            if let (Some(app), Some(ui)) = (app.as_ref(), ui.as_mut()) {
                if let Err(err) = app.store().persist(ui.storage.as_mut()) {
                    log::error!("saving curriculum failed: {err}");
                }
            }
        })
    });
}

fn schedule(timer: Timer, after_ms: i32) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let callback = Closure::once_into_js(move || dispatch(Action::Timer(timer)));
    win.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), after_ms)?;
    Ok(())
}

fn draw_segment(ctx: &CanvasRenderingContext2d, from: Point, to: Point, color: &str, width: f64) {
    let size = f64::from(PAD_SIZE);
    let (x1, y1) = from.to_pixels(size, size);
    let (x2, y2) = to.to_pixels(size, size);
    if from == to {
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        if ctx.arc(x1, y1, width / 2.0, 0.0, std::f64::consts::TAU).is_ok() {
            ctx.fill();
        }
        return;
    }
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.stroke();
}

fn clear(ctx: &CanvasRenderingContext2d) {
    let size = f64::from(PAD_SIZE);
    ctx.clear_rect(0.0, 0.0, size, size);
}

fn stop_replay() {
    let handle = REPLAY.with(|cell| cell.borrow().as_ref().map(|r| r.handle));
    if let (Some(handle), Some(win)) = (handle, window()) {
        win.clear_interval_with_handle(handle);
    }
}

/// Animate one recorded stroke point by point on the overlay canvas.
fn play_demo(stroke: &Stroke) -> Result<(), JsValue> {
    stop_replay();
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let step_ms = UI.with(|cell| cell.borrow().as_ref().map(|ui| ui.replay_step_ms));
    let Some(step_ms) = step_ms else {
        return Ok(());
    };
    let mut replay = Replay::new(stroke);
    let tick = Closure::wrap(Box::new(move || match replay.next_segment() {
        Some((from, to)) => with_ui(|ui| {
            draw_segment(&ui.pad.demo_ctx, from, to, DEMO_INK, ui.line_width);
        }),
        None => {
            stop_replay();
            dispatch(Action::DemoFinished);
        }
    }) as Box<dyn FnMut()>);
    let handle = win.set_interval_with_callback_and_timeout_and_arguments_0(
        tick.as_ref().unchecked_ref(),
        step_ms,
    )?;
    REPLAY.with(|cell| {
        cell.replace(Some(ReplayTimer {
            handle,
            _tick: tick,
        }))
    });
    Ok(())
}

fn download(file_name: &str, contents: &str) -> Result<(), JsValue> {
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    let anchor: HtmlAnchorElement = doc.create_element("a")?.dyn_into()?;
    let encoded: String = js_sys::encode_uri_component(contents).into();
    anchor.set_href(&format!("data:application/json;charset=utf-8,{encoded}"));
    anchor.set_download(file_name);
    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    log::info!("exported curriculum as {file_name}");
    Ok(())
}

fn canvas(doc: &Document, id: &str, style: &str) -> Result<HtmlCanvasElement, JsValue> {
    let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    c.set_id(id);
    c.set_width(PAD_SIZE);
    c.set_height(PAD_SIZE);
    c.set_attribute("style", style)?;
    Ok(c)
}

fn context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    Ok(canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?)
}

fn create_pad(doc: &Document) -> Result<Surfaces, JsValue> {
    let host: HtmlElement = doc.create_element("div")?.dyn_into()?;
    host.set_id("rb-pad");
    host.set_attribute(
        "style",
        "position:absolute; inset:0; touch-action:none; user-select:none;",
    )?;
    let ink = canvas(
        doc,
        "rb-ink",
        "position:absolute; inset:0; width:100%; height:100%; cursor:crosshair;",
    )?;
    // The demonstration overlay must not swallow pointer input meant for the ink layer.
    let demo = canvas(
        doc,
        "rb-demo",
        "position:absolute; inset:0; width:100%; height:100%; pointer-events:none;",
    )?;
    host.append_child(&ink)?;
    host.append_child(&demo)?;
    let ink_ctx = context(&ink)?;
    let demo_ctx = context(&demo)?;
    Ok(Surfaces {
        host,
        ink,
        ink_ctx,
        demo_ctx,
    })
}

fn create_picker(doc: &Document, root: &Element) -> Result<HtmlInputElement, JsValue> {
    let input: HtmlInputElement = doc.create_element("input")?.dyn_into()?;
    input.set_id("rb-import");
    input.set_type("file");
    input.set_accept("application/json,.json");
    input.set_attribute("style", "display:none;")?;
    root.append_child(&input)?;

    let picker = input.clone();
    let closure = Closure::wrap(Box::new(move |_evt: Event| {
        let Some(file) = picker.files().and_then(|files| files.get(0)) else {
            return;
        };
        picker.set_value("");
        spawn_local(async move {
            match JsFuture::from(file.text()).await {
                Ok(text) => match text.as_string() {
                    Some(text) => dispatch(Action::Admin(AdminAction::Import(text))),
                    None => log::error!("import file is not text"),
                },
                Err(err) => log::error!("cannot read import file: {err:?}"),
            }
        });
    }) as Box<dyn FnMut(_)>);
    input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(input)
}

fn action_element(evt: &Event) -> Option<Element> {
    let target: Element = evt.target()?.dyn_into().ok()?;
    target.closest("[data-action]").ok().flatten()
}

fn dispatch_element(el: &Element, value: Option<String>) {
    let Some(name) = el.get_attribute("data-action") else {
        return;
    };
    let arg = el.get_attribute("data-arg");
    let event = DomEvent {
        action: &name,
        arg: arg.as_deref(),
        value,
        now_ms: js_sys::Date::now(),
    };
    match event.to_action() {
        Some(action) => dispatch(action),
        None => log::debug!("unhandled data-action '{name}'"),
    }
}

fn attach_screen_listeners(screen: &HtmlElement) -> Result<(), JsValue> {
    // Buttons
    {
        let closure = Closure::wrap(Box::new(move |evt: Event| {
            let Some(el) = action_element(&evt) else {
                return;
            };
            if el.tag_name().eq_ignore_ascii_case("input") {
                return;
            }
            dispatch_element(&el, None);
        }) as Box<dyn FnMut(_)>);
        screen.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Text inputs, on every keystroke
    {
        let closure = Closure::wrap(Box::new(move |evt: Event| {
            let Some(el) = action_element(&evt) else {
                return;
            };
            let Ok(input) = el.dyn_into::<HtmlInputElement>() else {
                return;
            };
            if input.type_() != "checkbox" {
                dispatch_element(&input, Some(input.value()));
            }
        }) as Box<dyn FnMut(_)>);
        screen.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Checkboxes
    {
        let closure = Closure::wrap(Box::new(move |evt: Event| {
            let Some(el) = action_element(&evt) else {
                return;
            };
            let Ok(input) = el.dyn_into::<HtmlInputElement>() else {
                return;
            };
            if input.type_() == "checkbox" {
                dispatch_element(&input, Some(input.checked().to_string()));
            }
        }) as Box<dyn FnMut(_)>);
        screen.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Enter submits the passcode and topic dialogs
    {
        let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            if evt.key() != "Enter" {
                return;
            }
            let id = evt
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .map(|el| el.id())
                .unwrap_or_default();
            match id.as_str() {
                "rb-passcode" => dispatch(Action::SubmitPasscode),
                "rb-topic" => dispatch(Action::Admin(AdminAction::Generate)),
                _ => {}
            }
        }) as Box<dyn FnMut(_)>);
        screen.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// Pointer position normalized against the canvas' displayed size.
fn pad_point(canvas: &HtmlCanvasElement, evt: &PointerEvent) -> Point {
    Point::from_pixels(
        f64::from(evt.offset_x()),
        f64::from(evt.offset_y()),
        f64::from(canvas.client_width()),
        f64::from(canvas.client_height()),
    )
}

fn attach_pad_listeners(ink: &HtmlCanvasElement) -> Result<(), JsValue> {
    {
        let canvas = ink.clone();
        let closure = Closure::wrap(Box::new(move |evt: PointerEvent| {
            evt.prevent_default();
            // Keep receiving moves when the finger leaves the canvas mid-stroke.
            let _ = canvas.set_pointer_capture(evt.pointer_id());
            dispatch(Action::PadDown(pad_point(&canvas, &evt)));
        }) as Box<dyn FnMut(_)>);
        ink.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let canvas = ink.clone();
        let closure = Closure::wrap(Box::new(move |evt: PointerEvent| {
            dispatch(Action::PadMove(pad_point(&canvas, &evt)));
        }) as Box<dyn FnMut(_)>);
        ink.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    for name in ["pointerup", "pointercancel"] {
        let closure = Closure::wrap(Box::new(move |_evt: PointerEvent| {
            dispatch(Action::PadUp);
        }) as Box<dyn FnMut(_)>);
        ink.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}
