//! Spoken pronunciation through the browser's speech synthesis.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{SpeechSynthesisUtterance, SpeechSynthesisVoice, window};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpeechLang {
    #[default]
    Cantonese,
    Mandarin,
}

impl SpeechLang {
    /// BCP 47 tag handed to the synthesizer.
    pub fn tag(self) -> &'static str {
        match self {
            SpeechLang::Cantonese => "zh-HK",
            SpeechLang::Mandarin => "zh-CN",
        }
    }

    /// Mandarin for `zh-CN`, Cantonese for anything else.
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("zh-CN") {
            SpeechLang::Mandarin
        } else {
            SpeechLang::Cantonese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeechLang::Cantonese => "粵語",
            SpeechLang::Mandarin => "普通話",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SpeechLang::Cantonese => SpeechLang::Mandarin,
            SpeechLang::Mandarin => SpeechLang::Cantonese,
        }
    }
}

/// Speak `text`, cancelling anything still being spoken. Failures are only logged.
pub fn speak(text: &str, lang: SpeechLang) {
    if text.is_empty() {
        return;
    }
    if let Err(err) = try_speak(text, lang) {
        log::error!("speech synthesis failed: {err:?}");
    }
}

fn try_speak(text: &str, lang: SpeechLang) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let synth = win.speech_synthesis()?;
    synth.cancel();

    let utterance = SpeechSynthesisUtterance::new_with_text(text)?;
    utterance.set_lang(lang.tag());
    // Some mobile browsers ignore `lang` unless a matching voice is set explicitly.
    for voice in synth.get_voices().iter() {
        let Ok(voice) = voice.dyn_into::<SpeechSynthesisVoice>() else {
            continue;
        };
        if voice.lang().contains(lang.tag()) {
            utterance.set_voice(Some(&voice));
            break;
        }
    }
    utterance.set_volume(1.0);
    utterance.set_rate(1.0);
    synth.speak(&utterance);
    Ok(())
}
