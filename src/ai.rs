//! Calls to the hosted generative model: handwriting judging and lesson generation.
//!
//! Request bodies and response decoding are plain functions so they can be checked
//! natively; only `post_json` touches `fetch`. Neither call retries or times out.

use serde::{Deserialize, Serialize};
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response, window};

use crate::config::AppConfig;
use crate::curriculum::{Character, Lesson, Phrase};
use crate::error::AiError;

/// Judge's opinion of one drawing (score on a 0-10 scale).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Judgment {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub is_pass: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GeneratedCharacter {
    #[serde(rename = "char")]
    pub glyph: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub jyutping: String,
    #[serde(default)]
    pub meaning: String,
}

/// Lesson content proposed by the model for a topic.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GeneratedLesson {
    pub title: String,
    pub characters: Vec<GeneratedCharacter>,
    #[serde(default)]
    pub phrases: Vec<Phrase>,
}

impl GeneratedLesson {
    /// A new locked lesson; match questions are left for the author.
    pub fn into_lesson(self, id: impl Into<String>, image: impl Into<String>) -> Lesson {
        let mut lesson = Lesson::blank(id, self.title, image);
        lesson.characters = self
            .characters
            .into_iter()
            .enumerate()
            .map(|(i, c)| Character::new(&c.glyph, &c.pinyin, &c.jyutping, &c.meaning, i as u32))
            .collect();
        lesson.phrases = self.phrases;
        lesson
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

pub fn judge_request(glyph: &str, png_base64: &str) -> GenerateRequest {
    let prompt = format!(
        "You are a friendly teacher. Look at this handwritten Chinese character. \
         Does it look like the traditional Chinese character \"{glyph}\"? Even if it is messy \
         (written by a kid), is it recognizable? Answer in JSON format with \"score\" (0-10) \
         and \"isPass\" (boolean)."
    );
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part {
                    text: Some(prompt),
                    inline_data: None,
                },
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: "image/png".into(),
                        data: png_base64.to_string(),
                    }),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: json!({
                "type": "OBJECT",
                "properties": {
                    "score": { "type": "NUMBER" },
                    "isPass": { "type": "BOOLEAN" }
                },
                "required": ["score", "isPass"]
            }),
        },
    }
}

pub fn lesson_request(topic: &str) -> GenerateRequest {
    let prompt = format!(
        "Generate a Traditional Chinese learning lesson for children about the topic: \"{topic}\". \
         The output must be a JSON object with: \
         - title (Chinese and English, e.g. \"海洋生物 (Sea Life)\") \
         - characters (array of 5 objects: {{char, pinyin, jyutping, meaning}}) \
         - phrases (array of 3 objects: {{text, pinyin, jyutping, meaning}})"
    );
    let entry = |key: &str| {
        json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    key: { "type": "STRING" },
                    "pinyin": { "type": "STRING" },
                    "jyutping": { "type": "STRING" },
                    "meaning": { "type": "STRING" }
                },
                "required": [key, "pinyin", "jyutping", "meaning"]
            }
        })
    };
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: Some(prompt),
                inline_data: None,
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: json!({
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "characters": entry("char"),
                    "phrases": entry("text")
                },
                "required": ["title", "characters", "phrases"]
            }),
        },
    }
}

/// The JSON document the model wrote into its first text part.
fn response_text(body: &str) -> Result<String, AiError> {
    let resp: GenerateResponse = serde_json::from_str(body)?;
    resp.candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(AiError::EmptyResponse)
}

pub fn parse_judgment(body: &str) -> Result<Judgment, AiError> {
    Ok(serde_json::from_str(&response_text(body)?)?)
}

pub fn parse_generated_lesson(body: &str) -> Result<GeneratedLesson, AiError> {
    let lesson: GeneratedLesson = serde_json::from_str(&response_text(body)?)?;
    if lesson.title.trim().is_empty() || lesson.characters.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(lesson)
}

pub fn endpoint(config: &AppConfig, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent?key={}",
        config.api_base.trim_end_matches('/'),
        model,
        config.api_key
    )
}

pub async fn judge_handwriting(
    config: &AppConfig,
    glyph: &str,
    png_base64: &str,
) -> Result<Judgment, AiError> {
    let body = serde_json::to_string(&judge_request(glyph, png_base64))?;
    let text = post_json(config, &config.judge_model, &body).await?;
    let judgment = parse_judgment(&text)?;
    log::info!("judge scored '{}' at {} (pass: {})", glyph, judgment.score, judgment.is_pass);
    Ok(judgment)
}

pub async fn generate_lesson(config: &AppConfig, topic: &str) -> Result<GeneratedLesson, AiError> {
    let body = serde_json::to_string(&lesson_request(topic))?;
    let text = post_json(config, &config.generate_model, &body).await?;
    parse_generated_lesson(&text)
}

fn js_err(err: JsValue) -> AiError {
    AiError::Transport(format!("{err:?}"))
}

async fn post_json(config: &AppConfig, model: &str, body: &str) -> Result<String, AiError> {
    if config.api_key.is_empty() {
        return Err(AiError::MissingKey);
    }
    let win = window().ok_or_else(|| AiError::transport("no window"))?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(body));
    let request = Request::new_with_str_and_init(&endpoint(config, model), &opts).map_err(js_err)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(js_err)?;

    log::debug!("POST {model}:generateContent ({} bytes)", body.len());
    let resp: Response = JsFuture::from(win.fetch_with_request(&request))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    if !resp.ok() {
        return Err(AiError::Status(resp.status()));
    }
    JsFuture::from(resp.text().map_err(js_err)?)
        .await
        .map_err(js_err)?
        .as_string()
        .ok_or(AiError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(inner: &str) -> String {
        json!({ "candidates": [ { "content": { "parts": [ { "text": inner } ] } } ] }).to_string()
    }

    #[test]
    fn judge_request_carries_glyph_and_image() {
        let body = serde_json::to_value(judge_request("火", "AAAA")).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("\"火\""));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "AAAA");
        assert!(parts[1].get("text").is_none());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn lesson_schema_requires_glyph_fields() {
        let body = serde_json::to_value(lesson_request("ocean")).unwrap();
        let schema = &body["generationConfig"]["responseSchema"];
        assert_eq!(schema["properties"]["characters"]["items"]["required"][0], "char");
        assert_eq!(schema["properties"]["phrases"]["items"]["required"][0], "text");
    }

    #[test]
    fn judgment_is_read_from_first_text_part() {
        let j = parse_judgment(&wrap(r#"{"score":7,"isPass":true}"#)).unwrap();
        assert_eq!(j, Judgment { score: 7.0, is_pass: true });
    }

    #[test]
    fn empty_candidates_are_an_error() {
        assert!(matches!(
            parse_judgment(r#"{"candidates":[]}"#),
            Err(AiError::EmptyResponse)
        ));
        assert!(matches!(parse_judgment("<html>"), Err(AiError::Decode(_))));
    }

    #[test]
    fn generated_lesson_becomes_locked_lesson() {
        let inner = r#"{"title":"海洋 (Sea)",
            "characters":[{"char":"魚","pinyin":"yú","jyutping":"jyu4","meaning":"Fish"},
                          {"char":"海","pinyin":"hǎi","jyutping":"hoi2","meaning":"Sea"}],
            "phrases":[{"text":"海魚","pinyin":"hǎi yú","jyutping":"hoi2 jyu4","meaning":"Sea fish"}]}"#;
        let generated = parse_generated_lesson(&wrap(inner)).unwrap();
        let lesson = generated.into_lesson("lesson-ai-1", "cover.png");
        assert!(!lesson.unlocked);
        assert!(lesson.enable_phrases && lesson.enable_match);
        assert!(lesson.match_questions.is_empty());
        assert_eq!(lesson.characters[1].order, 1);
        assert!(lesson.characters.iter().all(|c| !c.unlocked));
        assert_eq!(lesson.phrases[0].text, "海魚");
    }

    #[test]
    fn lesson_without_characters_is_rejected() {
        let inner = r#"{"title":"x","characters":[],"phrases":[]}"#;
        assert!(parse_generated_lesson(&wrap(inner)).is_err());
    }

    #[test]
    fn endpoint_includes_model_and_key() {
        let cfg = AppConfig {
            api_key: "secret".into(),
            ..AppConfig::default()
        };
        let url = endpoint(&cfg, "m1");
        assert!(url.ends_with("/models/m1:generateContent?key=secret"));
    }
}
