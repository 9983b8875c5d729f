// Provider response model
// Only the parts needed to find the inline audio payload are modelled
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub inline_data: Option<InlineData>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

impl InlineData {
    /// Sample rate from a MIME type such as `audio/L16;codec=pcm;rate=24000`.
    pub fn sample_rate(&self) -> Option<u32> {
        self.mime_type
            .split(';')
            .filter_map(|param| param.trim().strip_prefix("rate="))
            .find_map(|rate| rate.trim().parse::<u32>().ok())
            .filter(|rate| *rate > 0)
    }
}

impl SpeechResponse {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// A response carrying `data` as its only part.
    pub fn with_audio(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![Part {
                        inline_data: Some(InlineData {
                            mime_type: mime_type.into(),
                            data: data.into(),
                        }),
                        text: None,
                    }],
                }),
            }],
        }
    }

    /// First part with a non-empty inline payload.
    pub fn inline_audio(&self) -> Option<&InlineData> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.inline_data.as_ref())
            .find(|data| !data.data.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_inline_audio() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "narration" },
                        { "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAH/fw==" } }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 12 }
        }"#;

        let response = SpeechResponse::from_json(json).unwrap();
        let audio = response.inline_audio().unwrap();
        assert_eq!(audio.data, "AAH/fw==");
        assert_eq!(audio.sample_rate(), Some(24000));
    }

    #[test]
    fn test_no_audio() {
        assert!(SpeechResponse::from_json("{}").unwrap().inline_audio().is_none());

        let empty = SpeechResponse::with_audio("audio/L16", "");
        assert!(empty.inline_audio().is_none());

        let no_content = SpeechResponse::from_json(r#"{ "candidates": [{}] }"#).unwrap();
        assert!(no_content.inline_audio().is_none());
    }

    #[test]
    fn test_mime_rate() {
        let with = |mime: &str| InlineData {
            mime_type: mime.to_string(),
            data: String::new(),
        };
        assert_eq!(with("audio/L16; rate=16000").sample_rate(), Some(16000));
        assert_eq!(with("audio/L16;codec=pcm").sample_rate(), None);
        assert_eq!(with("audio/L16;rate=fast").sample_rate(), None);
        assert_eq!(with("audio/L16;rate=0").sample_rate(), None);
        assert_eq!(with("").sample_rate(), None);
    }
}
