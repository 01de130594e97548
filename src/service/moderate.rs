use crate::content::{ContentKind, ModerationResult, Verdict};

#[derive(serde::Serialize, Clone, Debug)]
pub struct TextRequest<'a> {
    pub text: &'a str,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Response {
    pub content_id: String,

    #[serde(default)]
    pub content_type: Option<ContentKind>,

    pub verdict: Verdict,
    pub confidence: f64,

    #[serde(default)]
    pub categories: indexmap::IndexMap<String, f64>,

    #[serde(default)]
    pub requires_review: bool,

    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub model: Option<String>,
    pub filename: Option<String>,
    pub frames_analyzed: Option<u32>,
}

impl Response {
    pub fn into_result(self, kind: ContentKind) -> ModerationResult {
        ModerationResult {
            content_id: self.content_id,
            content_type: self.content_type.unwrap_or(kind),
            verdict: self.verdict,
            confidence: self.confidence,
            categories: self.categories,
            requires_review: self.requires_review,
            timestamp: self.timestamp,
            model: self.model,
            filename: self.filename,
            frames_analyzed: self.frames_analyzed,
            simulated: false,
        }
    }
}

/// Shape of a non-2xx body. Anything without a string `error` field falls back
/// to the generic message.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
