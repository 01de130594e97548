use crate::content::{ContentKind, ModerationRequest, ModerationResult, Payload, Verdict};
use crate::service;

/// Fabricates a fixed verdict after a delay without contacting any backend.
/// Stands in for kinds the moderation service has no endpoint for.
pub struct Classifier {
    delay: std::time::Duration,
    timeout: std::time::Duration,
}

#[derive(serde::Deserialize)]
pub struct Config {
    delay_ms: Option<u64>,
    #[serde(default = "super::timeout_secs_default")]
    timeout_secs: u64,
}

fn default_delay(kind: ContentKind) -> std::time::Duration {
    std::time::Duration::from_millis(match kind {
        ContentKind::Document => 1500,
        ContentKind::Video => 2000,
        ContentKind::Text | ContentKind::Image => 1000,
    })
}

struct Fixture {
    id_prefix: &'static str,
    confidence: f64,
    categories: &'static [(&'static str, f64)],
    model: &'static str,
    frames_analyzed: Option<u32>,
}

fn fixture(kind: ContentKind) -> Fixture {
    match kind {
        ContentKind::Text => Fixture {
            id_prefix: "txt",
            confidence: 0.96,
            categories: &[("toxic", 0.02), ("hateful", 0.01), ("threatening", 0.01), ("safe", 0.96)],
            model: "Text Classifier (simulated)",
            frames_analyzed: None,
        },
        ContentKind::Image => Fixture {
            id_prefix: "img",
            confidence: 0.95,
            categories: &[("nsfw", 0.03), ("violence", 0.02), ("safe", 0.95)],
            model: "Image Classifier (simulated)",
            frames_analyzed: None,
        },
        ContentKind::Document => Fixture {
            id_prefix: "doc",
            confidence: 0.92,
            categories: &[("toxic", 0.02), ("hateful", 0.01), ("threatening", 0.01), ("explicit", 0.03), ("safe", 0.93)],
            model: "Document Analyzer (simulated)",
            frames_analyzed: None,
        },
        ContentKind::Video => Fixture {
            id_prefix: "vid",
            confidence: 0.88,
            categories: &[("violence", 0.05), ("nsfw", 0.04), ("disturbing", 0.03), ("safe", 0.88)],
            model: "Video Frame Analyzer (simulated)",
            frames_analyzed: Some(24),
        },
    }
}

impl Classifier {
    pub fn new(kind: ContentKind, config: &Config) -> Self {
        Self {
            delay: config.delay_ms.map_or_else(|| default_delay(kind), std::time::Duration::from_millis),
            timeout: std::time::Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait::async_trait]
impl super::Classifier for Classifier {
    async fn classify(&self, req: &ModerationRequest) -> Result<ModerationResult, service::Error> {
        log::warn!("{} moderation is simulated; no backend will be contacted", req.kind);

        let filename = match &req.payload {
            Payload::File(file) => {
                // The file may have vanished since it was picked.
                tokio::fs::metadata(&file.path).await?;
                Some(file.name.clone())
            }
            Payload::Text(..) => None,
        };

        tokio::time::sleep(self.delay).await;

        let fixture = fixture(req.kind);
        let timestamp = chrono::Utc::now();
        Ok(ModerationResult {
            content_id: format!("{}_{}", fixture.id_prefix, timestamp.timestamp_millis()),
            content_type: req.kind,
            verdict: Verdict::Safe,
            confidence: fixture.confidence,
            categories: fixture.categories.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            requires_review: false,
            timestamp,
            model: Some(fixture.model.to_string()),
            filename,
            frames_analyzed: fixture.frames_analyzed,
            simulated: true,
        })
    }

    fn request_timeout(&self) -> std::time::Duration {
        self.timeout
    }
}
