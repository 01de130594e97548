use crate::content::{ModerationRequest, ModerationResult, Payload};
use crate::service;

pub struct Classifier {
    client: service::Client,
    timeout: std::time::Duration,
}

#[derive(serde::Deserialize)]
pub struct Config {
    api_url: Option<String>,
    #[serde(default = "super::timeout_secs_default")]
    timeout_secs: u64,
}

impl Classifier {
    pub fn new(config: &Config, default_api_url: &str) -> Result<Self, service::Error> {
        Ok(Self {
            client: service::Client::new(config.api_url.as_deref().unwrap_or(default_api_url))?,
            timeout: std::time::Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait::async_trait]
impl super::Classifier for Classifier {
    async fn classify(&self, req: &ModerationRequest) -> Result<ModerationResult, service::Error> {
        log::info!("remote moderation request: {}", req.kind);

        let resp = match &req.payload {
            Payload::Text(text) => self.client.moderate_text(text).await?,
            Payload::File(file) => self.client.moderate_file(req.kind, file).await?,
        };
        Ok(resp.into_result(req.kind))
    }

    fn request_timeout(&self) -> std::time::Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier as _;
    use crate::content::{ContentKind, FileHandle, Verdict};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_document_goes_to_its_own_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/moderate/document"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content_id": "d1",
                "verdict": "safe",
                "confidence": 0.9,
                "categories": {"safe": 0.9},
                "timestamp": "2024-01-01T00:00:00Z",
                "filename": "memo.txt"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("memo.txt");
        std::fs::write(&file_path, "quarterly numbers").unwrap();

        let classifier = Classifier::new(&Config { api_url: None, timeout_secs: 30 }, &server.uri()).unwrap();
        let result = classifier
            .classify(&ModerationRequest {
                kind: ContentKind::Document,
                payload: Payload::File(FileHandle::open(&file_path).unwrap()),
            })
            .await
            .unwrap();

        assert_eq!(result.content_type, ContentKind::Document);
        assert_eq!(result.verdict, Verdict::Safe);
        assert_eq!(result.filename.as_deref(), Some("memo.txt"));
        assert!(!result.simulated);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let classifier = Classifier::new(&Config { api_url: None, timeout_secs: 30 }, "http://127.0.0.1:9").unwrap();
        let err = classifier
            .classify(&ModerationRequest {
                kind: ContentKind::Image,
                payload: Payload::File(FileHandle {
                    path: "/nonexistent/cat.png".into(),
                    name: "cat.png".to_string(),
                    size: 1,
                    mime_type: "image/png".to_string(),
                }),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, service::Error::Io(..)));
        assert_eq!(err.user_message(ContentKind::Image), "Failed to moderate image");
    }
}
