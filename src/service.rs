use crate::content::{ContentKind, FileHandle};

pub mod moderate;

pub const DEFAULT_API_URL: &str = "https://safeguard-ai.safeguardai.workers.dev";

pub struct Client {
    client: reqwest::Client,
    api_url: String,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("service returned {status}: {}", .message.as_deref().unwrap_or("<no error message>"))]
    Service {
        status: reqwest::StatusCode,
        message: Option<String>,
    },

    #[error("serde: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    TimedOut(std::time::Duration),

    #[error("aborted")]
    Aborted,
}

impl Error {
    /// What the user sees for a failed request of the given kind.
    pub fn user_message(&self, kind: ContentKind) -> String {
        match self {
            Error::Service { message: Some(message), .. } if !message.is_empty() => message.clone(),
            Error::TimedOut(..) => "Moderation request timed out".to_string(),
            Error::Aborted => "Moderation request aborted".to_string(),
            _ => format!("Failed to moderate {}", kind),
        }
    }
}

impl Client {
    pub fn new(api_url: impl AsRef<str>) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, reqwest::header::HeaderValue::from_static("application/json"));
        Ok(Self {
            client: reqwest::ClientBuilder::new().default_headers(headers).build()?,
            api_url: api_url.as_ref().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, kind: ContentKind) -> String {
        format!("{}/moderate/{}", self.api_url, kind)
    }

    async fn do_request(&self, req: reqwest::RequestBuilder) -> Result<moderate::Response, Error> {
        let resp = req.send().await.map_err(|e| e.without_url())?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.map_err(|e| e.without_url())?;
            let message = serde_json::from_slice::<moderate::ErrorResponse>(&body)
                .ok()
                .map(|e| e.error)
                .filter(|m| !m.is_empty());
            log::warn!("moderation service returned {}: {:?}", status, String::from_utf8_lossy(&body));
            return Err(Error::Service { status, message });
        }

        let body = resp.bytes().await.map_err(|e| e.without_url())?;
        Ok(serde_json::from_slice::<moderate::Response>(&body)?)
    }

    pub async fn moderate_text(&self, text: &str) -> Result<moderate::Response, Error> {
        self.do_request(
            self.client
                .post(self.endpoint(ContentKind::Text))
                .json(&moderate::TextRequest { text }),
        )
        .await
    }

    /// Uploads the file as multipart form data under the `file` field.
    pub async fn moderate_file(&self, kind: ContentKind, file: &FileHandle) -> Result<moderate::Response, Error> {
        let bytes = tokio::fs::read(&file.path).await?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.do_request(self.client.post(self.endpoint(kind)).multipart(form)).await
    }
}
