use crate::content::{ContentKind, ModerationRequest, ModerationResult};
use crate::service::Error;

pub mod remote;
pub mod simulated;

const fn timeout_secs_default() -> u64 {
    30
}

#[async_trait::async_trait]
pub trait Classifier {
    async fn classify(&self, req: &ModerationRequest) -> Result<ModerationResult, Error>;
    fn request_timeout(&self) -> std::time::Duration;
}

pub type BoxClassifier = Box<dyn Classifier + Send + Sync>;

/// Kinds without a real backend fall back to the simulated classifier.
pub fn default_type(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Text | ContentKind::Image => "remote",
        ContentKind::Document | ContentKind::Video => "simulated",
    }
}

pub fn new_classifier_from_config(
    kind: ContentKind,
    typ: &str,
    config: toml::Value,
    api_url: &str,
) -> Result<BoxClassifier, anyhow::Error> {
    Ok(match typ {
        "remote" => {
            let config = config.try_into()?;
            Box::new(remote::Classifier::new(&config, api_url)?)
        }
        "simulated" => {
            let config = config.try_into()?;
            Box::new(simulated::Classifier::new(kind, &config))
        }
        _ => {
            return Err(anyhow::format_err!("unknown classifier type for {}: {}", kind, typ));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_kind() {
        assert_eq!(default_type(ContentKind::Text), "remote");
        assert_eq!(default_type(ContentKind::Image), "remote");
        assert_eq!(default_type(ContentKind::Document), "simulated");
        assert_eq!(default_type(ContentKind::Video), "simulated");
    }

    #[test]
    fn test_factory_reads_timeout() {
        let config: toml::Value = toml::from_str("timeout_secs = 5").unwrap();
        let classifier = new_classifier_from_config(ContentKind::Text, "remote", config, "http://localhost").unwrap();
        assert_eq!(classifier.request_timeout(), std::time::Duration::from_secs(5));

        let classifier =
            new_classifier_from_config(ContentKind::Video, "simulated", toml::Value::Table(Default::default()), "").unwrap();
        assert_eq!(classifier.request_timeout(), std::time::Duration::from_secs(30));
    }

    #[test]
    fn test_factory_rejects_unknown_type() {
        let err = new_classifier_from_config(ContentKind::Text, "oracle", toml::Value::Table(Default::default()), "")
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "unknown classifier type for text: oracle");
    }
}
