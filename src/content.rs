#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Image,
    Document,
    Video,
}

serde_plain::derive_display_from_serialize!(ContentKind);
serde_plain::derive_fromstr_from_deserialize!(ContentKind);

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [ContentKind::Text, ContentKind::Image, ContentKind::Document, ContentKind::Video];

    pub fn is_file(self) -> bool {
        self != ContentKind::Text
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileHandle {
    pub path: std::path::PathBuf,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FileHandle {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{} is not a file", path.display())));
        }

        Ok(Self {
            path: path.to_path_buf(),
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            size: metadata.len(),
            mime_type: mime_guess::from_path(path)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Text(String),
    File(FileHandle),
}

/// A validated unit of work for a classifier. Only the session builds these,
/// after the payload has passed the rule for its kind.
#[derive(Clone, Debug, PartialEq)]
pub struct ModerationRequest {
    pub kind: ContentKind,
    pub payload: Payload,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    Flagged,
}

// Anything the service says other than "safe" is treated as flagged.
impl From<String> for Verdict {
    fn from(s: String) -> Self {
        if s == "safe" {
            Verdict::Safe
        } else {
            Verdict::Flagged
        }
    }
}

impl From<Verdict> for String {
    fn from(v: Verdict) -> Self {
        match v {
            Verdict::Safe => "safe".to_string(),
            Verdict::Flagged => "flagged".to_string(),
        }
    }
}

impl serde::Serialize for Verdict {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from(*self))
    }
}

impl<'de> serde::Deserialize<'de> for Verdict {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(<String as serde::Deserialize>::deserialize(deserializer)?.into())
    }
}

#[derive(serde::Serialize, Clone, Debug, PartialEq)]
pub struct ModerationResult {
    pub content_id: String,
    pub content_type: ContentKind,
    pub verdict: Verdict,
    pub confidence: f64,
    pub categories: indexmap::IndexMap<String, f64>,
    pub requires_review: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_analyzed: Option<u32>,

    pub simulated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        assert_eq!("document".parse::<ContentKind>().unwrap(), ContentKind::Document);
        assert_eq!(ContentKind::Video.to_string(), "video");
        assert!("audio".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_verdict_non_safe_is_flagged() {
        let v: Verdict = serde_json::from_str(r#""safe""#).unwrap();
        assert_eq!(v, Verdict::Safe);
        let v: Verdict = serde_json::from_str(r#""unsafe""#).unwrap();
        assert_eq!(v, Verdict::Flagged);
        let v: Verdict = serde_json::from_str(r#""Safe""#).unwrap();
        assert_eq!(v, Verdict::Flagged);
    }

    #[test]
    fn test_file_handle_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let f = FileHandle::open(&path).unwrap();
        assert_eq!(f.name, "report.pdf");
        assert_eq!(f.size, 8);
        assert_eq!(f.mime_type, "application/pdf");
    }

    #[test]
    fn test_file_handle_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, b"xx").unwrap();

        assert_eq!(FileHandle::open(&path).unwrap().mime_type, "application/octet-stream");
    }

    #[test]
    fn test_file_handle_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileHandle::open(dir.path()).is_err());
    }
}
