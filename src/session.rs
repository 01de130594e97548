use crate::content::{ContentKind, FileHandle, ModerationRequest, ModerationResult, Payload};
use crate::validate::{self, ValidationError};

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Result(ModerationResult),
    Error(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BeginError {
    #[error("A moderation request is already in progress")]
    Busy,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Ephemeral per-session state. Result and error share one slot so they can
/// never both be set.
#[derive(Debug)]
pub struct Session {
    active_tab: ContentKind,
    text: String,
    files: std::collections::HashMap<ContentKind, FileHandle>,
    loading: bool,
    outcome: Option<Outcome>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            active_tab: ContentKind::Text,
            text: String::new(),
            files: std::collections::HashMap::new(),
            loading: false,
            outcome: None,
        }
    }

    pub fn active_tab(&self) -> ContentKind {
        self.active_tab
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn result(&self) -> Option<&ModerationResult> {
        match &self.outcome {
            Some(Outcome::Result(r)) => Some(r),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Error(e)) => Some(e),
            _ => None,
        }
    }

    pub fn file(&self, kind: ContentKind) -> Option<&FileHandle> {
        self.files.get(&kind)
    }

    /// `N/5000 characters`.
    pub fn char_counter(&self) -> String {
        format!("{}/{} characters", validate::char_count(&self.text), validate::MAX_TEXT_CHARS)
    }

    /// Clears the outcome; file slots for every kind are left alone.
    pub fn switch_tab(&mut self, kind: ContentKind) {
        self.active_tab = kind;
        self.outcome = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.outcome = Some(Outcome::Error(message.into()));
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// A rejected file is not stored and the previous selection stays.
    pub fn select_file(&mut self, kind: ContentKind, file: FileHandle) -> Result<(), ValidationError> {
        if let Err(e) = validate::validate_file(kind, &file) {
            log::info!("rejected {} for {}: {}", file.name, kind, e);
            self.set_error(e.to_string());
            return Err(e);
        }
        self.files.insert(kind, file);
        if let Some(Outcome::Error(..)) = self.outcome {
            self.outcome = None;
        }
        Ok(())
    }

    fn build_request(&self, kind: ContentKind) -> Result<ModerationRequest, ValidationError> {
        let payload = if kind.is_file() {
            let file = self.files.get(&kind).ok_or(ValidationError::MissingFile(kind))?;
            validate::validate_file(kind, file)?;
            Payload::File(file.clone())
        } else {
            validate::validate_text(&self.text)?;
            Payload::Text(self.text.clone())
        };
        Ok(ModerationRequest { kind, payload })
    }

    /// Starts a request for the active tab: validates, flips `loading` on and
    /// clears the previous outcome. Validation failures become the error and
    /// nothing is dispatched.
    pub fn begin(&mut self) -> Result<ModerationRequest, BeginError> {
        if self.loading {
            return Err(BeginError::Busy);
        }

        match self.build_request(self.active_tab) {
            Ok(req) => {
                self.loading = true;
                self.outcome = None;
                Ok(req)
            }
            Err(e) => {
                self.set_error(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn complete(&mut self, outcome: Result<ModerationResult, String>) {
        self.outcome = Some(match outcome {
            Ok(result) => Outcome::Result(result),
            Err(message) => Outcome::Error(message),
        });
        self.loading = false;
    }
}
