use crate::content::{ContentKind, FileHandle};

pub const MAX_TEXT_CHARS: usize = 5000;

const MIB: u64 = 1024 * 1024;

const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter some text")]
    EmptyText,

    #[error("Text must be {} characters or fewer", MAX_TEXT_CHARS)]
    TextTooLong,

    #[error("{}", missing_file_message(.0))]
    MissingFile(ContentKind),

    #[error("{}", wrong_type_message(.0))]
    WrongType(ContentKind),

    #[error("{}", too_large_message(.0))]
    TooLarge(ContentKind),
}

fn missing_file_message(kind: &ContentKind) -> &'static str {
    match *kind {
        ContentKind::Image => "Please select an image",
        ContentKind::Document => "Please select a document",
        ContentKind::Video => "Please select a video",
        ContentKind::Text => "Please enter some text",
    }
}

fn wrong_type_message(kind: &ContentKind) -> &'static str {
    match *kind {
        ContentKind::Image => "Please select a valid image file",
        ContentKind::Document => "Please select a PDF, DOC, DOCX, or TXT file",
        ContentKind::Video => "Please select a valid video file",
        ContentKind::Text => "Please enter some text",
    }
}

fn too_large_message(kind: &ContentKind) -> String {
    let noun = match *kind {
        ContentKind::Image => "Image",
        ContentKind::Document => "Document",
        ContentKind::Video => "Video",
        ContentKind::Text => "Text",
    };
    format!("{} must be less than {}MB", noun, size_limit(*kind).unwrap_or(0) / MIB)
}

/// Upper bound on file size, inclusive. Text has none.
pub fn size_limit(kind: ContentKind) -> Option<u64> {
    match kind {
        ContentKind::Text => None,
        ContentKind::Image => Some(10 * MIB),
        ContentKind::Document => Some(20 * MIB),
        ContentKind::Video => Some(50 * MIB),
    }
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    // U+FEFF counts as blank, as it does for JS trim.
    if text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}').is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if char_count(text) > MAX_TEXT_CHARS {
        return Err(ValidationError::TextTooLong);
    }
    Ok(())
}

fn accepts_mime(kind: ContentKind, mime_type: &str) -> bool {
    match kind {
        ContentKind::Text => false,
        ContentKind::Image => mime_type.starts_with("image/"),
        ContentKind::Document => DOCUMENT_MIME_TYPES.contains(&mime_type),
        ContentKind::Video => mime_type.starts_with("video/"),
    }
}

/// Checks the type first, then the size.
pub fn validate_file(kind: ContentKind, file: &FileHandle) -> Result<(), ValidationError> {
    if !accepts_mime(kind, &file.mime_type) {
        return Err(ValidationError::WrongType(kind));
    }
    if let Some(limit) = size_limit(kind) {
        if file.size > limit {
            return Err(ValidationError::TooLarge(kind));
        }
    }
    Ok(())
}
