/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the capture library and the UI layer.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};

/// Tags every new capture starts with
pub const DEFAULT_TAGS: [&str; 2] = ["new", "capture"];

/// Opaque capture identifier, unique within a library and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureId(pub(crate) u64);

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of media a capture holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    Image,
    Video,
}

impl CaptureKind {
    /// File extensions offered by the picker for this kind
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            CaptureKind::Image => &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "tif", "tiff", "avif"],
            CaptureKind::Video => &["mp4", "m4v", "webm", "mov", "mkv", "avi"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CaptureKind::Image => "Image",
            CaptureKind::Video => "Video",
        }
    }
}

/// The originating file of a capture, kept until a derived source replaces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Where the file was picked from
    pub path: PathBuf,
    /// Detected MIME type
    pub mime: String,
    /// Size in bytes at import time
    pub size: u64,
}

/// Represents a single capture in the library
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// Unique library ID
    pub id: CaptureId,
    /// Display name (the file name on import)
    pub name: String,
    /// Remote URL or self-contained data URI
    pub src: String,
    /// Image or video, fixed at creation
    pub kind: CaptureKind,
    /// Tags in insertion order, no duplicates
    pub tags: Vec<String>,
    /// Originating file, cleared once `src` is replaced by a derived result
    pub file: Option<SourceFile>,
    /// When the capture entered the library
    pub created_at: DateTime<Local>,
}

impl Capture {
    /// Whether the capture matches a search query (name or any tag, case-insensitive)
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }

        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
    }

    /// Apply a partial update, leaving unspecified fields untouched
    pub fn apply(&mut self, update: CaptureUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(src) = update.src {
            self.src = src;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(file) = update.file {
            self.file = file;
        }
    }
}

/// A capture that has been read and encoded but not yet added to a library
#[derive(Debug, Clone, PartialEq)]
pub struct NewCapture {
    pub name: String,
    pub src: String,
    pub kind: CaptureKind,
    pub file: Option<SourceFile>,
}

/// Partial-field update of a capture. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureUpdate {
    pub name: Option<String>,
    pub src: Option<String>,
    pub tags: Option<Vec<String>>,
    /// `Some(None)` clears the originating file
    pub file: Option<Option<SourceFile>>,
}

impl CaptureUpdate {
    /// Replace the source with a redacted result and drop the originating file
    pub fn redacted(src: String) -> Self {
        Self {
            src: Some(src),
            file: Some(None),
            ..Self::default()
        }
    }

    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Whether this update carries no field at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Capture {
        Capture {
            id: CaptureId(7),
            name: "Dashboard.png".to_string(),
            src: "data:image/png;base64,aGVsbG8=".to_string(),
            kind: CaptureKind::Image,
            tags: vec!["UI".to_string(), "Analytics".to_string()],
            file: Some(SourceFile {
                path: PathBuf::from("/tmp/Dashboard.png"),
                mime: "image/png".to_string(),
                size: 5,
            }),
            created_at: Local::now(),
        }
    }

    #[test]
    fn test_matches_name_or_tag_case_insensitive() {
        let capture = sample();
        assert!(capture.matches(""));
        assert!(capture.matches("dash"));
        assert!(capture.matches("ANALY"));
        assert!(capture.matches("ui"));
        assert!(!capture.matches("invoice"));
    }

    #[test]
    fn test_apply_changes_only_given_fields() {
        let original = sample();
        let mut capture = original.clone();

        capture.apply(CaptureUpdate::name("Renamed.png"));

        let expected = Capture {
            name: "Renamed.png".to_string(),
            ..original
        };
        assert_eq!(capture, expected);
    }

    #[test]
    fn test_redacted_update_clears_file() {
        let original = sample();
        let mut capture = original.clone();

        capture.apply(CaptureUpdate::redacted("data:image/png;base64,Ynll".to_string()));

        assert_eq!(capture.src, "data:image/png;base64,Ynll");
        assert_eq!(capture.file, None);
        assert_eq!(capture.id, original.id);
        assert_eq!(capture.name, original.name);
        assert_eq!(capture.kind, original.kind);
        assert_eq!(capture.tags, original.tags);
    }

    #[test]
    fn test_empty_update() {
        assert!(CaptureUpdate::default().is_empty());
        assert!(!CaptureUpdate::tags(vec![]).is_empty());
    }
}
