//! Media kinds and content-type classification

use serde::{Deserialize, Serialize};

/// Coarse content bucket used for permission matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Document,
    /// Animated preview thumbnails. Never produced by classification.
    AnimatedPreview,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
            MediaKind::AnimatedPreview => "animated_preview",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a MIME type onto a [`MediaKind`].
pub trait ContentClassifier: Send + Sync {
    /// `None` means the content type is unusable and must not be admitted.
    fn classify(&self, mime_type: &str) -> Option<MediaKind>;
}

/// Classifies on the discrete (top-level) part of the MIME type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscreteMimeClassifier;

impl DiscreteMimeClassifier {
    fn discrete_type(mime_type: &str) -> Option<String> {
        let (discrete, _subtype) = mime_type.trim().split_once('/')?;
        let discrete = discrete.trim();

        if discrete.is_empty() {
            None
        } else {
            Some(discrete.to_ascii_lowercase())
        }
    }
}

impl ContentClassifier for DiscreteMimeClassifier {
    fn classify(&self, mime_type: &str) -> Option<MediaKind> {
        let kind = match Self::discrete_type(mime_type)?.as_str() {
            "image" => MediaKind::Image,
            "audio" => MediaKind::Audio,
            "video" => MediaKind::Video,
            _ => MediaKind::Document,
        };
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_discrete_types() {
        let classifier = DiscreteMimeClassifier;

        assert_eq!(classifier.classify("image/jpeg"), Some(MediaKind::Image));
        assert_eq!(classifier.classify("image/gif"), Some(MediaKind::Image));
        assert_eq!(classifier.classify("audio/aac"), Some(MediaKind::Audio));
        assert_eq!(classifier.classify("Video/MP4"), Some(MediaKind::Video));
        assert_eq!(
            classifier.classify("application/pdf"),
            Some(MediaKind::Document)
        );
        assert_eq!(classifier.classify("text/x-vcard"), Some(MediaKind::Document));
    }

    #[test]
    fn test_classify_malformed() {
        let classifier = DiscreteMimeClassifier;

        assert_eq!(classifier.classify(""), None);
        assert_eq!(classifier.classify("image"), None);
        assert_eq!(classifier.classify("/png"), None);
    }
}
