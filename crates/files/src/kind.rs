use serde::{Deserialize, Serialize};

/// Broad category of an uploaded file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileKind {
    Document,
    Image,
    Video,
    Audio,
    Other,
}

const IMAGE: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];
const VIDEO: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
const AUDIO: &[&str] = &["mp3", "wav", "aac", "ogg", "flac"];
const DOCUMENT: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "md", "csv",
];

impl FileKind {
    /// Detect from the file name's last extension (case-insensitive).
    pub fn detect(file_name: &str) -> Self {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return Self::Other;
        };
        let ext = ext.to_ascii_lowercase();
        let ext = ext.as_str();

        if IMAGE.contains(&ext) {
            Self::Image
        } else if VIDEO.contains(&ext) {
            Self::Video
        } else if AUDIO.contains(&ext) {
            Self::Audio
        } else if DOCUMENT.contains(&ext) {
            Self::Document
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "DOCUMENT",
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Audio => "AUDIO",
            Self::Other => "OTHER",
        }
    }

    /// Inverse of [`FileKind::as_str`]; unknown values map to `Other`.
    pub fn from_stored(value: &str) -> Self {
        match value {
            "DOCUMENT" => Self::Document,
            "IMAGE" => Self::Image,
            "VIDEO" => Self::Video,
            "AUDIO" => Self::Audio,
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn detects_by_extension() {
        assert_eq!(FileKind::detect("logo.PNG"), FileKind::Image);
        assert_eq!(FileKind::detect("demo.final.mp4"), FileKind::Video);
        assert_eq!(FileKind::detect("jingle.flac"), FileKind::Audio);
        assert_eq!(FileKind::detect("contrato.pdf"), FileKind::Document);
        assert_eq!(FileKind::detect("notes.md"), FileKind::Document);
        assert_eq!(FileKind::detect("archive.zip"), FileKind::Other);
        assert_eq!(FileKind::detect("Makefile"), FileKind::Other);
    }

    #[test]
    fn stored_value_round_trips() {
        for kind in [
            FileKind::Document,
            FileKind::Image,
            FileKind::Video,
            FileKind::Audio,
            FileKind::Other,
        ] {
            assert_eq!(FileKind::from_stored(kind.as_str()), kind);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn names_without_a_dot_are_other(name in "[A-Za-z0-9_ -]{0,24}") {
            prop_assert_eq!(FileKind::detect(&name), FileKind::Other);
        }
    }
}
