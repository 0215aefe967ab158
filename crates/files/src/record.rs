use chrono::{DateTime, Utc};

use entipedia_core::{Entity, FileId};

use crate::kind::FileKind;

#[derive(Debug, Clone, PartialEq)]
pub struct FileRecordProps {
    pub id: FileId,
    /// Original file name as uploaded.
    pub name: String,
    pub kind: FileKind,
    pub size_in_bytes: u64,
    pub mime_type: String,
    /// Storage-relative path of the bytes.
    pub path: String,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Entity: metadata of one stored file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    props: FileRecordProps,
}

impl FileRecord {
    pub fn from_props(props: FileRecordProps) -> Self {
        Self { props }
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn kind(&self) -> FileKind {
        self.props.kind
    }

    pub fn size_in_bytes(&self) -> u64 {
        self.props.size_in_bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.props.mime_type
    }

    pub fn path(&self) -> &str {
        &self.props.path
    }

    pub fn description(&self) -> Option<&str> {
        self.props.description.as_deref()
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.props.uploaded_at
    }

    pub fn props(&self) -> &FileRecordProps {
        &self.props
    }
}

impl Entity for FileRecord {
    type Id = FileId;

    fn id(&self) -> &Self::Id {
        &self.props.id
    }
}
