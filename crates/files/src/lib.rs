//! File repository domain: metadata records, kind detection and the ports for
//! metadata persistence and byte storage.

pub mod kind;
pub mod record;
pub mod repository;
pub mod storage;

pub use kind::FileKind;
pub use record::{FileRecord, FileRecordProps};
pub use repository::FileRepository;
pub use storage::{FileStorage, StorageError, StoredFile};
