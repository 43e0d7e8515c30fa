//! Entity-to-file projection.
//!
//! Turns fetched records into files on a [`VirtualFs`](crate::vfs::VirtualFs)
//! using the active schema:
//!
//! ```text
//! /{website}/                                  always
//! /{website}/{folder}/                         SubFolders, SingleFolder
//! /{website}/{folder}/{record}/                SubFolders
//!     {record}.{language}.{extension}          one file per attribute
//! ```
//!
//! Each written file is recorded in the [`SaveTracker`](crate::save::SaveTracker)
//! so edits can be pushed back to the same remote field.

mod language;
mod naming;
mod projector;

use thiserror::Error;

use crate::schema::SchemaError;
use crate::vfs::{FsError, VirtualPath};

pub use language::{LanguageMap, DEFAULT_LANGUAGE_CODE};
pub use naming::{file_extension, file_name_with_extension, normalize_file_name};
pub use projector::Projector;

/// Schema entity used for every V2 record.
pub const COMPONENT_ENTITY: &str = "powerpagecomponents";

/// Entity name V2 files are named after.
pub(crate) const COMPONENT_NAMING_ENTITY: &str = "webpage";

/// Body written for attributes with no value.
pub const NO_CONTENT: &str = "";

/// Errors projecting one record.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("record of type '{entity_type}' has no file name")]
    MissingFileName { entity_type: String },

    #[error("entity type '{entity_type}' declares no attributes")]
    MissingAttributes { entity_type: String },

    #[error(transparent)]
    UnknownEntity(#[from] SchemaError),

    #[error("record content is not a JSON object: {0}")]
    InvalidContent(String),

    #[error(transparent)]
    Fs(#[from] FsError),
}

impl ProjectionError {
    pub fn is_missing_file_name(&self) -> bool {
        matches!(self, ProjectionError::MissingFileName { .. })
    }
}

/// A record that failed to project.
#[derive(Debug)]
pub struct ProjectionFailure {
    /// Position in the response list.
    pub index: usize,
    pub error: ProjectionError,
}

/// Outcome of projecting one response.
#[derive(Debug, Default)]
pub struct ProjectionReport {
    /// Records seen in the response.
    pub records: usize,
    /// Paths written, in write order.
    pub written: Vec<VirtualPath>,
    pub failures: Vec<ProjectionFailure>,
}

impl ProjectionReport {
    /// The file to surface to the user.
    pub fn last_written(&self) -> Option<&VirtualPath> {
        self.written.last()
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}
