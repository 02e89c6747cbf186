use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single file submission: the record id, the text to append, and the
/// object storage path (`bucket/key`) of the previously uploaded file.
///
/// This is both the request body accepted by the file input function and the
/// item shape stored in the metadata table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: String,
    pub input_text: String,
    pub input_file_path: String,
}

/// A field which failed submission validation.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid input. Field {0} must be a non-empty string.")]
pub struct InvalidRecord(pub &'static str);

impl FileRecord {
    /// All three fields must be non-empty: the id keys the table, the text is
    /// the append payload, and the path must point at an uploaded object.
    pub fn validate(&self) -> Result<(), InvalidRecord> {
        if self.id.is_empty() {
            return Err(InvalidRecord("id"));
        }
        if self.input_text.is_empty() {
            return Err(InvalidRecord("input_text"));
        }
        if self.input_file_path.is_empty() {
            return Err(InvalidRecord("input_file_path"));
        }
        Ok(())
    }
}

/// The projection the stream consumer reads from a change record's new image.
/// Only the id is needed to hand a record off to the append worker.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FileRecordKey {
    pub id: String,
}

/// Why a stream image could not provide a usable record key.
#[derive(Debug, Error)]
pub enum ImageDecodeError {
    /// the id attribute is missing or not a string
    #[error(transparent)]
    Decode(#[from] serde_dynamo::Error),
    /// the id attribute is present but empty
    #[error("record image has an empty id")]
    EmptyId,
}

impl FileRecordKey {
    /// Typed decode of a stream image, failing closed when the id is absent,
    /// not a string attribute, or empty.
    pub fn from_image(image: serde_dynamo::Item) -> Result<Self, ImageDecodeError> {
        let key: FileRecordKey = serde_dynamo::from_item(image)?;
        if key.id.is_empty() {
            return Err(ImageDecodeError::EmptyId);
        }
        Ok(key)
    }
}
