use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("File {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot read file {}", .0.display())]
    Unreadable(PathBuf),

    #[error("No known tables found for {}", .0.display())]
    NoInput(PathBuf),

    #[error("DBF open failed: {0}")]
    ReaderOpen(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Step {name} failed: {source}")]
    Step {
        name: String,
        #[source]
        source: Box<BatchError>,
    },
}

impl BatchError {
    /// Tells whether the error comes from resolving the input path, in which case
    /// the command line usage is worth printing again.
    pub fn is_input_error(&self) -> bool {
        matches!(self, BatchError::NotFound(_) | BatchError::Unreadable(_))
    }
}
