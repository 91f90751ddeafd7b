/// The FIAS tables and their XML naming.
pub mod table;

/// Discovery of DBF files holding known tables.
pub mod resolver;

/// The conversion run.
pub mod job;

pub use job::{ConversionJob, ConversionJobBuilder, ConversionReport, ConversionState, FileReport};
pub use resolver::{ResolvedInput, identify_table, resolve};
pub use table::TableSchema;
