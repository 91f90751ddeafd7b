use std::{
    cell::Cell,
    path::{Path, PathBuf},
    time::Instant,
};

use log::{error, info};
use uuid::Uuid;

use crate::{
    core::{
        build_name,
        job::{Job, JobExecution, JobResult},
        step::{Step, StepBuilder},
    },
    error::BatchError,
    item::{
        dbf::{DbfItemReaderBuilder, FieldEncoder},
        xml::{
            ChannelSummary, DirectoryTarget, OutputTarget, XmlChannelRegistry, XmlItemProcessor,
            XmlTableWriter,
        },
    },
};

use super::{
    resolver::{self, ResolvedInput},
    table::TableSchema,
};

/// Number of records handed to the writer at once.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Progress of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionState {
    Idle,
    Resolving,
    Converting,
    Finalizing,
    Done,
    Failed,
}

/// Records converted from one input file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub table: &'static TableSchema,
    pub record_count: usize,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct ConversionReport {
    pub execution: JobExecution,
    /// Converted files, in processing order.
    pub files: Vec<FileReport>,
    /// Files that could not be opened as DBF tables.
    pub skipped: Vec<PathBuf>,
    /// Documents written, one per table.
    pub outputs: Vec<ChannelSummary>,
}

/// Converts every FIAS table found at a path into `AS_<TABLE>.XML` documents.
///
/// Files are converted one after the other in the order given by
/// [`resolver::resolve`]. A file that cannot be opened is logged and skipped; any other
/// read or write failure aborts the run and leaves the documents written so far
/// without their closing tag.
pub struct ConversionJob<T: OutputTarget = DirectoryTarget> {
    id: Uuid,
    name: String,
    source: PathBuf,
    target: T,
    encoder: FieldEncoder,
    escape_values: bool,
    chunk_size: usize,
    state: Cell<ConversionState>,
}

impl<T: OutputTarget> Job for ConversionJob<T> {
    type Output = ConversionReport;

    fn run(&self) -> JobResult<ConversionReport> {
        let start = Instant::now();
        info!("Start of job: {}, id: {}", self.name, self.id);

        let result = self.convert();
        if result.is_err() {
            self.state.set(ConversionState::Failed);
        }
        let (files, skipped, outputs) = result?;

        self.state.set(ConversionState::Done);
        info!("End of job: {}, id: {}", self.name, self.id);

        Ok(ConversionReport {
            execution: JobExecution::since(start),
            files,
            skipped,
            outputs,
        })
    }
}

type Converted = (Vec<FileReport>, Vec<PathBuf>, Vec<ChannelSummary>);

impl<T: OutputTarget> ConversionJob<T> {
    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ConversionState {
        self.state.get()
    }

    fn convert(&self) -> Result<Converted, BatchError> {
        self.state.set(ConversionState::Resolving);
        let inputs = resolver::resolve(&self.source)?;

        self.state.set(ConversionState::Converting);
        let channels = XmlChannelRegistry::new(&self.target);
        let mut files = Vec::with_capacity(inputs.len());
        let mut skipped = Vec::new();

        for input in &inputs {
            match self.convert_file(input, &channels)? {
                Some(report) => files.push(report),
                None => skipped.push(input.path.clone()),
            }
        }

        self.state.set(ConversionState::Finalizing);
        let outputs = channels.finalize()?;

        Ok((files, skipped, outputs))
    }

    fn convert_file(
        &self,
        input: &ResolvedInput,
        channels: &XmlChannelRegistry<&T>,
    ) -> Result<Option<FileReport>, BatchError> {
        let reader = match DbfItemReaderBuilder::new().from_path(&input.path) {
            Ok(reader) => reader,
            Err(err) => {
                error!("{}", err);
                return Ok(None);
            }
        };

        info!("{}: {} records", input.path.display(), reader.record_count());

        let processor = XmlItemProcessor::new(input.table)
            .encoder(self.encoder)
            .escape_values(self.escape_values);
        let writer = XmlTableWriter::new(channels, input.table);

        let step = StepBuilder::new()
            .name(input.path.display().to_string())
            .reader(&reader)
            .processor(&processor)
            .writer(&writer)
            .chunk(self.chunk_size)
            .build_processing();

        step.execute()?;

        Ok(Some(FileReport {
            path: input.path.clone(),
            table: input.table,
            record_count: step.get_write_count(),
        }))
    }
}

/// Builder for [`ConversionJob`].
///
/// # Examples
///
/// ```no_run
/// use fias_dbf2xml::core::job::Job;
/// use fias_dbf2xml::fias::ConversionJobBuilder;
///
/// let job = ConversionJobBuilder::new()
///     .source("/data/fias_dbf")
///     .output_dir("/data/fias_xml")
///     .escape_values(true)
///     .build();
///
/// let report = job.run().unwrap();
/// println!("{} documents written", report.outputs.len());
/// ```
pub struct ConversionJobBuilder<T: OutputTarget = DirectoryTarget> {
    name: Option<String>,
    source: PathBuf,
    target: T,
    encoder: FieldEncoder,
    escape_values: bool,
    chunk_size: usize,
}

impl Default for ConversionJobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionJobBuilder {
    /// Source defaults to the current directory, output to the current working
    /// directory, code page to CP866.
    pub fn new() -> Self {
        Self {
            name: None,
            source: PathBuf::from("."),
            target: DirectoryTarget::default(),
            encoder: FieldEncoder::default(),
            escape_values: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.target = DirectoryTarget::new(dir);
        self
    }
}

impl<T: OutputTarget> ConversionJobBuilder<T> {
    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// A DBF file or a directory of DBF files.
    pub fn source<P: AsRef<Path>>(mut self, source: P) -> Self {
        self.source = source.as_ref().to_path_buf();
        self
    }

    /// Where the XML documents are created.
    pub fn target<U: OutputTarget>(self, target: U) -> ConversionJobBuilder<U> {
        ConversionJobBuilder {
            name: self.name,
            source: self.source,
            target,
            encoder: self.encoder,
            escape_values: self.escape_values,
            chunk_size: self.chunk_size,
        }
    }

    pub fn encoder(mut self, encoder: FieldEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn escape_values(mut self, escape_values: bool) -> Self {
        self.escape_values = escape_values;
        self
    }

    pub fn chunk(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn build(self) -> ConversionJob<T> {
        ConversionJob {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            source: self.source,
            target: self.target,
            encoder: self.encoder,
            escape_values: self.escape_values,
            chunk_size: self.chunk_size,
            state: Cell::new(ConversionState::Idle),
        }
    }
}
