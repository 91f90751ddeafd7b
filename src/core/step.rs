use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use log::{debug, error, info};
use uuid::Uuid;

use crate::error::BatchError;

use super::{
    build_name,
    item::{ItemProcessor, ItemReader, ItemWriter},
};

/// Outcome of reading one chunk of items.
#[derive(Debug, PartialEq)]
pub enum ChunkStatus {
    /// The reader is exhausted; the chunk holds the remaining items, possibly none.
    Finished,
    /// The chunk reached its configured size.
    Full,
}

/// Lifecycle of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Starting,
    Started,
    Success,
    ReadError,
    ProcessorError,
    WriteError,
}

/// A sequential phase of a job.
pub trait Step {
    /// Executes the step.
    ///
    /// # Returns
    /// - `Ok(())` when every item was read, processed and written
    /// - `Err(BatchError::Step)` wrapping the error that stopped the step
    fn execute(&self) -> Result<(), BatchError>;

    fn get_name(&self) -> &str;

    fn get_status(&self) -> StepStatus;
}

/// A chunk-oriented step: items are read one by one, processed, and handed to the
/// writer in chunks of `chunk_size` items. The writer is flushed after every chunk.
///
/// Any reader, processor or writer error stops the step.
pub struct StepInstance<'a, R, W> {
    id: Uuid,
    name: String,
    reader: &'a dyn ItemReader<R>,
    processor: &'a dyn ItemProcessor<R, W>,
    writer: &'a dyn ItemWriter<W>,
    chunk_size: usize,
    status: Cell<StepStatus>,
    duration: Cell<Duration>,
    read_count: Cell<usize>,
    write_count: Cell<usize>,
    write_error_count: Cell<usize>,
}

impl<R, W> Step for StepInstance<'_, R, W> {
    fn execute(&self) -> Result<(), BatchError> {
        let start = Instant::now();
        self.status.set(StepStatus::Started);

        info!("Start of step: {}, id: {}", self.name, self.id);

        let result = self.run_chunks();

        let close_result = self.writer.close();

        self.duration.set(start.elapsed());

        let result = match (result, close_result) {
            (Err(err), _) => Err(err),
            (Ok(()), Err(err)) => {
                self.status.set(StepStatus::WriteError);
                Err(err)
            }
            (Ok(()), Ok(())) => {
                self.status.set(StepStatus::Success);
                Ok(())
            }
        };

        info!(
            "End of step: {}, id: {}, status: {:?}, read: {}, written: {}",
            self.name,
            self.id,
            self.status.get(),
            self.read_count.get(),
            self.write_count.get()
        );

        result.map_err(|source| BatchError::Step {
            name: self.name.clone(),
            source: Box::new(source),
        })
    }

    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_status(&self) -> StepStatus {
        self.status.get()
    }
}

impl<R, W> StepInstance<'_, R, W> {
    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_read_count(&self) -> usize {
        self.read_count.get()
    }

    pub fn get_write_count(&self) -> usize {
        self.write_count.get()
    }

    pub fn get_write_error_count(&self) -> usize {
        self.write_error_count.get()
    }

    pub fn get_duration(&self) -> Duration {
        self.duration.get()
    }

    fn run_chunks(&self) -> Result<(), BatchError> {
        self.writer.open().inspect_err(|_| {
            self.status.set(StepStatus::WriteError);
        })?;

        let mut read_items: Vec<R> = Vec::with_capacity(self.chunk_size);

        loop {
            let chunk_status = self.read_chunk(&mut read_items).inspect_err(|_| {
                self.status.set(StepStatus::ReadError);
            })?;

            let processed_items = self.process_chunk(&read_items).inspect_err(|_| {
                self.status.set(StepStatus::ProcessorError);
            })?;

            self.write_chunk(&processed_items).inspect_err(|_| {
                self.status.set(StepStatus::WriteError);
            })?;

            if chunk_status == ChunkStatus::Finished {
                return Ok(());
            }
        }
    }

    fn read_chunk(&self, read_items: &mut Vec<R>) -> Result<ChunkStatus, BatchError> {
        debug!("Start reading chunk");
        read_items.clear();

        loop {
            match self.reader.read() {
                Ok(Some(item)) => {
                    read_items.push(item);
                    self.read_count.set(self.read_count.get() + 1);

                    if read_items.len() == self.chunk_size {
                        debug!("End reading chunk: FULL");
                        return Ok(ChunkStatus::Full);
                    }
                }
                Ok(None) => {
                    debug!("End reading chunk: FINISHED");
                    return Ok(ChunkStatus::Finished);
                }
                Err(err) => {
                    error!("Error occurred during read item: {}", err);
                    return Err(err);
                }
            }
        }
    }

    fn process_chunk(&self, read_items: &[R]) -> Result<Vec<W>, BatchError> {
        debug!("Start processing chunk");
        let mut processed_items = Vec::with_capacity(read_items.len());

        for item in read_items {
            let processed = self.processor.process(item).inspect_err(|err| {
                error!("Error occurred during process item: {}", err);
            })?;
            processed_items.push(processed);
        }

        debug!("End processing chunk");
        Ok(processed_items)
    }

    fn write_chunk(&self, processed_items: &[W]) -> Result<(), BatchError> {
        if processed_items.is_empty() {
            return Ok(());
        }

        debug!("Start writing chunk");

        let result = self
            .writer
            .write(processed_items)
            .and_then(|()| self.writer.flush());

        match result {
            Ok(()) => {
                self.write_count
                    .set(self.write_count.get() + processed_items.len());
                debug!("End writing chunk");
                Ok(())
            }
            Err(err) => {
                self.write_error_count
                    .set(self.write_error_count.get() + processed_items.len());
                error!("ItemWriter error: {}", err);
                Err(err)
            }
        }
    }
}

pub struct StepBuilder<'a, R, W> {
    name: Option<String>,
    reader: Option<&'a dyn ItemReader<R>>,
    processor: Option<&'a dyn ItemProcessor<R, W>>,
    writer: Option<&'a dyn ItemWriter<W>>,
    chunk_size: usize,
}

impl<R, W> Default for StepBuilder<'_, R, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, R, W> StepBuilder<'a, R, W> {
    pub fn new() -> StepBuilder<'a, R, W> {
        Self {
            name: None,
            reader: None,
            processor: None,
            writer: None,
            chunk_size: 1,
        }
    }

    pub fn name(mut self, name: String) -> StepBuilder<'a, R, W> {
        self.name = Some(name);
        self
    }

    pub fn reader(mut self, reader: &'a impl ItemReader<R>) -> StepBuilder<'a, R, W> {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a impl ItemProcessor<R, W>) -> StepBuilder<'a, R, W> {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a impl ItemWriter<W>) -> StepBuilder<'a, R, W> {
        self.writer = Some(writer);
        self
    }

    /// Sets the commit interval. A size of zero is treated as one.
    pub fn chunk(mut self, chunk_size: usize) -> StepBuilder<'a, R, W> {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Builds the step; reader, processor and writer must have been configured.
    pub fn build_processing(self) -> StepInstance<'a, R, W> {
        StepInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            reader: self.reader.expect("Reader is required for building a step"),
            processor: self
                .processor
                .expect("Processor is required for building a step"),
            writer: self.writer.expect("Writer is required for building a step"),
            chunk_size: self.chunk_size,
            status: Cell::new(StepStatus::Starting),
            duration: Cell::new(Duration::ZERO),
            read_count: Cell::new(0),
            write_count: Cell::new(0),
            write_error_count: Cell::new(0),
        }
    }
}
