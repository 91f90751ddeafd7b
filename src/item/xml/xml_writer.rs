use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};

use crate::core::item::{ItemWriter, ItemWriterResult};
use crate::error::BatchError;
use crate::fias::table::TableSchema;

/// Creates the sinks output channels write to.
pub trait OutputTarget {
    type Output: Write;

    /// Creates (or truncates) the output named `file_name`.
    fn create(&self, file_name: &str) -> io::Result<Self::Output>;
}

impl<T: OutputTarget + ?Sized> OutputTarget for &T {
    type Output = T::Output;

    fn create(&self, file_name: &str) -> io::Result<Self::Output> {
        (**self).create(file_name)
    }
}

/// Writes output files into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for DirectoryTarget {
    /// The current working directory.
    fn default() -> Self {
        Self::new(".")
    }
}

impl OutputTarget for DirectoryTarget {
    type Output = File;

    fn create(&self, file_name: &str) -> io::Result<File> {
        File::create(self.dir.join(file_name))
    }
}

/// What a finalized channel produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
    pub file_name: String,
    pub item_count: usize,
}

/// One output document being built: header already written, closing tag owed.
struct OutputChannel<W: Write> {
    writer: Writer<BufWriter<W>>,
    container: &'static str,
    item_count: usize,
}

impl<W: Write> OutputChannel<W> {
    fn initialize(output: W, table: &TableSchema) -> Result<Self, BatchError> {
        let mut writer = Writer::new(BufWriter::new(output));

        writer
            .write_bom()
            .map_err(|e| BatchError::ItemWriter(format!("Failed to write BOM: {}", e)))?;
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| {
                BatchError::ItemWriter(format!("Failed to write XML declaration: {}", e))
            })?;
        writer
            .write_event(Event::Start(BytesStart::new(table.container())))
            .map_err(|e| BatchError::ItemWriter(format!("Failed to write XML root: {}", e)))?;

        Ok(OutputChannel {
            writer,
            container: table.container(),
            item_count: 0,
        })
    }

    fn append(&mut self, element: &str) -> Result<(), BatchError> {
        self.writer
            .get_mut()
            .write_all(element.as_bytes())
            .map_err(|e| BatchError::ItemWriter(format!("Failed to write XML item: {}", e)))?;
        self.item_count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BatchError> {
        self.writer
            .get_mut()
            .flush()
            .map_err(|e| BatchError::ItemWriter(format!("Failed to flush XML file: {}", e)))
    }

    fn finalize(mut self) -> Result<usize, BatchError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(self.container)))
            .map_err(|e| BatchError::ItemWriter(format!("Failed to write XML end: {}", e)))?;
        self.flush()?;
        Ok(self.item_count)
    }
}

/// Streams items of many tables into one XML document per table.
///
/// A channel is opened the first time a table is written to: the output file is
/// created and receives a UTF-8 BOM, the XML declaration and the container start tag.
/// Later writes append to the same channel, so several input files of one table end up
/// in a single document. [`XmlChannelRegistry::finalize`] appends every owed container
/// end tag; it consumes the registry, so each channel is closed exactly once.
/// Tables never written to produce no file.
///
/// # Examples
///
/// ```
/// use fias_dbf2xml::fias::table;
/// use fias_dbf2xml::item::xml::{DirectoryTarget, XmlChannelRegistry};
///
/// let dir = tempfile::tempdir().unwrap();
/// let channels = XmlChannelRegistry::new(DirectoryTarget::new(dir.path()));
/// let houses = table::lookup("HOUSE").unwrap();
///
/// channels.write(houses, r#"<House HOUSENUM="1" />"#).unwrap();
/// channels.write(houses, r#"<House HOUSENUM="2" />"#).unwrap();
/// let summaries = channels.finalize().unwrap();
///
/// assert_eq!(summaries[0].file_name, "AS_HOUSE.XML");
/// let content = std::fs::read(dir.path().join("AS_HOUSE.XML")).unwrap();
/// assert!(content.ends_with(b"<House HOUSENUM=\"2\" /></Houses>"));
/// ```
pub struct XmlChannelRegistry<T: OutputTarget = DirectoryTarget> {
    target: T,
    channels: RefCell<BTreeMap<String, OutputChannel<T::Output>>>,
}

impl<T: OutputTarget> XmlChannelRegistry<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            channels: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Appends `element` to the document of `table`, opening it on first use.
    pub fn write(&self, table: &TableSchema, element: &str) -> ItemWriterResult {
        let file_name = table.output_file_name();
        let mut channels = self.channels.borrow_mut();

        if !channels.contains_key(&file_name) {
            let output = self.target.create(&file_name).map_err(|e| {
                BatchError::ItemWriter(format!("Failed to create {}: {}", file_name, e))
            })?;
            let channel = OutputChannel::initialize(output, table)?;
            debug!("Opened {}", file_name);
            channels.insert(file_name.clone(), channel);
        }

        match channels.get_mut(&file_name) {
            Some(channel) => channel.append(element),
            None => Err(BatchError::ItemWriter(format!("{} is not open", file_name))),
        }
    }

    /// Pushes buffered items of `table` to its output. Does nothing if the table has
    /// not been written to.
    pub fn flush(&self, table: &TableSchema) -> ItemWriterResult {
        match self.channels.borrow_mut().get_mut(&table.output_file_name()) {
            Some(channel) => channel.flush(),
            None => Ok(()),
        }
    }

    pub fn is_initialized(&self, table: &TableSchema) -> bool {
        self.channels
            .borrow()
            .contains_key(&table.output_file_name())
    }

    /// Number of items appended to the document of `table` so far.
    pub fn item_count(&self, table: &TableSchema) -> usize {
        self.channels
            .borrow()
            .get(&table.output_file_name())
            .map_or(0, |channel| channel.item_count)
    }

    /// Closes every open document with its container end tag.
    pub fn finalize(self) -> Result<Vec<ChannelSummary>, BatchError> {
        let mut summaries = Vec::new();

        for (file_name, channel) in self.channels.into_inner() {
            let item_count = channel.finalize()?;
            info!("{}: {} items written", file_name, item_count);
            summaries.push(ChannelSummary {
                file_name,
                item_count,
            });
        }

        Ok(summaries)
    }
}

/// [`ItemWriter`] feeding serialized items of one table into a shared
/// [`XmlChannelRegistry`].
///
/// Closing the writer only flushes the channel: the document stays open for later
/// input files of the same table until the registry is finalized.
pub struct XmlTableWriter<'a, T: OutputTarget> {
    channels: &'a XmlChannelRegistry<T>,
    table: &'static TableSchema,
}

impl<'a, T: OutputTarget> XmlTableWriter<'a, T> {
    pub fn new(channels: &'a XmlChannelRegistry<T>, table: &'static TableSchema) -> Self {
        Self { channels, table }
    }
}

impl<T: OutputTarget> ItemWriter<String> for XmlTableWriter<'_, T> {
    fn write(&self, items: &[String]) -> ItemWriterResult {
        for item in items {
            self.channels.write(self.table, item)?;
        }
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        self.channels.flush(self.table)
    }

    fn close(&self) -> ItemWriterResult {
        self.flush()
    }
}
