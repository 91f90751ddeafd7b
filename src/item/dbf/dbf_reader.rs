use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use log::debug;

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

/// Name of the synthetic field carrying the deletion flag of a row.
pub const DELETED_FIELD: &str = "DELETED";

const FILE_HEADER_LEN: usize = 32;
const FIELD_DESCRIPTOR_LEN: usize = 32;
const HEADER_TERMINATOR: u8 = 0x0D;
const END_OF_FILE: u8 = 0x1A;
const DELETED_FLAG: u8 = b'*';

/// Describes one column of a DBF table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: char,
    pub length: usize,
    pub decimal_count: u8,
}

/// The fixed part of a DBF file: record layout and record count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfHeader {
    pub version: u8,
    pub record_count: u32,
    pub header_length: u16,
    pub record_length: u16,
    pub fields: Vec<FieldDescriptor>,
}

impl DbfHeader {
    fn parse<R: Read>(input: &mut R) -> Result<DbfHeader, BatchError> {
        let mut prefix = [0u8; FILE_HEADER_LEN];
        input
            .read_exact(&mut prefix)
            .map_err(|e| BatchError::ReaderOpen(format!("cannot read DBF header: {}", e)))?;

        let version = prefix[0];
        let record_count = u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]);
        let header_length = u16::from_le_bytes([prefix[8], prefix[9]]);
        let record_length = u16::from_le_bytes([prefix[10], prefix[11]]);

        if (header_length as usize) <= FILE_HEADER_LEN {
            return Err(BatchError::ReaderOpen(format!(
                "invalid DBF header length {}",
                header_length
            )));
        }

        let mut descriptors = vec![0u8; header_length as usize - FILE_HEADER_LEN];
        input
            .read_exact(&mut descriptors)
            .map_err(|e| BatchError::ReaderOpen(format!("cannot read DBF fields: {}", e)))?;

        let mut fields = Vec::new();
        for descriptor in descriptors.chunks(FIELD_DESCRIPTOR_LEN) {
            if descriptor[0] == HEADER_TERMINATOR {
                break;
            }
            if descriptor.len() < FIELD_DESCRIPTOR_LEN {
                return Err(BatchError::ReaderOpen(
                    "truncated DBF field descriptor".to_string(),
                ));
            }

            let name_end = descriptor[..11].iter().position(|b| *b == 0).unwrap_or(11);
            let name = String::from_utf8_lossy(&descriptor[..name_end])
                .trim()
                .to_string();

            fields.push(FieldDescriptor {
                name,
                field_type: descriptor[11] as char,
                length: descriptor[16] as usize,
                decimal_count: descriptor[17],
            });
        }

        let expected_length: usize = 1 + fields.iter().map(|f| f.length).sum::<usize>();
        if expected_length != record_length as usize {
            return Err(BatchError::ReaderOpen(format!(
                "record length {} does not match field layout ({} bytes)",
                record_length, expected_length
            )));
        }

        Ok(DbfHeader {
            version,
            record_count,
            header_length,
            record_length,
            fields,
        })
    }
}

/// One column value of a record, as stored in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfField {
    pub name: String,
    pub value: Vec<u8>,
}

/// A row of a DBF table: field values in column order, followed by the
/// [`DELETED_FIELD`] marker (`1` for soft-deleted rows, `0` otherwise).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbfRecord {
    fields: Vec<DbfField>,
}

impl DbfRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, keeping insertion order.
    pub fn with_field(mut self, name: &str, value: impl Into<Vec<u8>>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &str, value: impl Into<Vec<u8>>) {
        self.fields.push(DbfField {
            name: name.to_string(),
            value: value.into(),
        });
    }

    /// Raw value of the first field whose name matches `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
            .map(|field| field.value.as_slice())
    }

    pub fn is_deleted(&self) -> bool {
        self.get(DELETED_FIELD) == Some(b"1".as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DbfField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Reads the records of a DBF file.
///
/// Records are numbered from 1 to [`DbfItemReader::record_count`]. As an
/// [`ItemReader`], the reader yields them in ascending order; [`DbfItemReader::read_record`]
/// gives random access.
pub struct DbfItemReader<R = File> {
    input: RefCell<BufReader<R>>,
    header: DbfHeader,
    next_index: Cell<u64>,
    position: Cell<u64>,
}

impl<R: Read + Seek> DbfItemReader<R> {
    pub fn header(&self) -> &DbfHeader {
        &self.header
    }

    pub fn record_count(&self) -> u32 {
        self.header.record_count
    }

    /// Reads the record at `index`, counted from 1.
    pub fn read_record(&self, index: u32) -> Result<DbfRecord, BatchError> {
        if index == 0 || index > self.header.record_count {
            return Err(BatchError::ItemReader(format!(
                "record {} out of range 1..={}",
                index, self.header.record_count
            )));
        }

        let record_length = self.header.record_length as u64;
        let offset = self.header.header_length as u64 + (index as u64 - 1) * record_length;
        let mut input = self.input.borrow_mut();

        if self.position.get() != offset {
            input
                .seek(SeekFrom::Start(offset))
                .map_err(|e| BatchError::ItemReader(format!("seek to record {}: {}", index, e)))?;
        }

        let mut buffer = vec![0u8; record_length as usize];
        if let Err(e) = input.read_exact(&mut buffer) {
            // position unknown after a short read, force a seek next time
            self.position.set(u64::MAX);
            return Err(BatchError::ItemReader(format!("read record {}: {}", index, e)));
        }
        self.position.set(offset + record_length);

        self.decode_record(index, &buffer)
    }

    fn decode_record(&self, index: u32, buffer: &[u8]) -> Result<DbfRecord, BatchError> {
        if buffer[0] == END_OF_FILE {
            return Err(BatchError::ItemReader(format!(
                "unexpected end of file at record {}",
                index
            )));
        }

        let mut record = DbfRecord {
            fields: Vec::with_capacity(self.header.fields.len() + 1),
        };

        let mut offset = 1;
        for field in &self.header.fields {
            record.push(&field.name, &buffer[offset..offset + field.length]);
            offset += field.length;
        }

        let deleted: &[u8] = if buffer[0] == DELETED_FLAG { b"1" } else { b"0" };
        record.push(DELETED_FIELD, deleted);

        Ok(record)
    }
}

impl<R: Read + Seek> ItemReader<DbfRecord> for DbfItemReader<R> {
    fn read(&self) -> ItemReaderResult<DbfRecord> {
        let index = self.next_index.get();
        if index > u64::from(self.header.record_count) {
            return Ok(None);
        }

        self.next_index.set(index + 1);
        // bounded by record_count above
        self.read_record(index as u32).map(Some)
    }
}

/// Opens DBF sources.
///
/// # Examples
///
/// ```
/// use fias_dbf2xml::item::dbf::DbfItemReaderBuilder;
/// use std::io::Cursor;
///
/// let result = DbfItemReaderBuilder::new().from_reader(Cursor::new(vec![0u8; 4]));
/// assert!(result.is_err());
/// ```
#[derive(Default)]
pub struct DbfItemReaderBuilder {}

impl DbfItemReaderBuilder {
    pub fn new() -> Self {
        Self {}
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<DbfItemReader<File>, BatchError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| BatchError::ReaderOpen(format!("{}: {}", path.display(), e)))?;

        self.from_reader(file).map_err(|e| match e {
            BatchError::ReaderOpen(message) => {
                BatchError::ReaderOpen(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    pub fn from_reader<R: Read + Seek>(self, rdr: R) -> Result<DbfItemReader<R>, BatchError> {
        let mut input = BufReader::new(rdr);
        let header = DbfHeader::parse(&mut input)?;

        debug!(
            "DBF version {:#04x}: {} records of {} bytes, {} fields",
            header.version,
            header.record_count,
            header.record_length,
            header.fields.len()
        );

        Ok(DbfItemReader {
            position: Cell::new(header.header_length as u64),
            input: RefCell::new(input),
            header,
            next_index: Cell::new(1),
        })
    }
}
