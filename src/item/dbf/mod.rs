/// DBF support for reading FIAS tables.
///
/// The reader handles dBase III style files: a fixed header describing the columns,
/// followed by fixed-length records each led by a deletion flag. Column values are kept
/// as raw bytes in the table code page; [`FieldEncoder`] turns them into UTF-8 text.
///
/// # Examples
///
/// ```no_run
/// use fias_dbf2xml::core::item::ItemReader;
/// use fias_dbf2xml::item::dbf::{DbfItemReaderBuilder, FieldEncoder};
///
/// let reader = DbfItemReaderBuilder::new().from_path("HOUSE01.DBF").unwrap();
/// let encoder = FieldEncoder::default();
///
/// while let Some(record) = reader.read().unwrap() {
///     for field in record.iter() {
///         println!("{} = {}", field.name, encoder.encode(&field.value));
///     }
/// }
/// ```
pub mod dbf_reader;
pub mod encoding;

pub use dbf_reader::{DELETED_FIELD, DbfField, DbfItemReader, DbfItemReaderBuilder, DbfRecord};
pub use encoding::FieldEncoder;
