use quick_xml::escape::escape;

use crate::core::item::{ItemProcessor, ItemProcessorResult};
use crate::fias::table::TableSchema;
use crate::item::dbf::{DELETED_FIELD, DbfRecord, FieldEncoder};

/// Serializes one record as a self-closing element of `table`.
///
/// Fields are emitted as upper-cased attributes in record order. Empty values and the
/// deletion marker are left out. Values are written verbatim unless `escape_values` is
/// set: FIAS data is not expected to contain `"`, `<` or `&`.
pub fn serialize_record(
    table: &TableSchema,
    record: &DbfRecord,
    encoder: &FieldEncoder,
    escape_values: bool,
) -> String {
    let mut element = String::with_capacity(64);
    element.push('<');
    element.push_str(table.item());

    for field in record.iter() {
        let name = field.name.to_uppercase();
        let value = encoder.encode(&field.value);

        if value.is_empty() || name == DELETED_FIELD {
            continue;
        }

        element.push(' ');
        element.push_str(&name);
        element.push_str("=\"");
        if escape_values {
            element.push_str(&escape(value.as_str()));
        } else {
            element.push_str(&value);
        }
        element.push('"');
    }

    element.push_str(" />");
    element
}

/// [`ItemProcessor`] turning DBF records of one table into XML elements.
///
/// # Examples
///
/// ```
/// use fias_dbf2xml::core::item::ItemProcessor;
/// use fias_dbf2xml::fias::table;
/// use fias_dbf2xml::item::dbf::DbfRecord;
/// use fias_dbf2xml::item::xml::XmlItemProcessor;
///
/// let processor = XmlItemProcessor::new(table::lookup("SOCRBASE").unwrap());
/// let record = DbfRecord::new()
///     .with_field("level", "1")
///     .with_field("scname", "   ")
///     .with_field("deleted", "0");
///
/// assert_eq!(
///     processor.process(&record).unwrap(),
///     r#"<AddressObjectType LEVEL="1" />"#
/// );
/// ```
pub struct XmlItemProcessor {
    table: &'static TableSchema,
    encoder: FieldEncoder,
    escape_values: bool,
}

impl XmlItemProcessor {
    pub fn new(table: &'static TableSchema) -> Self {
        Self {
            table,
            encoder: FieldEncoder::default(),
            escape_values: false,
        }
    }

    pub fn encoder(mut self, encoder: FieldEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Escapes XML special characters in attribute values.
    pub fn escape_values(mut self, escape_values: bool) -> Self {
        self.escape_values = escape_values;
        self
    }
}

impl ItemProcessor<DbfRecord, String> for XmlItemProcessor {
    fn process(&self, item: &DbfRecord) -> ItemProcessorResult<String> {
        Ok(serialize_record(
            self.table,
            item,
            &self.encoder,
            self.escape_values,
        ))
    }
}
