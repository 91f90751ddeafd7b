/// XML output of FIAS tables.
///
/// Each record becomes one self-closing element whose attributes are the record
/// fields ([`XmlItemProcessor`]). Elements are streamed into one document per table
/// ([`XmlChannelRegistry`]), so regional and delta files of a table share an output.
///
/// The resulting documents look like:
///
/// ```text
/// <?xml version="1.0" encoding="utf-8"?><Houses><House HOUSENUM="1" /><House HOUSENUM="2" /></Houses>
/// ```
///
/// preceded by a UTF-8 byte-order mark.
pub mod xml_processor;
pub mod xml_writer;

pub use xml_processor::{XmlItemProcessor, serialize_record};
pub use xml_writer::{ChannelSummary, DirectoryTarget, OutputTarget, XmlChannelRegistry, XmlTableWriter};
