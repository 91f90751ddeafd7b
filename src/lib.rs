#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # FIAS DBF to XML

 Converts the DBF distribution of the FIAS address register into the XML layout of
 the register's XML distribution: one `AS_<TABLE>.XML` document per table, each record
 written as a self-closing element whose attributes are the record fields.

 The conversion is a batch job built from small pieces:

- **ItemReader:** [`item::dbf::DbfItemReader`] reads the records of one DBF file.
- **ItemProcessor:** [`item::xml::XmlItemProcessor`] decodes field values from the
  table code page (CP866) and serializes a record as an XML element.
- **ItemWriter:** [`item::xml::XmlTableWriter`] streams elements into the document of
  their table, held by an [`item::xml::XmlChannelRegistry`] shared by every file of
  the run, so regional and delta files (`HOUSE01.DBF`, `HOUSE02.DBF`) share one output.
- **Step:** [`core::step::StepInstance`] drives reader, processor and writer chunk by
  chunk for one file.
- **Job:** [`fias::ConversionJob`] finds the tables, runs one step per file and closes
  every document at the end.

 ## Getting Started

```no_run
use fias_dbf2xml::{core::job::Job, error::BatchError, fias::ConversionJobBuilder};

fn main() -> Result<(), BatchError> {
    let job = ConversionJobBuilder::new()
        .source("fias_dbf")
        .output_dir("fias_xml")
        .build();

    let report = job.run()?;

    for output in &report.outputs {
        println!("{}: {} items", output.file_name, output.item_count);
    }

    Ok(())
}
```

 Attribute values are written verbatim, as the FIAS data does not contain XML
 special characters. Use [`fias::ConversionJobBuilder::escape_values`] to escape them
 anyway.
 */

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// FIAS tables, input discovery and the conversion job
pub mod fias;

/// Set of items readers / writers
pub mod item;
