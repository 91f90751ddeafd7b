mod common;

use std::{
    fs,
    io::{self, ErrorKind},
};

use common::{MockFile, XML_HEADER, names};
use fias_dbf2xml::{
    BatchError,
    core::job::Job,
    fias::{ConversionJobBuilder, ConversionState},
    item::xml::OutputTarget,
};
use tempfile::tempdir;

/// Hands out files that refuse every write.
struct ReadOnlyTarget;

impl OutputTarget for ReadOnlyTarget {
    type Output = MockFile;

    fn create(&self, _file_name: &str) -> io::Result<MockFile> {
        let mut file = MockFile::default();
        file.expect_write().returning(|_buf| {
            let err = io::Error::from(ErrorKind::PermissionDenied);
            Result::Err(err)
        });
        file.expect_flush().returning(|| Ok(()));
        Ok(file)
    }
}

#[test]
fn write_failure_aborts_the_run() {
    let source = tempdir().unwrap();
    names(&["A", "B", "C"]).write_to(source.path().join("HOUSE.DBF"));
    names(&["D"]).write_to(source.path().join("HOUSE1.DBF"));

    let job = ConversionJobBuilder::new()
        .source(source.path())
        .target(ReadOnlyTarget)
        .chunk(1)
        .build();

    let result = job.run();

    match result {
        Err(BatchError::Step { name, source }) => {
            assert!(name.ends_with("HOUSE.DBF"));
            assert!(matches!(*source, BatchError::ItemWriter(_)));
        }
        other => panic!("expected step failure, got {:?}", other),
    }
    assert_eq!(job.state(), ConversionState::Failed);
}

#[test]
fn output_directory_must_exist() {
    let source = tempdir().unwrap();
    names(&["A"]).write_to(source.path().join("CENTERST.DBF"));

    let job = ConversionJobBuilder::new()
        .source(source.path())
        .output_dir(source.path().join("missing"))
        .build();

    let result = job.run();

    assert!(matches!(result, Err(BatchError::Step { .. })));
    assert_eq!(job.state(), ConversionState::Failed);
}

#[test]
fn truncated_table_leaves_document_unclosed() {
    let source = tempdir().unwrap();
    let output = tempdir().unwrap();
    names(&["A", "B"])
        .declared_records(3)
        .write_to(source.path().join("CURENTST.DBF"));

    let job = ConversionJobBuilder::new()
        .source(source.path())
        .output_dir(output.path())
        .chunk(1)
        .build();

    let result = job.run();

    match result {
        Err(BatchError::Step { source, .. }) => {
            assert!(matches!(*source, BatchError::ItemReader(_)))
        }
        other => panic!("expected step failure, got {:?}", other),
    }
    drop(job);

    let content = fs::read_to_string(output.path().join("AS_CURENTST.XML")).unwrap();
    assert_eq!(
        content,
        format!(
            "{}<CurrentStatuses><CurrentStatus NAME=\"A\" /><CurrentStatus NAME=\"B\" />",
            XML_HEADER
        )
    );
}

#[test]
fn missing_source_is_not_found() {
    let dir = tempdir().unwrap();
    let job = ConversionJobBuilder::new()
        .source(dir.path().join("nowhere"))
        .output_dir(dir.path())
        .build();

    let result = job.run();

    assert!(matches!(result, Err(ref err @ BatchError::NotFound(_)) if err.is_input_error()));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn directory_of_text_files_is_no_input() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("HOUSE.TXT"), "x").unwrap();
    fs::write(dir.path().join("ADDROBJ.TXT"), "y").unwrap();

    let job = ConversionJobBuilder::new()
        .source(dir.path())
        .output_dir(dir.path())
        .build();

    let result = job.run();

    match result {
        Err(err @ BatchError::NoInput(_)) => {
            assert!(!err.is_input_error());
            assert!(err.to_string().starts_with("No known tables found for"));
        }
        other => panic!("expected no input, got {:?}", other),
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}
