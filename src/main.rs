//! Command line front end of the FIAS DBF to XML converter.

use std::{path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser};
use log::info;

use fias_dbf2xml::{
    core::job::Job,
    fias::{ConversionJobBuilder, job::DEFAULT_CHUNK_SIZE},
    item::dbf::FieldEncoder,
};

/// Converts FIAS DBF files to XML.
///
/// Every DBF file of a known FIAS table found at PATH is converted into an
/// AS_<TABLE>.XML document in the output directory.
#[derive(Parser, Debug)]
#[command(name = "fias-dbf2xml", version)]
struct Cli {
    /// A DBF file or a directory holding DBF files
    path: PathBuf,

    /// Directory the XML documents are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Code page of the DBF text fields
    #[arg(short, long, default_value = "cp866")]
    encoding: String,

    /// Escape XML special characters in attribute values
    #[arg(long)]
    escape: bool,

    /// Number of records written at once
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let source = match cli.path.to_str() {
        Some(path) => PathBuf::from(path.trim()),
        None => cli.path.clone(),
    };
    if source.as_os_str().is_empty() {
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::from(2);
    }

    let encoder = match FieldEncoder::for_label(&cli.encoding) {
        Ok(encoder) => encoder,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let job = ConversionJobBuilder::new()
        .name("fias-dbf2xml".to_string())
        .source(&source)
        .output_dir(&cli.output_dir)
        .encoder(encoder)
        .escape_values(cli.escape)
        .chunk(cli.chunk_size)
        .build();

    match job.run() {
        Ok(report) => {
            info!(
                "{} files converted, {} skipped, {} documents written in {:?}",
                report.files.len(),
                report.skipped.len(),
                report.outputs.len(),
                report.execution.duration
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            if err.is_input_error() {
                eprintln!();
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}
