use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use log::debug;

use crate::error::BatchError;

use super::table::{self, TableSchema};

/// Extension of FIAS table files, compared ignoring case.
pub const DBF_EXTENSION: &str = ".DBF";

/// An input file and the table it holds records for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub table: &'static TableSchema,
}

/// Finds the table a DBF file belongs to.
///
/// The file name is upper-cased, stripped of its extension and of every ASCII digit,
/// so regional and delta files (`HOUSE01.DBF`, `ADDROBJ77.dbf`) map to their base table.
pub fn identify_table(file_name: &str) -> Option<&'static TableSchema> {
    let upper = file_name.to_uppercase();
    let base = upper.strip_suffix(DBF_EXTENSION)?;
    let identifier: String = base.chars().filter(|c| !c.is_ascii_digit()).collect();

    table::lookup(&identifier)
}

fn has_dbf_extension(file_name: &str) -> bool {
    file_name.to_uppercase().ends_with(DBF_EXTENSION)
}

/// Lists the FIAS tables found at `path`, which is either a single DBF file or a
/// directory whose immediate entries are scanned in file name order.
///
/// # Errors
/// - [`BatchError::NotFound`] when `path` does not exist
/// - [`BatchError::Unreadable`] when a single file cannot be opened or is not a DBF file
/// - [`BatchError::NoInput`] when no file matches a known table
pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Vec<ResolvedInput>, BatchError> {
    let path = path.as_ref();

    let candidates = if path.is_dir() {
        list_directory(path)?
    } else if path.is_file() {
        vec![check_file(path)?]
    } else {
        return Err(BatchError::NotFound(path.to_path_buf()));
    };

    let resolved: Vec<ResolvedInput> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let file_name = candidate.file_name()?.to_string_lossy().into_owned();
            match identify_table(&file_name) {
                Some(table) => Some(ResolvedInput {
                    path: candidate,
                    table,
                }),
                None => {
                    debug!("Skipping {}: not a known table", candidate.display());
                    None
                }
            }
        })
        .collect();

    if resolved.is_empty() {
        return Err(BatchError::NoInput(path.to_path_buf()));
    }

    Ok(resolved)
}

fn list_directory(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let entries = fs::read_dir(dir).map_err(|_| BatchError::Unreadable(dir.to_path_buf()))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|_| BatchError::Unreadable(dir.to_path_buf()))?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let file_name = entry.file_name();

        if !is_dir && has_dbf_extension(&file_name.to_string_lossy()) {
            candidates.push(entry.path());
        }
    }

    candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(candidates)
}

fn check_file(path: &Path) -> Result<PathBuf, BatchError> {
    let readable = File::open(path).is_ok();
    let is_dbf = path
        .file_name()
        .is_some_and(|name| has_dbf_extension(&name.to_string_lossy()));

    if readable && is_dbf {
        Ok(path.to_path_buf())
    } else {
        Err(BatchError::Unreadable(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn identifies_tables_ignoring_case_and_digits() {
        for table in table::all() {
            let id = table.identifier();
            let names = [
                format!("{}.DBF", id),
                format!("{}.dbf", id.to_lowercase()),
                format!("{}01.Dbf", id),
                format!("1{}99.DBF", id),
            ];

            for name in names {
                assert_eq!(identify_table(&name), Some(table), "{}", name);
            }
        }
    }

    #[test]
    fn digits_inside_identifier_are_stripped() {
        assert_eq!(identify_table("HOU5SE.DBF").map(|t| t.identifier()), Some("HOUSE"));
    }

    #[test]
    fn unknown_names_are_not_identified() {
        assert!(identify_table("STREETS.DBF").is_none());
        assert!(identify_table("HOUSE.TXT").is_none());
        assert!(identify_table("HOUSE").is_none());
        assert!(identify_table("HOUSE_01.DBF").is_none());
    }

    #[test]
    fn resolves_directory_in_name_order() {
        let dir = tempdir().unwrap();
        for name in ["HOUSE1.DBF", "readme.txt", "ADDROBJ.dbf", "HOUSE.DBF", "STREETS.DBF"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("LANDMARK.DBF")).unwrap();

        let resolved = resolve(dir.path()).unwrap();
        let summary: Vec<(String, &str)> = resolved
            .iter()
            .map(|input| {
                (
                    input.path.file_name().unwrap().to_string_lossy().into_owned(),
                    input.table.identifier(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("ADDROBJ.dbf".to_string(), "ADDROBJ"),
                ("HOUSE.DBF".to_string(), "HOUSE"),
                ("HOUSE1.DBF".to_string(), "HOUSE"),
            ]
        );
    }

    #[test]
    fn directory_without_tables_is_no_input() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join("data.TXT"), b"").unwrap();

        assert!(matches!(resolve(dir.path()), Err(BatchError::NoInput(_))));
    }

    #[test]
    fn single_file_is_resolved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("socrbase.dbf");
        fs::write(&path, b"").unwrap();

        let resolved = resolve(&path).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].path, path);
        assert_eq!(resolved[0].table.identifier(), "SOCRBASE");
    }

    #[test]
    fn single_file_with_wrong_extension_is_unreadable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("HOUSE.CSV");
        fs::write(&path, b"").unwrap();

        assert!(matches!(resolve(&path), Err(BatchError::Unreadable(_))));
    }

    #[test]
    fn single_unknown_table_is_no_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("STREETS.DBF");
        fs::write(&path, b"").unwrap();

        assert!(matches!(resolve(&path), Err(BatchError::NoInput(_))));
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = tempdir().unwrap();

        let result = resolve(dir.path().join("missing"));

        assert!(matches!(result, Err(BatchError::NotFound(_))));
    }
}
