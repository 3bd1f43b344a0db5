//! @ai:module:intent Read observation files from disk and parse them, one file or a whole tree
//! @ai:module:layer infrastructure
//! @ai:module:public_api ScannedFile, read_document, scan_file, scan_directory
//! @ai:module:depends_on detect, style, error
//! @ai:module:stateless true

use crate::detect::FileDetector;
use crate::error::{Error, Result};
use crate::style::StyleTable;
use crate::{parse_with_style, ParsedDocument};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent A parsed file together with its path
#[derive(Debug, Clone, Serialize)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub document: ParsedDocument,
}

/// @ai:intent Read a document as text
/// @ai:effects fs:read
pub fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// @ai:intent Parse a single file
/// @ai:post fails with UnsupportedFileType when no RINEX version record is found
/// @ai:effects fs:read
pub fn scan_file(path: &Path, style: &StyleTable) -> Result<ScannedFile> {
    let content = read_document(path)?;
    let document = parse_with_style(&content, style);

    if document.header.version.is_none() && document.header.file_type.is_none() {
        return Err(Error::UnsupportedFileType(path.display().to_string()));
    }

    Ok(ScannedFile {
        path: path.to_path_buf(),
        document,
    })
}

/// @ai:intent Parse every observation file under a directory, sorted by path
/// @ai:post unreadable or non-RINEX files are logged and skipped
/// @ai:effects fs:read
pub fn scan_directory(
    path: &Path,
    style: &StyleTable,
    detector: &FileDetector,
) -> Result<Vec<ScannedFile>> {
    if !path.is_dir() {
        return Err(Error::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut scanned = Vec::new();

    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !detector.is_observation_file(entry.path()) {
            continue;
        }

        match scan_file(entry.path(), style) {
            Ok(file) => scanned.push(file),
            Err(e) => tracing::warn!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    tracing::info!("Scanned {} observation files in {}", scanned.len(), path.display());
    Ok(scanned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const V3_DOCUMENT: &str = "     3.04           OBSERVATION DATA    M                   RINEX VERSION / TYPE
G    2 C1C L1C                                              SYS / # / OBS TYPES
                                                            END OF HEADER
> 2020 06 22 00 00  0.0000000  0  1
G01  20000000.123 8 105000000.123 8
";

    #[test]
    fn test_scan_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", V3_DOCUMENT).unwrap();

        let scanned = scan_file(file.path(), &StyleTable::default()).unwrap();
        let summary = scanned.document.summary.unwrap();
        assert_eq!(summary.total_epochs, 1);
        assert_eq!(scanned.path, file.path());
    }

    #[test]
    fn test_scan_file_rejects_plain_text() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "just some notes").unwrap();

        let result = scan_file(file.path(), &StyleTable::default());
        assert!(matches!(result, Err(Error::UnsupportedFileType(_))));
    }

    #[test]
    fn test_scan_file_missing() {
        let result = scan_file(Path::new("/nonexistent/site.rnx"), &StyleTable::default());
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn test_scan_directory_filters_and_skips() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.rnx"), V3_DOCUMENT).unwrap();
        std::fs::write(dir.path().join("nested/a0010.20o"), V3_DOCUMENT).unwrap();
        std::fs::write(dir.path().join("broken.obs"), "not rinex at all\n").unwrap();
        std::fs::write(dir.path().join("readme.txt"), V3_DOCUMENT).unwrap();

        let scanned =
            scan_directory(dir.path(), &StyleTable::default(), &FileDetector::default()).unwrap();

        let names: Vec<String> = scanned
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.rnx", "a0010.20o"]);
    }

    #[test]
    fn test_scan_directory_requires_directory() {
        let file = NamedTempFile::new().unwrap();
        let result = scan_directory(file.path(), &StyleTable::default(), &FileDetector::default());
        assert!(result.is_err());
    }
}
