//! @ai:module:intent Decide which files are RINEX observation files by name
//! @ai:module:layer domain
//! @ai:module:public_api FileDetector
//! @ai:module:stateless true

use regex::Regex;
use std::path::Path;

// `.rnx`/`.obs`, or the short-name form `.YYo` (e.g. `abmf0010.21o`).
const OBSERVATION_FILE_PATTERN: &str = r"(?i)\.(rnx|obs|\d{2}o)$";

/// @ai:intent Matches observation file names, including configured extra extensions
#[derive(Debug, Clone)]
pub struct FileDetector {
    pattern: Regex,
    extra: Vec<String>,
}

impl Default for FileDetector {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl FileDetector {
    /// @ai:intent Build a detector; extensions are compared case-insensitively, leading dots ignored
    pub fn new(extra: &[String]) -> Self {
        Self {
            pattern: Regex::new(OBSERVATION_FILE_PATTERN).expect("valid observation file pattern"),
            extra: extra
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// @ai:intent Check whether a path names an observation file
    /// @ai:example ("site0010.21o") -> true
    /// @ai:example ("brdc0010.21n") -> false
    /// @ai:effects pure
    pub fn is_observation_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        if self.pattern.is_match(name) {
            return true;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extra.iter().any(|x| x.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_names() {
        let detector = FileDetector::default();

        assert!(detector.is_observation_file(Path::new("ABMF00GLP_R_20200010000_01D_30S_MO.rnx")));
        assert!(detector.is_observation_file(Path::new("data/site.obs")));
        assert!(detector.is_observation_file(Path::new("abmf0010.21o")));
        assert!(detector.is_observation_file(Path::new("ABMF0010.21O")));
    }

    #[test]
    fn test_other_rinex_products_are_rejected() {
        let detector = FileDetector::default();

        assert!(!detector.is_observation_file(Path::new("brdc0010.21n")));
        assert!(!detector.is_observation_file(Path::new("abmf0010.21d")));
        assert!(!detector.is_observation_file(Path::new("notes.txt")));
        assert!(!detector.is_observation_file(Path::new("rnx")));
    }

    #[test]
    fn test_extra_extensions() {
        let detector = FileDetector::new(&[".DAT".to_string(), "".to_string()]);

        assert!(detector.is_observation_file(Path::new("site.dat")));
        assert!(!detector.is_observation_file(Path::new("site.txt")));
    }
}
