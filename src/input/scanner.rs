//! Candidate discovery

use crate::config::ExtractionConfig;
use crate::error::{Result, ResumeRankerError};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect files under `root` whose extension is accepted.
///
/// Entries within a directory are visited in file-name order so repeated runs
/// see candidates in the same order.
pub fn discover_documents(root: &Path, config: &ExtractionConfig) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ResumeRankerError::InvalidInput(format!(
            "Resumes directory not found at {}",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let accepted = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| config.accepts_extension(ext))
            .unwrap_or(false);
        if accepted {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discovers_accepted_files_recursively_in_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("team/backend")).unwrap();
        fs::write(root.join("b_resume.PDF"), b"x").unwrap();
        fs::write(root.join("a_resume.txt"), b"x").unwrap();
        fs::write(root.join("notes.md"), b"x").unwrap();
        fs::write(root.join("team/backend/scan.jpeg"), b"x").unwrap();
        fs::write(root.join("team/letter.rtf"), b"x").unwrap();

        let found = discover_documents(root, &ExtractionConfig::default()).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, vec!["a_resume.txt", "b_resume.PDF", "team/backend/scan.jpeg"]);
    }

    #[test]
    fn test_missing_directory_is_invalid_input() {
        let result = discover_documents(Path::new("no/such/dir"), &ExtractionConfig::default());
        assert!(matches!(result, Err(ResumeRankerError::InvalidInput(_))));
    }
}
