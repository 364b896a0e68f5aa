use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

const RECORD_FILE: &str = "data.json";
const COVER_FILE: &str = "cover.png";

/// Filesystem layout of the movie library: one folder per movie under the
/// scanned root, each holding `data.json`, `cover.png`, and the video file.
#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
}

impl Library {
    pub fn new(root: PathBuf) -> Self {
        Library { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder for a movie, named after the sanitized site name.
    pub fn movie_dir(&self, name: &str) -> PathBuf {
        self.root.join(sanitize_name(name))
    }

    /// Creates the movie folder if it does not exist yet.
    pub fn ensure_movie_dir(&self, name: &str) -> Result<PathBuf, StorageError> {
        let dir = self.movie_dir(name);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(dir)
    }

    pub fn record_path(movie_dir: &Path) -> PathBuf {
        movie_dir.join(RECORD_FILE)
    }

    pub fn cover_path(movie_dir: &Path) -> PathBuf {
        movie_dir.join(COVER_FILE)
    }

    /// Moves a source video into its movie folder, keeping the file name.
    ///
    /// Tries a rename first and falls back to copy-and-delete for moves
    /// across filesystem boundaries.
    pub fn relocate(&self, source: &Path, movie_dir: &Path) -> Result<PathBuf, StorageError> {
        let file_name = source.file_name().ok_or_else(|| StorageError::MoveFile {
            from: source.to_path_buf(),
            to: movie_dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name"),
        })?;
        let target = movie_dir.join(file_name);

        if fs::rename(source, &target).is_err() {
            fs::copy(source, &target).map_err(|io| StorageError::MoveFile {
                from: source.to_path_buf(),
                to: target.clone(),
                source: io,
            })?;
            fs::remove_file(source).map_err(|io| StorageError::MoveFile {
                from: source.to_path_buf(),
                to: target.clone(),
                source: io,
            })?;
        }

        Ok(target)
    }
}

/// Turns a site movie name into a folder name safe for common filesystems.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_end_matches(['.', ' ']);
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
