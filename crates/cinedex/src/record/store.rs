use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::record::model::MovieRecord;

/// Write-through wrapper around a `MovieRecord` file.
///
/// Every setter rewrites the file, so the on-disk record reflects crawl
/// progress even when a later stage fails and the job is abandoned.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    record: MovieRecord,
}

impl RecordStore {
    /// Creates an empty record and immediately writes it to disk.
    pub fn create(path: PathBuf) -> Result<Self, StorageError> {
        let store = RecordStore {
            path,
            record: MovieRecord::default(),
        };
        store.flush()?;
        Ok(store)
    }

    /// Loads an existing record file.
    pub fn load(path: PathBuf) -> Result<Self, StorageError> {
        let content = fs::read_to_string(&path).map_err(|source| StorageError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let record = serde_json::from_str(&content).map_err(|source| StorageError::ParseRecord {
            path: path.clone(),
            source,
        })?;
        Ok(RecordStore { path, record })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self) -> &MovieRecord {
        &self.record
    }

    pub fn set_name(&mut self, name: String) -> Result<(), StorageError> {
        self.record.name = Some(name);
        self.flush()
    }

    pub fn set_name_translated(&mut self, name: String) -> Result<(), StorageError> {
        self.record.name_translated = Some(name);
        self.flush()
    }

    pub fn set_genres(&mut self, genres: Vec<String>) -> Result<(), StorageError> {
        self.record.genres = genres;
        self.flush()
    }

    pub fn set_genres_translated(&mut self, genres: Vec<String>) -> Result<(), StorageError> {
        self.record.genres_translated = genres;
        self.flush()
    }

    pub fn set_rating(&mut self, rating: f64) -> Result<(), StorageError> {
        self.record.rating = Some(rating);
        self.flush()
    }

    pub fn set_year(&mut self, year: u32) -> Result<(), StorageError> {
        self.record.year = Some(year);
        self.flush()
    }

    pub fn set_cover_path(&mut self, cover_path: String) -> Result<(), StorageError> {
        self.record.cover_path = Some(cover_path);
        self.flush()
    }

    /// Rewrites the record file from the in-memory state.
    pub fn flush(&self) -> Result<(), StorageError> {
        let content =
            serde_json::to_string_pretty(&self.record).map_err(|source| {
                StorageError::EncodeRecord {
                    path: self.path.clone(),
                    source,
                }
            })?;
        fs::write(&self.path, content).map_err(|source| StorageError::WriteFile {
            path: self.path.clone(),
            source,
        })
    }
}
