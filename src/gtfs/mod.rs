use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{self, Cursor, Read, Seek},
    path::PathBuf,
    sync::Arc,
};
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

mod config;
pub mod models;
pub use config::*;
use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Csv file {0} is missing header")]
    MissingHeader(String),
    #[error("Could not find file with name: {0}")]
    FileNotFound(String),
}

#[derive(Default)]
pub enum StorageType {
    #[default]
    None,
    Zip(PathBuf),
    Memory(Arc<[u8]>),
}

#[derive(Default)]
pub struct Gtfs {
    config: Config,
    storage: StorageType,
}

impl Gtfs {
    pub fn new(config: self::Config) -> Self {
        Self {
            config,
            storage: Default::default(),
        }
    }

    pub fn from_zip(mut self, path: PathBuf) -> Self {
        self.storage = StorageType::Zip(path);
        self
    }

    /// Reads the archive straight from a downloaded buffer.
    pub fn from_bytes(mut self, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.storage = StorageType::Memory(bytes.into());
        self
    }

    pub fn stream_stops<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStop)),
    {
        const REQUIRED: [&str; 2] = ["stop_id", "stop_name"];
        let name = &self.config.stops_file_name;
        match &self.storage {
            StorageType::None => Ok(()),
            StorageType::Zip(path) => {
                let archive = ZipArchive::new(File::open(path)?)?;
                stream_from_zip::<_, GtfsStop, F>(archive, name, &REQUIRED, f)
            }
            StorageType::Memory(bytes) => {
                let archive = ZipArchive::new(Cursor::new(bytes.clone()))?;
                stream_from_zip::<_, GtfsStop, F>(archive, name, &REQUIRED, f)
            }
        }
    }
}

fn stream_from_zip<R, T, F>(
    mut archive: ZipArchive<R>,
    file_name: &str,
    required: &[&str],
    f: F,
) -> Result<(), self::Error>
where
    R: Read + Seek,
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let index = archive
        .index_for_name(file_name)
        .ok_or(self::Error::FileNotFound(file_name.to_string()))?;
    let file = archive.by_index(index)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    if let Some(missing) = required
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(self::Error::MissingHeader(format!("{file_name} ({missing})")));
    }

    let mut skipped = 0usize;
    reader
        .deserialize()
        .filter_map(|row| match row {
            Ok(value) => Some(value),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .enumerate()
        .for_each(f);
    if skipped > 0 {
        debug!("Skipped {skipped} malformed rows in {file_name}");
    }
    Ok(())
}
