use crate::models::{ProfileHint, StoreData};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt, path::Path};
use tokio::fs;
use tracing::warn;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Json(err) => write!(f, "invalid json: {err}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// A missing file is an empty store. An unreadable or corrupt one is an error,
/// so it never gets overwritten by an empty document.
pub async fn load_data(path: &Path) -> Result<StoreData, StorageError> {
    read_json(path).await
}

pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), StorageError> {
    write_json(path, data).await
}

pub async fn load_hint(path: &Path) -> ProfileHint {
    match read_json(path).await {
        Ok(hint) => hint,
        Err(err) => {
            warn!("ignoring profile hint at {}: {err}", path.display());
            ProfileHint::default()
        }
    }
}

pub async fn persist_hint(path: &Path, hint: &ProfileHint) -> Result<(), StorageError> {
    write_json(path, hint).await
}

async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(err) => Err(err.into()),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(value)?;
    fs::write(path, payload).await?;
    Ok(())
}
