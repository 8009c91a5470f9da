use crate::config::{AppConfig, ConfigError};
use crate::models::{Entry, Profile, ProfileDoc, PushupDoc, StoreData};
use crate::storage::{load_data, persist_data, StorageError};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::{path::PathBuf, sync::Arc};
use tokio::{fs, sync::Mutex};
use tracing::info;
use uuid::Uuid;

/// The `pushups` and `profiles` collections, persisted as one JSON file.
///
/// Writes are applied to a copy, persisted, and only then committed, so a
/// failed write leaves memory and disk as they were.
#[derive(Clone)]
pub struct DocumentStore {
    path: PathBuf,
    data: Arc<Mutex<StoreData>>,
}

pub async fn open_store(config: &AppConfig) -> Result<DocumentStore, ConfigError> {
    let path = config.data_path.clone().ok_or(ConfigError::EmptyDataPath)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| ConfigError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let data = load_data(&path)
        .await
        .map_err(|source| ConfigError::Store {
            path: path.clone(),
            source,
        })?;
    info!(
        "opened store {} ({} profiles, {} entries)",
        path.display(),
        data.profiles.len(),
        data.pushups.len()
    );

    Ok(DocumentStore::new(path, data))
}

impl DocumentStore {
    pub fn new(path: PathBuf, data: StoreData) -> Self {
        Self {
            path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn list_profiles(&self) -> Vec<Profile> {
        let data = self.data.lock().await;
        let mut profiles: Vec<Profile> = data
            .profiles
            .iter()
            .map(|(id, doc)| Profile::from_doc(id, doc))
            .collect();
        profiles.sort_by_cached_key(|profile| (profile.name.to_lowercase(), profile.id.clone()));
        profiles
    }

    pub async fn add_profile(&self, name: &str, goal: u64) -> Result<Profile, StorageError> {
        let id = new_id();
        let doc = ProfileDoc {
            name: json!(name),
            goal: json!(goal),
        };
        let profile = Profile::from_doc(&id, &doc);
        self.write(|data| {
            data.profiles.insert(id, doc);
        })
        .await?;
        Ok(profile)
    }

    /// `Ok(None)` when no profile has that id.
    pub async fn update_profile_goal(
        &self,
        id: &str,
        goal: u64,
    ) -> Result<Option<Profile>, StorageError> {
        self.write(|data| {
            let doc = data.profiles.get_mut(id)?;
            doc.goal = json!(goal);
            Some(Profile::from_doc(id, doc))
        })
        .await
    }

    /// Entries whose `user` field is exactly `user`.
    pub async fn query_entries(&self, user: &str) -> Vec<Entry> {
        let data = self.data.lock().await;
        data.pushups
            .iter()
            .filter(|(_, doc)| doc.user.as_str() == Some(user))
            .map(|(id, doc)| Entry::from_doc(id, doc))
            .collect()
    }

    pub async fn add_entry(
        &self,
        user: &str,
        date: NaiveDate,
        count: u64,
    ) -> Result<Entry, StorageError> {
        let id = new_id();
        let doc = PushupDoc {
            user: json!(user),
            date: date_value(date),
            count: json!(count),
        };
        let entry = Entry::from_doc(&id, &doc);
        self.write(|data| {
            data.pushups.insert(id, doc);
        })
        .await?;
        Ok(entry)
    }

    /// `Ok(None)` when no entry has that id.
    pub async fn update_entry(
        &self,
        id: &str,
        date: NaiveDate,
        count: u64,
    ) -> Result<Option<Entry>, StorageError> {
        self.write(|data| {
            let doc = data.pushups.get_mut(id)?;
            doc.date = date_value(date);
            doc.count = json!(count);
            Some(Entry::from_doc(id, doc))
        })
        .await
    }

    /// `Ok(false)` when no entry has that id.
    pub async fn delete_entry(&self, id: &str) -> Result<bool, StorageError> {
        self.write(|data| data.pushups.remove(id).is_some()).await
    }

    async fn write<T>(&self, change: impl FnOnce(&mut StoreData) -> T) -> Result<T, StorageError> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let result = change(&mut next);
        persist_data(&self.path, &next).await?;
        *data = next;
        Ok(result)
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn date_value(date: NaiveDate) -> Value {
    Value::String(date.format("%Y-%m-%d").to_string())
}
