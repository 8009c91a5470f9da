use crate::models::{parse_day, ActiveProfile};
use crate::storage::StorageError;
use chrono::{Local, NaiveDate};
use std::{env, fmt, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/store.json";
const HINT_FILE_NAME: &str = "last_profile.json";
const DEFAULT_USERNAME: &str = "JJ";
const DEFAULT_GOAL: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `None` when `APP_DATA_PATH` is set but empty.
    pub data_path: Option<PathBuf>,
    pub hint_path: PathBuf,
    pub default_name: String,
    pub default_goal: u64,
    pub fixed_today: Option<NaiveDate>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let port = var("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = match var("APP_DATA_PATH") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(PathBuf::from(value)),
            None => Some(PathBuf::from(DEFAULT_DATA_PATH)),
        };

        let hint_path = var("APP_PROFILE_HINT_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| match &data_path {
                Some(path) => path.with_file_name(HINT_FILE_NAME),
                None => PathBuf::from(DEFAULT_DATA_PATH).with_file_name(HINT_FILE_NAME),
            });

        let default_name = var("APP_USERNAME")
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());

        let default_goal = match var("APP_GOAL") {
            Some(value) => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|goal| goal.is_finite() && *goal > 0.0)
                .map(|goal| goal.ceil() as u64)
                .unwrap_or_else(|| {
                    warn!("APP_GOAL={value:?} is not a positive number, starting without a goal");
                    0
                }),
            None => DEFAULT_GOAL,
        };

        let fixed_today = var("APP_TODAY").and_then(|value| {
            let parsed = parse_day(value.trim());
            if parsed.is_none() {
                warn!("APP_TODAY={value:?} is not a YYYY-MM-DD date, using the clock");
            }
            parsed
        });

        Self {
            port,
            data_path,
            hint_path,
            default_name,
            default_goal,
            fixed_today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Profile used until a saved one is selected.
    pub fn default_profile(&self) -> ActiveProfile {
        ActiveProfile {
            id: None,
            name: self.default_name.clone(),
            goal: self.default_goal,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyDataPath,
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Store {
        path: PathBuf,
        source: StorageError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDataPath => write!(f, "APP_DATA_PATH is set but empty"),
            Self::DataDir { path, source } => {
                write!(f, "cannot create data directory {}: {source}", path.display())
            }
            Self::Store { path, source } => {
                write!(f, "cannot open store {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
