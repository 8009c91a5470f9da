pub mod analytics;
pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod profiles;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;
pub mod validation;

pub use analytics::analyze;
pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use store::{open_store, DocumentStore};
