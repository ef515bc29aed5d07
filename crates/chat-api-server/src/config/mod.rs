pub mod settings;

pub use settings::{ChatConfig, DatabaseConfig, DocumentsConfig, ServerConfig, Settings};
