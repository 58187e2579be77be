// Re-export all items from the submodules
mod document;
mod env_vars;
mod upload_config;

// Re-export the dotted-key document reader
pub use document::ConfigDocument;

// Re-export upload configuration
pub use upload_config::{
    AppConfig,
    UploadSettings,
    load_config,
    load_or_create_config,
};

// Re-export environment variable helpers
pub use env_vars::{
    expand_env_vars,
    env_override,
};
