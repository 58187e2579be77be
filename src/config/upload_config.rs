use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cloud::models::StorageCredential;
use crate::config::document::ConfigDocument;
use crate::config::env_vars::{env_override, expand_env_vars, has_unresolved_vars};
use crate::constants::{
    default_concurrency, DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_HOST_SUFFIX,
    DEFAULT_SCHEME, ENV_BUCKET, ENV_PRIVATE_KEY, ENV_PUBLIC_KEY, JSON_CONFIG_PREFIX, MAX_PUT_SIZE,
};

/// Tunables for one uploader. Several uploaders with different settings can
/// live in the same process (one per bucket or region).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UploadSettings {
    pub scheme: String,
    pub suffix: String,
    /// Payloads up to this many bytes use a single PUT
    pub max_put_size: u64,
    /// Upper bound on part uploads in flight at once
    pub concurrency: usize,
    pub connection_timeout_secs: u64,
    /// Send an abort call when a multipart upload fails
    pub abort_on_failure: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        UploadSettings {
            scheme: DEFAULT_SCHEME.to_string(),
            suffix: DEFAULT_HOST_SUFFIX.to_string(),
            max_put_size: MAX_PUT_SIZE,
            concurrency: default_concurrency(),
            connection_timeout_secs: DEFAULT_CONNECTION_TIMEOUT_SECS,
            abort_on_failure: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub credential: StorageCredential,
    #[serde(default)]
    pub upload: UploadSettings,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_yaml::from_str(&content)
            .context("Failed to parse YAML config")?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the `ufile` section of a JSON document
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let document = ConfigDocument::from_file(path)?;
        let config = Self::from_document(&document, JSON_CONFIG_PREFIX)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Read a config from `prefix.*` keys; upload settings are optional.
    pub fn from_document(document: &ConfigDocument, prefix: &str) -> Result<Self> {
        let key = |name: &str| format!("{}.{}", prefix, name);

        let credential = StorageCredential {
            public_key: document.get_string(&key("public_key"))?,
            private_key: document.get_string(&key("private_key"))?,
            bucket: document.get_string(&key("bucket"))?,
        };

        let mut upload = UploadSettings::default();
        if document.contains(&key("upload.scheme")) {
            upload.scheme = document.get_string(&key("upload.scheme"))?;
        }
        if document.contains(&key("upload.suffix")) {
            upload.suffix = document.get_string(&key("upload.suffix"))?;
        }
        if document.contains(&key("upload.max_put_size")) {
            upload.max_put_size = document.get_u64(&key("upload.max_put_size"))?;
        }
        if document.contains(&key("upload.concurrency")) {
            upload.concurrency = document.get_u64(&key("upload.concurrency"))? as usize;
        }
        if document.contains(&key("upload.connection_timeout_secs")) {
            upload.connection_timeout_secs = document.get_u64(&key("upload.connection_timeout_secs"))?;
        }
        if document.contains(&key("upload.abort_on_failure")) {
            upload.abort_on_failure = document.get_bool(&key("upload.abort_on_failure"))?;
        }

        Ok(AppConfig { credential, upload })
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Template written by `init-config`
    pub fn template() -> Self {
        AppConfig {
            credential: StorageCredential::new("${UFILE_PUBLIC_KEY}", "${UFILE_PRIVATE_KEY}", "my-bucket"),
            upload: UploadSettings::default(),
        }
    }

    pub fn create_default_config_file(path: &Path) -> Result<()> {
        Self::template().save_to_yaml_file(path)
    }

    /// Expand `$VAR` references in the credential, then apply the
    /// `UFILE_*` environment overrides.
    pub fn process_environment_variables(&mut self) -> Result<()> {
        self.credential.public_key = expand_env_vars(&self.credential.public_key);
        self.credential.private_key = expand_env_vars(&self.credential.private_key);
        self.credential.bucket = expand_env_vars(&self.credential.bucket);

        if let Some(value) = env_override(ENV_PUBLIC_KEY) {
            debug!("Public key taken from {}", ENV_PUBLIC_KEY);
            self.credential.public_key = value;
        }
        if let Some(value) = env_override(ENV_PRIVATE_KEY) {
            debug!("Private key taken from {}", ENV_PRIVATE_KEY);
            self.credential.private_key = value;
        }
        if let Some(value) = env_override(ENV_BUCKET) {
            debug!("Bucket taken from {}", ENV_BUCKET);
            self.credential.bucket = value;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("public_key", &self.credential.public_key),
            ("private_key", &self.credential.private_key),
            ("bucket", &self.credential.bucket),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                bail!("credential.{} is empty", name);
            }
            if has_unresolved_vars(value) {
                bail!("credential.{} references an unset environment variable", name);
            }
        }

        if self.upload.max_put_size == 0 {
            bail!("upload.max_put_size must be greater than zero");
        }
        if self.upload.concurrency == 0 {
            bail!("upload.concurrency must be at least 1");
        }
        if self.upload.scheme.is_empty() || self.upload.suffix.is_empty() {
            bail!("upload.scheme and upload.suffix must be set");
        }

        Ok(())
    }
}

/// Load a config file, picking the parser from the extension
pub fn load_config(path: &Path) -> Result<AppConfig> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => AppConfig::from_json_file(path),
        _ => AppConfig::from_yaml_file(path),
    }
}

/// Load configuration, creating a template file if the path does not exist
pub fn load_or_create_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match config_path {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            load_config(path)?
        }
        Some(path) => {
            info!("Config file not found, creating template at {}", path.display());
            AppConfig::create_default_config_file(path)?;
            AppConfig::template()
        }
        None => {
            info!("No config path provided, using environment configuration");
            AppConfig::template()
        }
    };

    config.process_environment_variables()?;
    Ok(config)
}
