use std::env;
use std::path::PathBuf;

/// Runtime configuration for the add-contact runtime.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the roster and trust database.
    pub data_dir: PathBuf,
    /// Suffix separating several local instances (multi-account testing).
    pub instance_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = env::var("ROSTERGATE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/rostergate"));
        let instance_id = env::var("ROSTERGATE_INSTANCE")
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Ok(Self {
            data_dir,
            instance_id,
        })
    }

    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    pub fn with_instance_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = Some(id.into());
        self
    }

    /// Database location, suffixed per instance.
    pub fn storage_path(&self) -> PathBuf {
        match &self.instance_id {
            Some(id) => self.data_dir.join(format!("roster_{}", id)),
            None => self.data_dir.join("roster"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/rostergate"),
            instance_id: None,
        }
    }
}
