//! Configuration file for gator, `~/.gatorconfig.json` by default.
//!
//! The file is optional: a missing or empty file yields `Config::default()`.
//! Unknown keys are accepted and logged as warnings. The file is rewritten
//! whenever the current user changes.
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".gatorconfig.json";
const DEFAULT_DB_FILE_NAME: &str = ".gator.db";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("HOME environment variable not set")]
    NoHomeDir,
}

// ============================================================================
// Configuration
// ============================================================================

/// Persisted user configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite connection string. Empty means `sqlite://<home>/.gator.db`.
    pub db_url: String,

    /// Name of the logged-in user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user_name: Option<String>,

    /// Per-request timeout for feed downloads, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: String::new(),
            current_user_name: None,
            fetch_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 3] = ["db_url", "current_user_name", "fetch_timeout_secs"];

    /// `~/.gatorconfig.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(home_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a JSON file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid JSON → `Err(ConfigError::Parse)` with line and column
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        let raw: serde_json::Value = serde_json::from_str(&content)?;
        if let Some(object) = raw.as_object() {
            for key in object.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = serde_json::from_value(raw)?;
        tracing::debug!(
            path = %path.display(),
            user = config.current_user_name.as_deref().unwrap_or(""),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Write the configuration to `path`.
    ///
    /// The JSON is written to a sibling temp file which is then renamed over
    /// `path`, so a crash never leaves a half-written config behind.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let mut content = serde_json::to_vec_pretty(self)?;
        content.push(b'\n');

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp = tempfile_in(dir, path)?;

        let result = (|| -> std::io::Result<()> {
            temp.file.write_all(&content)?;
            temp.file.sync_all()?;
            std::fs::rename(&temp.path, path)
        })();

        if let Err(e) = result {
            let _ = std::fs::remove_file(&temp.path);
            return Err(ConfigError::Io(e));
        }

        tracing::debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// The connection string the store should open.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        if !self.db_url.trim().is_empty() {
            return Ok(self.db_url.clone());
        }
        let path = home_dir()?.join(DEFAULT_DB_FILE_NAME);
        Ok(format!("sqlite://{}", path.display()))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

fn home_dir() -> Result<PathBuf, ConfigError> {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => Err(ConfigError::NoHomeDir),
    }
}

struct TempFile {
    file: std::fs::File,
    path: PathBuf,
}

/// Create a fresh temp file next to `target`, user-only on Unix.
///
/// `create_new` fails instead of following a pre-planted symlink.
fn tempfile_in(dir: &Path, target: &Path) -> Result<TempFile, ConfigError> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    let path = dir.join(format!("{name}.tmp.{random_suffix:016x}"));

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options.open(&path)?;
    Ok(TempFile { file, path })
}

// ============================================================================
// Tests
// ============================================================================
