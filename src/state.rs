use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigError};
use crate::storage::Database;

/// Everything a command handler may touch.
///
/// Built once in `main` and lent to one handler at a time.
pub struct State {
    pub config: Config,
    config_path: PathBuf,
    pub db: Database,
    out: Box<dyn Write + Send>,
}

impl State {
    /// State whose command output goes to stdout.
    pub fn new(config: Config, config_path: PathBuf, db: Database) -> Self {
        Self::with_output(config, config_path, db, Box::new(std::io::stdout()))
    }

    pub fn with_output(
        config: Config,
        config_path: PathBuf,
        db: Database,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            config,
            config_path,
            db,
            out,
        }
    }

    /// Sink for user-facing command output.
    pub fn out(&mut self) -> &mut (dyn Write + Send) {
        self.out.as_mut()
    }

    /// The logged-in user's name; `None` when unset or empty.
    pub fn current_user(&self) -> Option<&str> {
        self.config
            .current_user_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Record `name` as the current user and persist the config.
    pub fn set_current_user(&mut self, name: &str) -> Result<(), ConfigError> {
        self.config.current_user_name = Some(name.to_string());
        self.config.save(&self.config_path)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
