// src/config.rs

use crate::error::{OplError, Result};
use crate::hook::Shell;
use crate::models::Schema;
use std::path::{Path, PathBuf};

/// Default log folder, relative to the home directory.
pub const LOG_FOLDER_NAME: &str = ".oplogs";

/// Runtime settings resolved once in `main` and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_root: PathBuf,
    pub operator: Option<String>,
}

impl Config {
    /// `folder` comes from `--folder` / `OPL_LOG_FOLDER`; otherwise `~/.oplogs`.
    pub fn load(folder: Option<PathBuf>) -> Result<Self> {
        let log_root = match folder {
            Some(f) => f,
            None => default_log_root()?,
        };
        let operator = std::env::var("OPERATOR").ok();
        Ok(Config::new(log_root, operator))
    }

    pub fn new(log_root: impl Into<PathBuf>, operator: Option<String>) -> Self {
        Config {
            log_root: log_root.into(),
            operator: operator.filter(|o| !o.trim().is_empty()),
        }
    }

    /// Each schema keeps its day files in its own subfolder.
    pub fn schema_folder(&self, schema: Schema) -> PathBuf {
        self.log_root.join(schema.name())
    }
}

pub fn default_log_root() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or(OplError::HomeDirNotFound)?;
    Ok(home_dir.join(LOG_FOLDER_NAME))
}

/// Startup file a shell hook is written to, relative to `home`.
pub fn shell_rc_path(home: &Path, shell: Shell) -> PathBuf {
    match shell {
        Shell::Zsh => home.join(".zshrc"),
        Shell::Fish => home.join(".config/fish/config.fish"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_folders_are_separate() {
        let config = Config::new("/tmp/oplogs", None);
        assert_eq!(config.schema_folder(Schema::Activity), Path::new("/tmp/oplogs/activity"));
        assert_eq!(config.schema_folder(Schema::Command), Path::new("/tmp/oplogs/command"));
    }

    #[test]
    fn blank_operator_is_unset() {
        assert_eq!(Config::new("/x", Some("  ".into())).operator, None);
        assert_eq!(Config::new("/x", Some("zk".into())).operator.as_deref(), Some("zk"));
    }

    #[test]
    fn explicit_folder_wins() {
        let config = Config::load(Some(PathBuf::from("/srv/logs"))).unwrap();
        assert_eq!(config.log_root, PathBuf::from("/srv/logs"));
    }

    #[test]
    fn rc_paths_per_shell() {
        let home = Path::new("/home/op");
        assert_eq!(shell_rc_path(home, Shell::Zsh), Path::new("/home/op/.zshrc"));
        assert_eq!(
            shell_rc_path(home, Shell::Fish),
            Path::new("/home/op/.config/fish/config.fish")
        );
    }
}
