use super::ConfigError;
use std::path::{Path, PathBuf};

pub const RC_FILE_NAME: &str = ".smallshrc";

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    rc_path: Option<PathBuf>,
    explicit: bool,
}

impl ConfigPaths {
    /// `$HOME/.smallshrc`, or nothing when the home directory is unknown.
    pub fn new() -> Self {
        Self {
            rc_path: dirs::home_dir().map(|home| home.join(RC_FILE_NAME)),
            explicit: false,
        }
    }

    /// A path given on the command line. It must exist.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            rc_path: Some(path.into()),
            explicit: true,
        }
    }

    pub fn rc_path(&self) -> Option<&Path> {
        self.rc_path.as_deref()
    }

    pub fn check_exists(&self) -> Result<Option<&Path>, ConfigError> {
        match self.rc_path() {
            Some(path) if path.exists() => Ok(Some(path)),
            Some(path) if self.explicit => Err(ConfigError::ConfigFileNotFound(
                path.display().to_string(),
            )),
            _ => Ok(None),
        }
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_is_in_home() {
        let paths = ConfigPaths::new();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(paths.rc_path(), Some(home.join(".smallshrc").as_path()));
        }
    }

    #[test]
    fn test_missing_explicit_file() {
        let paths = ConfigPaths::explicit("/nonexistent/smallshrc");
        assert!(matches!(
            paths.check_exists(),
            Err(ConfigError::ConfigFileNotFound(_))
        ));
    }

    #[test]
    fn test_missing_default_file_is_fine() {
        let paths = ConfigPaths {
            rc_path: Some(PathBuf::from("/nonexistent/.smallshrc")),
            explicit: false,
        };
        assert!(paths.check_exists().unwrap().is_none());
    }
}
