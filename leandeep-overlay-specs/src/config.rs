//! Harness configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{SpecError, SpecResult};

/// Where the harness finds its fixtures and expected-failures ledger.
///
/// Relative paths are resolved against the directory of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub fixtures_dir: PathBuf,
    pub failures_file: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            fixtures_dir: PathBuf::from("fixtures"),
            failures_file: PathBuf::from("expected-failures.toml"),
        }
    }
}

impl HarnessConfig {
    /// Defaults rooted at `dir`.
    pub fn rooted_at(dir: &Path) -> Self {
        Self::default().resolve_against(dir)
    }

    /// Load from a TOML file. A missing file gives the defaults rooted at
    /// the file's directory.
    pub fn load(path: &Path) -> SpecResult<Self> {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        if !path.exists() {
            return Ok(Self::rooted_at(base));
        }

        let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: HarnessConfig =
            toml::from_str(&content).map_err(|e| SpecError::from_toml(&content, &e))?;
        Ok(config.resolve_against(base))
    }

    fn resolve_against(self, base: &Path) -> Self {
        HarnessConfig {
            fixtures_dir: base.join(self.fixtures_dir),
            failures_file: base.join(self.failures_file),
        }
    }
}
