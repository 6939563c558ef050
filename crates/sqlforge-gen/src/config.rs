//! Generator configuration, read from `sqlforge.toml`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::translate::TypeDef;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "sqlforge.toml";

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// Folders of `.sql` files to parse.
    pub queries: Vec<PathBuf>,
    /// Schema whose tables are referenced without qualification.
    pub shared_schema: String,
    /// Maximum number of files typed at once.
    pub concurrency: usize,
    /// User-defined target types.
    pub types: BTreeMap<String, TypeDef>,
    /// Database type names mapped straight to target types.
    pub type_overrides: HashMap<String, String>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            shared_schema: "public".to_string(),
            concurrency: 10,
            types: BTreeMap::new(),
            type_overrides: HashMap::new(),
        }
    }
}

impl GenConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Config`](crate::error::GenError::Config) for
    /// invalid TOML or unknown keys.
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Loads the configuration at `path`. A missing file at the default path
    /// yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded configuration");
                Self::from_toml(&content)
            }
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = GenConfig::from_toml("").unwrap();
        assert_eq!(cfg, GenConfig::default());
        assert_eq!(cfg.shared_schema, "public");
        assert_eq!(cfg.concurrency, 10);
    }

    #[test]
    fn test_full_document() {
        let cfg = GenConfig::from_toml(
            r#"
queries = ["queries", "reports"]
shared_schema = "app"
concurrency = 4

[types.Email]
imports = ["crate::types::Email"]
random_expr = "Email::random(rng)"

[type_overrides]
citext = "Email"
"#,
        )
        .unwrap();
        assert_eq!(cfg.queries, [PathBuf::from("queries"), PathBuf::from("reports")]);
        assert_eq!(cfg.shared_schema, "app");
        assert_eq!(cfg.concurrency, 4);
        assert_eq!(cfg.types["Email"].imports, ["crate::types::Email"]);
        assert_eq!(cfg.type_overrides["citext"], "Email");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(GenConfig::from_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn test_missing_default_file_is_not_an_error() {
        let cwd_has_config = Path::new(DEFAULT_CONFIG_PATH).exists();
        if !cwd_has_config {
            assert_eq!(GenConfig::load(None).unwrap(), GenConfig::default());
        }
        assert!(GenConfig::load(Some(Path::new("/nonexistent/sqlforge.toml"))).is_err());
    }
}
