//! Walk Options
//!
//! Controls how traversals treat compiled modules. Options can be built in code
//! or loaded from the `[walk]` table of a TOML file:
//!
//! ```toml
//! [walk]
//! skip_compiled = false
//! ```

use std::path::Path;

use serde::Deserialize;

/// Traversal options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    /// Do not descend into modules whose `compiled` flag is set.
    /// Compiled modules are still reported by structural discovery.
    /// Default: true (compiled parameters are frozen).
    pub skip_compiled: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::frozen()
    }
}

impl WalkOptions {
    /// Treat compiled modules as frozen: report them, never enter them.
    pub fn frozen() -> Self {
        Self {
            skip_compiled: true,
        }
    }

    /// Enter every module regardless of its compiled flag.
    pub fn exhaustive() -> Self {
        Self {
            skip_compiled: false,
        }
    }

    /// Parse options from TOML content.
    ///
    /// A missing `[walk]` table or missing keys fall back to the defaults.
    pub fn parse_toml(content: &str) -> Result<Self, toml::de::Error> {
        #[derive(Deserialize)]
        struct WalkFile {
            #[serde(default)]
            walk: WalkOptions,
        }

        let file: WalkFile = toml::from_str(content)?;
        Ok(file.walk)
    }

    /// Load options from a TOML file.
    ///
    /// Returns `None` if the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse_toml(&content).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_frozen() {
        assert_eq!(WalkOptions::default(), WalkOptions::frozen());
        assert!(WalkOptions::default().skip_compiled);
        assert!(!WalkOptions::exhaustive().skip_compiled);
    }

    #[test]
    fn test_parse_toml() {
        let options = WalkOptions::parse_toml("[walk]\nskip_compiled = false\n").unwrap();
        assert_eq!(options, WalkOptions::exhaustive());
    }

    #[test]
    fn test_parse_toml_defaults() {
        assert_eq!(WalkOptions::parse_toml("").unwrap(), WalkOptions::default());
        assert_eq!(WalkOptions::parse_toml("[walk]\n").unwrap(), WalkOptions::default());
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(WalkOptions::parse_toml("[walk]\nskip_compiled = \"yes\"\n").is_err());
        assert!(WalkOptions::parse_toml("not toml [").is_err());
    }

    #[test]
    fn test_load_nonexistent_path() {
        assert!(WalkOptions::load_from_path(Path::new("/nonexistent/walk.toml")).is_none());
    }
}
