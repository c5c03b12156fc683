use std::path::Path;

use thiserror::Error;

use crate::data::SweepOptions;

// ---------------------------------------------------------------------------
// Recipes: SweepOptions stored as JSON
// ---------------------------------------------------------------------------
//
// {
//   "cleaning": ["remove_duplicates", "fill_missing_numeric"],
//   "columns":  ["region", "amount"],
//   "target":   "xlsx"
// }
//
// Every field is optional; unknown fields are rejected.

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading recipe {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing recipe: {0}")]
    Json(#[from] serde_json::Error),
}

impl SweepOptions {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a recipe file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let options = Self::from_json(&text)?;
        log::debug!("Recipe {}: {options:?}", path.display());
        Ok(options)
    }
}
