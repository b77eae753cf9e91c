//! Generator configuration - explicit values handed to the compiler and
//! compositor instead of process-wide state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 1200;
pub const DEFAULT_BREED: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    /// Breed whose layers stand in when a breed has no artwork of its own.
    #[serde(default = "default_breed")]
    pub default_breed: String,
    /// Only artwork files with this extension are compiled.
    #[serde(default = "default_image_extension")]
    pub image_extension: String,
}

fn default_canvas_width() -> u32 { CANVAS_WIDTH }
fn default_canvas_height() -> u32 { CANVAS_HEIGHT }
fn default_breed() -> String { DEFAULT_BREED.to_string() }
fn default_image_extension() -> String { "png".to_string() }

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            default_breed: default_breed(),
            image_extension: default_image_extension(),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!((config.canvas_width, config.canvas_height), (1200, 1200));
        assert_eq!(config.default_breed, "default");
        assert_eq!(config.image_extension, "png");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"canvasWidth": 64}"#).unwrap();
        assert_eq!(config.canvas_width, 64);
        assert_eq!(config.canvas_height, 1200);
        assert_eq!(config.default_breed, "default");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"defaultBreed": "tabby", "canvasHeight": 32}}"#).unwrap();
        let config = GeneratorConfig::load(file.path()).unwrap();
        assert_eq!(config.default_breed, "tabby");
        assert_eq!(config.canvas_height, 32);
    }
}
