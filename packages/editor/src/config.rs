use crate::EditorError;
use canvas_model::{BlockTemplate, IdGenerator, DEFAULT_IMAGE_SOURCE};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "canvas.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Seeds block ids; a random seed is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,

    /// Source given to newly created image blocks
    #[serde(default = "default_image_source")]
    pub default_image_source: String,

    /// Reject moves and inserts that would put a block under itself
    #[serde(default = "default_true")]
    pub reject_cycles: bool,

    /// Deselect when the active block is removed
    #[serde(default)]
    pub clear_selection_on_delete: bool,

    /// Deepest level tree walks descend to
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_image_source() -> String {
    DEFAULT_IMAGE_SOURCE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    64
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults if the file is missing
    pub fn load(dir: &Path) -> Result<Self, EditorError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(content: &str) -> Result<Self, EditorError> {
        let config: Self = serde_json::from_str(content)?;
        if config.max_depth == 0 {
            return Err(EditorError::Config("maxDepth must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn id_generator(&self) -> IdGenerator {
        match &self.session_name {
            Some(name) => IdGenerator::new(name),
            None => IdGenerator::random(),
        }
    }

    pub fn block_template(&self) -> BlockTemplate {
        BlockTemplate {
            image_source: self.default_image_source.clone(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            session_name: None,
            default_image_source: default_image_source(),
            reject_cycles: true,
            clear_selection_on_delete: false,
            max_depth: default_max_depth(),
        }
    }
}
