use crate::error::{JotterError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_AUTOSAVE_MS: u64 = 400;

/// Configuration for jotter, stored in `<data dir>/config.json`.
///
/// Passed explicitly to the session and to export rendering; nothing reads
/// it from global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JotterConfig {
    /// Color theme used when rendering standalone HTML ("light" or "dark")
    #[serde(default = "default_theme")]
    pub theme: String,

    /// CSS font-family for standalone HTML
    #[serde(default = "default_font")]
    pub font: String,

    /// Quiet period before an edit is written to storage
    #[serde(default = "default_autosave_ms")]
    pub autosave_ms: u64,

    /// Elements that open the inline markdown editor when clicked
    #[serde(default = "default_overlay_tags")]
    pub overlay_tags: Vec<String>,

    /// Whether plain paragraphs can be opened in the inline editor too
    #[serde(default)]
    pub paragraph_editable: bool,

    /// Extensions accepted when importing files
    #[serde(default = "default_import_ext")]
    pub import_extensions: Vec<String>,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_font() -> String {
    "system-ui, -apple-system, sans-serif".to_string()
}

fn default_autosave_ms() -> u64 {
    DEFAULT_AUTOSAVE_MS
}

fn default_overlay_tags() -> Vec<String> {
    ["h1", "h2", "h3", "strong", "b", "em", "i", "code", "li"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_import_ext() -> Vec<String> {
    vec![".md".to_string(), ".markdown".to_string(), ".txt".to_string()]
}

impl Default for JotterConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            font: default_font(),
            autosave_ms: DEFAULT_AUTOSAVE_MS,
            overlay_tags: default_overlay_tags(),
            paragraph_editable: false,
            import_extensions: default_import_ext(),
        }
    }
}

impl JotterConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(JotterError::Io)?;
        let config: JotterConfig =
            serde_json::from_str(&content).map_err(JotterError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(JotterError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(JotterError::Serialization)?;
        fs::write(config_path, content).map_err(JotterError::Io)?;
        Ok(())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }

    /// Tags the overlay editor may open, including `p` when enabled.
    pub fn editable_tags(&self) -> Vec<String> {
        let mut tags = self.overlay_tags.clone();
        if self.paragraph_editable && !tags.iter().any(|t| t == "p") {
            tags.push("p".to_string());
        }
        tags
    }

    /// Whether `path` has one of the importable extensions (case-insensitive).
    pub fn is_importable(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
        self.import_extensions
            .iter()
            .any(|allowed| normalize_ext(allowed) == ext)
    }

    /// Set a value by its CLI key. Returns an error for unknown keys or bad values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "theme" => match value {
                "light" | "dark" => self.theme = value.to_string(),
                _ => {
                    return Err(JotterError::Api(format!(
                        "Unknown theme '{}' (expected light or dark)",
                        value
                    )))
                }
            },
            "font" => self.font = value.to_string(),
            "autosave-ms" => {
                self.autosave_ms = value
                    .parse()
                    .map_err(|_| JotterError::Api(format!("Invalid number: {}", value)))?
            }
            "overlay-tags" => {
                self.overlay_tags = value
                    .split(',')
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect()
            }
            "paragraph-editable" => {
                self.paragraph_editable = value
                    .parse()
                    .map_err(|_| JotterError::Api(format!("Invalid boolean: {}", value)))?
            }
            "import-extensions" => {
                self.import_extensions = value
                    .split(',')
                    .map(|e| normalize_ext(e.trim()))
                    .filter(|e| e.len() > 1)
                    .collect()
            }
            _ => return Err(JotterError::Api(format!("Unknown config key: {}", key))),
        }
        Ok(())
    }

    /// Get a value by its CLI key.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "theme" => self.theme.clone(),
            "font" => self.font.clone(),
            "autosave-ms" => self.autosave_ms.to_string(),
            "overlay-tags" => self.overlay_tags.join(","),
            "paragraph-editable" => self.paragraph_editable.to_string(),
            "import-extensions" => self.import_extensions.join(","),
            _ => return Err(JotterError::Api(format!("Unknown config key: {}", key))),
        };
        Ok(value)
    }
}

fn normalize_ext(ext: &str) -> String {
    let ext = ext.to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
