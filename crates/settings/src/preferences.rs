use log::warn;
use serde::{Deserialize, Serialize};
use snippetbox_highlight::{Color, HighlightSettings};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const PREFERENCES_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize preferences {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// User preferences persisted as JSON.  
/// 以 JSON 保存的使用者偏好設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub highlight: HighlightPreferences,
}

fn default_version() -> u32 {
    PREFERENCES_VERSION
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            highlight: HighlightPreferences::default(),
        }
    }
}

impl Preferences {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = PREFERENCES_VERSION;
        }
        self.highlight.sanitize();
    }

    /// Settings handed to the keyword highlighter.  
    /// 交給關鍵字著色器的設定值。
    pub fn highlight_settings(&self) -> HighlightSettings {
        HighlightSettings {
            colour: self.highlight.colour(),
            highlight_numbers: self.highlight.highlight_numbers,
        }
    }
}

/// Keyword highlighting options.  
/// 關鍵字著色選項。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightPreferences {
    #[serde(default = "default_colour")]
    pub colour: String,
    #[serde(default = "default_true")]
    pub highlight_numbers: bool,
}

fn default_colour() -> String {
    Color::BLUE.to_hex()
}

fn default_true() -> bool {
    true
}

impl Default for HighlightPreferences {
    fn default() -> Self {
        Self {
            colour: default_colour(),
            highlight_numbers: true,
        }
    }
}

impl HighlightPreferences {
    /// Parsed colour; falls back to blue when the stored value is invalid.
    pub fn colour(&self) -> Color {
        Color::parse(&self.colour).unwrap_or(Color::BLUE)
    }

    fn sanitize(&mut self) {
        match Color::parse(&self.colour) {
            Ok(colour) => self.colour = colour.to_hex(),
            Err(err) => {
                warn!("invalid highlight colour '{}': {err}", self.colour);
                self.colour = default_colour();
            }
        }
    }
}

#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    data: Preferences,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>, preferences: Preferences) -> Self {
        Self {
            path: path.into(),
            data: preferences,
        }
    }

    /// Loads preferences from `path`, or defaults when the file does not exist.  
    /// 讀取偏好設定；檔案不存在時回傳預設值。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self {
                path,
                data: Preferences::default(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| PreferencesError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: Preferences =
            serde_json::from_str(&contents).map_err(|source| PreferencesError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn update<F>(&mut self, mut op: F) -> Result<(), PreferencesError>
    where
        F: FnMut(&mut Preferences),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn overwrite(&mut self, preferences: Preferences) -> Result<(), PreferencesError> {
        self.data = preferences;
        self.data.sanitize();
        self.save()
    }

    /// Writes through a temporary file and renames it over the target.  
    /// 先寫入暫存檔再更名覆蓋，避免半寫入的檔案。
    pub fn save(&self) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PreferencesError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(&self.data).map_err(|source| {
            PreferencesError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| PreferencesError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_highlighter_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.highlight.colour, "#0000FF");
        assert_eq!(prefs.highlight_settings(), HighlightSettings::default());
    }

    #[test]
    fn sanitize_repairs_invalid_colour_and_normalizes_case() {
        let mut prefs = Preferences {
            version: 0,
            highlight: HighlightPreferences {
                colour: "not a colour".into(),
                highlight_numbers: false,
            },
        };
        prefs.sanitize();
        assert_eq!(prefs.version, PREFERENCES_VERSION);
        assert_eq!(prefs.highlight.colour, "#0000FF");
        assert!(!prefs.highlight.highlight_numbers);

        prefs.highlight.colour = "#ff8800".into();
        prefs.sanitize();
        assert_eq!(prefs.highlight.colour, "#FF8800");
        assert_eq!(prefs.highlight_settings().colour, Color::rgb(0xFF, 0x88, 0x00));
    }
}
