use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "OCR_SPACE_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub ocr_endpoint: String,
    pub language: String,
    pub catalog_path: PathBuf,
    /// 静止画1枚を標準出力に書き出すコマンド（例: `fswebcam -q --no-banner -`）
    pub camera_command: Option<String>,
    pub max_upload_bytes: usize,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            ocr_endpoint: "https://api.ocr.space/parse/image".into(),
            language: "eng".into(),
            catalog_path: PathBuf::from("GameLibrary.xlsx"),
            camera_command: None,
            max_upload_bytes: 1024 * 1024,  // OCR.Space無料プランの上限
            timeout_seconds: 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CatalogError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("game-catalog").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CatalogError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_camera_command(&mut self, command: String) -> Result<()> {
        self.camera_command = Some(command);
        self.save()
    }
}
