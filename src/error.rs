use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("OCR APIキーが設定されていません。`game-catalog config --set-api-key YOUR_KEY` か環境変数 OCR_SPACE_API_KEY で設定してください")]
    MissingApiKey,

    #[error("カタログファイルを利用できません ({}): {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("既に登録されています: {console} - {title}")]
    DuplicateEntry { console: String, title: String },

    #[error("OCR APIキーが無効です。キーを確認してください")]
    InvalidApiKey,

    #[error("画像サイズが大きすぎます: {0}。解像度を下げてください")]
    PayloadTooLarge(String),

    #[error("OCR処理エラー: {0}")]
    OcrService(String),

    #[error("OCR通信エラー: {0}")]
    OcrRequest(#[from] reqwest::Error),

    #[error("撮影エラー: {0}")]
    Capture(String),

    #[error("状態 {state} ではイベント {event} を受け付けられません")]
    InvalidTransition { state: String, event: String },

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn storage(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        CatalogError::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// 保存時に出た場合はループを継続できるエラー
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CatalogError::StorageUnavailable { .. } | CatalogError::DuplicateEntry { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
