//! 撮影モジュール
//!
//! 静止画1枚を要求ごとに返す。
//! - CommandCamera: 外部コマンド（標準出力に画像を書き出す）
//! - FolderSource: フォルダ内の写真を順に返す

mod camera;
pub mod folder;

pub use camera::CommandCamera;
pub use folder::{scan_folder, ImageInfo};

use crate::error::{CatalogError, Result};
use std::collections::VecDeque;
use std::path::Path;
use tracing::debug;

/// 撮影した画像
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    /// 表示用（ファイル名など）
    pub label: String,
}

impl CapturedImage {
    pub fn new(bytes: Vec<u8>, label: impl Into<String>) -> Self {
        Self {
            bytes,
            label: label.into(),
        }
    }

    /// 画像形式を判別してMIMEタイプを返す（不明ならJPEG扱い）
    pub fn mime_type(&self) -> &'static str {
        image::guess_format(&self.bytes)
            .map(|f| f.to_mime_type())
            .unwrap_or("image/jpeg")
    }
}

/// 画像の供給元
#[allow(async_fn_in_trait)]
pub trait ImageSource {
    /// 次の画像。供給が終わったら `None`
    async fn next_image(&mut self) -> Result<Option<CapturedImage>>;

    /// 1枚の失敗を飛ばして次へ進めるか
    fn skips_failed_image(&self) -> bool {
        false
    }
}

/// フォルダ内の写真を1枚ずつ返す
pub struct FolderSource {
    queue: VecDeque<ImageInfo>,
}

impl FolderSource {
    pub fn open(folder: &Path) -> Result<Self> {
        let images = scan_folder(folder)?;
        debug!(folder = %folder.display(), count = images.len(), "写真フォルダを読み込み");
        Ok(Self {
            queue: images.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl ImageSource for FolderSource {
    async fn next_image(&mut self) -> Result<Option<CapturedImage>> {
        let Some(info) = self.queue.pop_front() else {
            return Ok(None);
        };
        let bytes = tokio::fs::read(&info.path)
            .await
            .map_err(|e| CatalogError::Capture(format!("{}: {}", info.file_name, e)))?;
        Ok(Some(CapturedImage::new(bytes, info.file_name)))
    }

    fn skips_failed_image(&self) -> bool {
        true
    }
}
