//! OCRモジュール
//!
//! 画像 → 生テキスト。失敗は型付きエラーで返し、
//! `recognize_or_empty` で空文字列に畳み込んで「文字なし」と同じ扱いにする。

mod ocr_space;

pub use ocr_space::OcrSpaceClient;

use crate::capture::CapturedImage;
use crate::error::Result;
use tracing::warn;

#[allow(async_fn_in_trait)]
pub trait TextRecognizer {
    async fn recognize(&self, image: &CapturedImage) -> Result<String>;
}

/// OCRを実行し、失敗時は空文字列を返す
pub async fn recognize_or_empty<R: TextRecognizer>(recognizer: &R, image: &CapturedImage) -> String {
    match recognizer.recognize(image).await {
        Ok(text) => text,
        Err(e) => {
            warn!(image = %image.label, error = %e, "OCR失敗");
            println!("❌ {}", e);
            String::new()
        }
    }
}
