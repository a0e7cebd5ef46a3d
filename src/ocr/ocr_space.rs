//! OCR.Space API クライアント
//!
//! 画像はbase64のデータURIとしてフォーム送信する。
//! レスポンス: `ParsedResults[0].ParsedText`、エラー時は `IsErroredOnProcessing` と `ErrorMessage`。

use super::TextRecognizer;
use crate::capture::CapturedImage;
use crate::config::Config;
use crate::error::{CatalogError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub struct OcrSpaceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    language: String,
    max_upload_bytes: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct OcrSpaceResponse {
    parsed_results: Option<Vec<ParsedResult>>,
    is_errored_on_processing: bool,
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ParsedResult {
    parsed_text: String,
}

impl OcrSpaceClient {
    pub fn new(api_key: impl Into<String>, config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.ocr_endpoint.clone(),
            api_key: api_key.into(),
            language: config.language.clone(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    async fn request(&self, image: &CapturedImage) -> Result<String> {
        if image.bytes.len() > self.max_upload_bytes {
            return Err(CatalogError::PayloadTooLarge(format!(
                "{} bytes（上限 {} bytes）",
                image.bytes.len(),
                self.max_upload_bytes
            )));
        }

        let data_uri = format!(
            "data:{};base64,{}",
            image.mime_type(),
            STANDARD.encode(&image.bytes)
        );
        let form = [
            ("apikey", self.api_key.as_str()),
            ("language", self.language.as_str()),
            ("isOverlayRequired", "false"),
            ("base64Image", data_uri.as_str()),
        ];

        let response = self.http.post(&self.endpoint).form(&form).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(CatalogError::InvalidApiKey),
            StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(CatalogError::PayloadTooLarge(format!("{} bytes", image.bytes.len())))
            }
            _ => {}
        }

        let body: OcrSpaceResponse = response.error_for_status()?.json().await?;
        body.into_text()
    }
}

impl TextRecognizer for OcrSpaceClient {
    async fn recognize(&self, image: &CapturedImage) -> Result<String> {
        debug!(image = %image.label, bytes = image.bytes.len(), "OCR.Spaceへ送信");

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("📡 OCR.Spaceへ送信中...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.request(image).await;
        spinner.finish_and_clear();
        result
    }
}

impl OcrSpaceResponse {
    fn into_text(self) -> Result<String> {
        if self.is_errored_on_processing {
            let message = self
                .error_message
                .as_ref()
                .map(error_text)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(classify_service_error(message));
        }

        Ok(self
            .parsed_results
            .and_then(|results| results.into_iter().next())
            .map(|r| r.parsed_text)
            .unwrap_or_default())
    }
}

/// ErrorMessage は文字列または文字列配列
fn error_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn classify_service_error(message: String) -> CatalogError {
    let lower = message.to_lowercase();
    if lower.contains("api key") {
        CatalogError::InvalidApiKey
    } else if lower.contains("file size") {
        CatalogError::PayloadTooLarge(message)
    } else {
        CatalogError::OcrService(message)
    }
}
