use super::{CapturedImage, ImageSource};
use crate::error::{CatalogError, Result};
use tokio::process::Command;
use tracing::debug;

/// 外部コマンドで静止画を1枚撮影
///
/// コマンドは画像データを標準出力に書き出すこと（例: `fswebcam -q --no-banner -`）。
pub struct CommandCamera {
    command: String,
    shots: usize,
}

impl CommandCamera {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            shots: 0,
        }
    }

    fn shell(&self) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

impl ImageSource for CommandCamera {
    async fn next_image(&mut self) -> Result<Option<CapturedImage>> {
        debug!(command = %self.command, "撮影コマンド実行");

        let output = self
            .shell()
            .output()
            .await
            .map_err(|e| CatalogError::Capture(format!("撮影コマンドを起動できません: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CatalogError::Capture(format!(
                "撮影コマンド失敗: {}",
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(CatalogError::Capture("画像データが空です".into()));
        }

        if image::guess_format(&output.stdout).is_err() {
            return Err(CatalogError::Capture("画像形式を判別できません".into()));
        }

        self.shots += 1;
        Ok(Some(CapturedImage::new(
            output.stdout,
            format!("capture-{}", self.shots),
        )))
    }
}
