//! 端末での対話（dialoguer）

use crate::error::{CatalogError, Result};
use crate::scan::{Notice, Operator};
use crate::session::{Decision, Draft, Edit, EditScope, Prompt};
use dialoguer::{Confirm, Input, Password, Select};

pub struct TerminalOperator {
    source_label: String,
}

impl TerminalOperator {
    pub fn new(source_label: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
        }
    }
}

fn prompt_error(e: dialoguer::Error) -> CatalogError {
    CatalogError::Prompt(e.to_string())
}

impl Operator for TerminalOperator {
    fn ready_to_capture(&mut self) -> Result<bool> {
        let items = [format!("📸 撮影する ({})", self.source_label), "終了".to_string()];
        let choice = Select::new()
            .with_prompt("ゲームケースをスキャン")
            .items(&items)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        Ok(choice == 0)
    }

    fn decide(&mut self, prompt: Prompt, _draft: Option<&Draft>) -> Result<Decision> {
        let allowed = prompt.allowed();
        let title = match prompt {
            Prompt::NoText => "再スキャンしますか？",
            Prompt::ConsoleMissing => "再スキャンするか、ゲーム機を手入力してください",
            Prompt::Review => "💾 このエントリをどうしますか？",
        };
        let labels: Vec<String> = allowed.iter().map(|d| d.to_string()).collect();

        let choice = Select::new()
            .with_prompt(title)
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        Ok(allowed[choice])
    }

    fn edit(&mut self, scope: EditScope, draft: &Draft) -> Result<Edit> {
        // 未検出時は初期値なし（空のまま確定すると再度確認に戻る）
        let mut input = Input::<String>::new().with_prompt("ゲーム機").allow_empty(true);
        if scope == EditScope::Full {
            input = input.with_initial_text(draft.console.clone());
        }
        let console = input.interact_text().map_err(prompt_error)?;

        let title = match scope {
            EditScope::ConsoleOnly => None,
            EditScope::Full => Some(
                Input::<String>::new()
                    .with_prompt("タイトル")
                    .with_initial_text(draft.title.clone())
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_error)?,
            ),
        };

        Ok(Edit {
            console: Some(console),
            title,
        })
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Captured(label) => println!("✅ 画像を取得: {}", label),
            Notice::CaptureFailed(message) => println!("❌ {}（次の写真へ進みます）", message),
            Notice::NoText => println!("❌ 文字が検出されませんでした"),
            Notice::ConsoleMissing => println!("❌ ゲーム機が検出されませんでした"),
            Notice::Detected { raw_text, console, title } => {
                println!("\n📝 OCR結果:");
                println!("{}", raw_text.trim_end());
                println!("\n🎮 ゲーム機: {}", console);
                println!("🎯 タイトル: {}\n", title);
            }
            Notice::Saved { entry, total } => println!("✔ 保存しました: {} （全{}件）", entry, total),
            Notice::Duplicate(entry) => println!("⚠ 既に登録されています: {}", entry),
            Notice::SaveFailed(message) => {
                println!("❌ {}", message);
                println!("  ファイルを閉じてから再度お試しください");
            }
        }
    }
}

/// APIキーを対話的に入力（必要なら設定に保存）
pub fn ask_api_key() -> Result<(String, bool)> {
    let key = Password::new()
        .with_prompt("OCR.Space APIキー")
        .interact()
        .map_err(prompt_error)?;
    let remember = Confirm::new()
        .with_prompt("設定ファイルに保存しますか？")
        .default(false)
        .interact()
        .map_err(prompt_error)?;
    Ok((key, remember))
}
