use clap::Parser;
use game_catalog::{capture, cli, config, error, ocr, prompt, scan, store};
use cli::{Cli, Commands};
use config::Config;
use error::{CatalogError, Result};
use game_catalog_common::{classify, CatalogEntry, Classification};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use store::CatalogStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "終了");
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "game_catalog=debug"
    } else {
        "game_catalog=info"
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    let catalog_path = cli.catalog.clone().unwrap_or_else(|| config.catalog_path.clone());
    let store = CatalogStore::new(catalog_path);

    match cli.command {
        Commands::Scan { folder, camera } => {
            println!("🎮 game-catalog - ゲームケーススキャン\n");

            // カタログを作成できなければ続行しない
            if store.ensure_initialized()? {
                println!("✔ カタログを作成: {}", store.path().display());
            }

            let api_key = match config.get_api_key() {
                Ok(key) => key,
                Err(CatalogError::MissingApiKey) => {
                    let (key, remember) = prompt::ask_api_key()?;
                    if remember {
                        config.set_api_key(key.clone())?;
                        println!("✔ APIキーを保存しました");
                    }
                    key
                }
                Err(e) => return Err(e),
            };
            let recognizer = ocr::OcrSpaceClient::new(api_key, &config)?;

            let stats = if let Some(folder) = folder {
                let mut source = capture::FolderSource::open(&folder)?;
                println!("✔ {}枚の写真を検出\n", source.remaining());
                let mut operator = prompt::TerminalOperator::new(folder.display().to_string());
                scan::run_session(&mut source, &recognizer, &mut operator, &store).await?
            } else {
                let command = camera.or(config.camera_command.clone()).ok_or_else(|| {
                    CatalogError::Config(
                        "撮影コマンドが未設定です。`game-catalog config --set-camera CMD` か --folder を指定してください".into(),
                    )
                })?;
                let mut source = capture::CommandCamera::new(command);
                let mut operator = prompt::TerminalOperator::new("カメラ");
                scan::run_session(&mut source, &recognizer, &mut operator, &store).await?
            };

            println!("\n✅ スキャン終了");
            println!("  撮影: {}件", stats.captured);
            println!("  保存: {}件", stats.saved);
            println!("  重複: {}件", stats.duplicates);
            println!("  保存しない: {}件", stats.skipped);
            if stats.failed > 0 {
                println!("  保存失敗: {}件", stats.failed);
            }
        }

        Commands::Classify { input, json } => {
            let text = read_text(input)?;
            let result = classify(&text);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_classification(&result);
            }
        }

        Commands::Add { console, title } => {
            store.ensure_initialized()?;

            let entry = CatalogEntry::new(console.trim(), title.trim());
            if entry.console.is_empty() || entry.title.is_empty() {
                return Err(CatalogError::Config("ゲーム機とタイトルは空にできません".into()));
            }

            match store.append_and_resort(entry.clone()) {
                Ok(catalog) => println!("✔ 保存しました: {} （全{}件）", entry, catalog.len()),
                Err(CatalogError::DuplicateEntry { .. }) => println!("⚠ 既に登録されています: {}", entry),
                Err(e) => return Err(e),
            }
        }

        Commands::List => {
            if !store.path().exists() {
                println!("カタログファイルが存在しません: {}", store.path().display());
                return Ok(());
            }

            let catalog = store.load_entries()?;
            println!("📚 {} （{}件）\n", store.path().display(), catalog.len());
            for entry in &catalog {
                println!("  {:<16} {}", entry.console, entry.title);
            }
        }

        Commands::Config { set_api_key, set_camera, show } => {
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(command) = set_camera {
                config.set_camera_command(command)?;
                println!("✔ 撮影コマンドを設定しました");
            }

            if show {
                println!("設定:");
                println!("  OCRエンドポイント: {}", config.ocr_endpoint);
                println!("  OCR言語: {}", config.language);
                println!("  カタログ: {}", config.catalog_path.display());
                println!("  撮影コマンド: {}", config.camera_command.as_deref().unwrap_or("未設定"));
                println!("  送信上限: {} bytes", config.max_upload_bytes);
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn read_text(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn print_classification(result: &Classification) {
    match &result.console {
        Some(m) => println!("🎮 ゲーム機: {} ({:?}, {}行目)", m.console, m.pass, m.line_index + 1),
        None => println!("🎮 ゲーム機: {} (未検出)", result.console_name()),
    }
    match &result.title {
        Some(m) if m.excluded_fallback => println!("🎯 タイトル: {} ({:?}, 除外語を含む)", m.title, m.pass),
        Some(m) => println!("🎯 タイトル: {} ({:?})", m.title, m.pass),
        None => println!("🎯 タイトル: {} (未検出)", result.game_title()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_shows_info() {
        assert_eq!(default_filter(false), "game_catalog=info");
        assert_eq!(default_filter(true), "game_catalog=debug");
    }
}
