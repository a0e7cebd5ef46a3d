//! スキャンループの統合テスト
//!
//! 撮影・OCR・対話をスクリプトで差し替え、実ファイルのカタログに保存する

use game_catalog::capture::{CapturedImage, FolderSource, ImageSource};
use game_catalog::error::{CatalogError, Result};
use game_catalog::ocr::TextRecognizer;
use game_catalog::scan::{run_session, Notice, Operator};
use game_catalog::session::{Decision, Draft, Edit, EditScope, Prompt};
use game_catalog::store::CatalogStore;
use game_catalog_common::CatalogEntry;
use std::collections::VecDeque;
use tempfile::tempdir;

/// ラベルをそのままOCR結果として返す
struct LabelAsText;

impl TextRecognizer for LabelAsText {
    async fn recognize(&self, image: &CapturedImage) -> Result<String> {
        Ok(image.label.clone())
    }
}

struct Script {
    images: VecDeque<&'static str>,
}

impl Script {
    fn new(texts: &[&'static str]) -> Self {
        Self { images: texts.iter().copied().collect() }
    }
}

impl ImageSource for Script {
    async fn next_image(&mut self) -> Result<Option<CapturedImage>> {
        Ok(self.images.pop_front().map(|text| CapturedImage::new(vec![0xFF, 0xD8], text)))
    }
}

#[derive(Default)]
struct ScriptedOperator {
    decisions: VecDeque<Decision>,
    edits: VecDeque<Edit>,
    prompts: Vec<Prompt>,
    notices: Vec<Notice>,
}

impl Operator for ScriptedOperator {
    fn ready_to_capture(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn decide(&mut self, prompt: Prompt, _draft: Option<&Draft>) -> Result<Decision> {
        self.prompts.push(prompt);
        Ok(self.decisions.pop_front().unwrap_or(Decision::Quit))
    }

    fn edit(&mut self, _scope: EditScope, _draft: &Draft) -> Result<Edit> {
        Ok(self.edits.pop_front().unwrap_or_default())
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

fn store_in(dir: &tempfile::TempDir) -> CatalogStore {
    let store = CatalogStore::new(dir.path().join("GameLibrary.xlsx"));
    store.ensure_initialized().unwrap();
    store
}

#[tokio::test]
async fn test_full_session_saves_sorted_and_deduplicated() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = store_in(&dir);

    let mut source = Script::new(&[
        "Nintendo Switch\nThe Legend of Zelda",
        "",
        "PS4\nBloodborne",
        "ps4\nBLOODBORNE",
        "Sega Dreamcast\nSonic Adventure",
    ]);
    let mut operator = ScriptedOperator {
        decisions: VecDeque::from([
            Decision::Accept,  // Zelda
            Decision::Retry,   // 文字なし
            Decision::Accept,  // Bloodborne
            Decision::Accept,  // 重複
            Decision::Edit,    // ゲーム機なし → 手入力
            Decision::Accept,
        ]),
        edits: VecDeque::from([Edit {
            console: Some("Dreamcast".into()),
            title: None,
        }]),
        ..Default::default()
    };

    let stats = run_session(&mut source, &LabelAsText, &mut operator, &store)
        .await
        .unwrap();

    assert_eq!(stats.captured, 5);
    assert_eq!(stats.saved, 3);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(
        operator.prompts,
        vec![
            Prompt::Review,
            Prompt::NoText,
            Prompt::Review,
            Prompt::Review,
            Prompt::ConsoleMissing,
            Prompt::Review,
        ]
    );
    assert!(operator
        .notices
        .contains(&Notice::Duplicate(CatalogEntry::new("PS4", "BLOODBORNE"))));

    let catalog = store.load_entries().unwrap();
    assert_eq!(
        catalog.entries(),
        &[
            CatalogEntry::new("Dreamcast", "Sonic Adventure"),
            CatalogEntry::new("PS4", "Bloodborne"),
            CatalogEntry::new("Switch", "The Legend of Zelda"),
        ]
    );
}

#[tokio::test]
async fn test_quit_and_skip_write_nothing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = store_in(&dir);

    let mut source = Script::new(&["Wii\nWii Sports Resort", "GameCube\nPikmin 2"]);
    let mut operator = ScriptedOperator {
        decisions: VecDeque::from([Decision::Skip, Decision::Quit]),
        ..Default::default()
    };

    let stats = run_session(&mut source, &LabelAsText, &mut operator, &store)
        .await
        .unwrap();

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.saved, 0);
    assert!(store.load_entries().unwrap().is_empty());
}

#[tokio::test]
async fn test_save_failure_keeps_loop_running() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("GameLibrary.xlsx");
    std::fs::write(&path, b"locked by another program").unwrap();
    let store = CatalogStore::new(&path);

    let mut source = Script::new(&["PS5\nReturnal", "PS5\nDemon's Souls"]);
    let mut operator = ScriptedOperator {
        decisions: VecDeque::from([Decision::Accept, Decision::Accept]),
        ..Default::default()
    };

    let stats = run_session(&mut source, &LabelAsText, &mut operator, &store)
        .await
        .unwrap();

    assert_eq!(stats.captured, 2);
    assert_eq!(stats.failed, 2);
    assert!(operator.notices.iter().any(|n| matches!(n, Notice::SaveFailed(_))));
    assert_eq!(std::fs::read(&path).unwrap(), b"locked by another program");
}

#[tokio::test]
async fn test_unreadable_folder_image_is_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = store_in(&dir);
    let photos = dir.path().join("photos");
    std::fs::create_dir(&photos).unwrap();
    std::fs::write(photos.join("1.jpg"), b"one").unwrap();
    std::fs::write(photos.join("2.jpg"), b"two").unwrap();

    let mut source = FolderSource::open(&photos).unwrap();
    std::fs::remove_file(photos.join("1.jpg")).unwrap();

    let mut operator = ScriptedOperator {
        decisions: VecDeque::from([Decision::Quit]),
        ..Default::default()
    };

    let stats = run_session(&mut source, &LabelAsText, &mut operator, &store)
        .await
        .unwrap();

    assert_eq!(stats.captured, 1);
    assert!(matches!(&operator.notices[0], Notice::CaptureFailed(m) if m.contains("1.jpg")));
    assert_eq!(operator.notices[1], Notice::Captured("2.jpg".into()));
    assert_eq!(operator.prompts, vec![Prompt::ConsoleMissing]);
}

/// 撮影に失敗するカメラ
struct BrokenCamera;

impl ImageSource for BrokenCamera {
    async fn next_image(&mut self) -> Result<Option<CapturedImage>> {
        Err(CatalogError::Capture("カメラが接続されていません".into()))
    }
}

#[tokio::test]
async fn test_camera_failure_ends_session() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = store_in(&dir);
    let mut operator = ScriptedOperator::default();

    let result = run_session(&mut BrokenCamera, &LabelAsText, &mut operator, &store).await;

    assert!(matches!(result, Err(CatalogError::Capture(_))));
}
