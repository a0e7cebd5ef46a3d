//! スキャンループ
//!
//! `Session` の状態ごとに撮影・OCR・対話・保存を行い、結果をイベントとして戻す。

use crate::capture::{CapturedImage, ImageSource};
use crate::error::{CatalogError, Result};
use crate::ocr::{recognize_or_empty, TextRecognizer};
use crate::session::{Decision, Draft, Edit, EditScope, Prompt, SaveOutcome, Session, SessionEvent, SessionState, SessionStats};
use crate::store::CatalogStore;
use game_catalog_common::CatalogEntry;
use tracing::{error, warn};

/// 利用者への通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Captured(String),
    CaptureFailed(String),
    NoText,
    ConsoleMissing,
    Detected { raw_text: String, console: String, title: String },
    Saved { entry: CatalogEntry, total: usize },
    Duplicate(CatalogEntry),
    SaveFailed(String),
}

/// 対話の相手（端末・GUI・テスト用スクリプトなど）
pub trait Operator {
    /// 撮影するか（`false` で終了）
    fn ready_to_capture(&mut self) -> Result<bool>;

    /// 確認で操作を選ぶ（`prompt.allowed()` の中から）
    fn decide(&mut self, prompt: Prompt, draft: Option<&Draft>) -> Result<Decision>;

    /// 手入力
    fn edit(&mut self, scope: EditScope, draft: &Draft) -> Result<Edit>;

    fn notify(&mut self, notice: Notice);
}

/// 1セッションを終了まで実行
pub async fn run_session<S, R, O>(
    source: &mut S,
    recognizer: &R,
    operator: &mut O,
    store: &CatalogStore,
) -> Result<SessionStats>
where
    S: ImageSource,
    R: TextRecognizer,
    O: Operator,
{
    let mut session = Session::new();
    let mut pending: Option<CapturedImage> = None;

    while !session.is_done() {
        let event = match session.state().clone() {
            SessionState::Capturing => {
                if !operator.ready_to_capture()? {
                    SessionEvent::CaptureEnded
                } else {
                    match source.next_image().await {
                        Ok(Some(image)) => {
                            operator.notify(Notice::Captured(image.label.clone()));
                            pending = Some(image);
                            SessionEvent::Captured
                        }
                        Ok(None) => SessionEvent::CaptureEnded,
                        Err(e) if source.skips_failed_image() => {
                            warn!(error = %e, "画像を読み込めないため次へ");
                            operator.notify(Notice::CaptureFailed(e.to_string()));
                            continue;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }

            SessionState::Classifying => {
                let image = pending.take().ok_or_else(|| CatalogError::InvalidTransition {
                    state: SessionState::Classifying.to_string(),
                    event: "画像なし".into(),
                })?;
                SessionEvent::Recognized(recognize_or_empty(recognizer, &image).await)
            }

            SessionState::AwaitingConfirmation(prompt) => {
                match prompt {
                    Prompt::NoText => operator.notify(Notice::NoText),
                    Prompt::ConsoleMissing => operator.notify(Notice::ConsoleMissing),
                    Prompt::Review => {
                        if let Some(draft) = session.draft() {
                            operator.notify(Notice::Detected {
                                raw_text: draft.raw_text.clone(),
                                console: draft.console.clone(),
                                title: draft.title.clone(),
                            });
                        }
                    }
                }
                SessionEvent::Decided(operator.decide(prompt, session.draft())?)
            }

            SessionState::Editing(scope) => {
                let draft = session.draft().ok_or_else(|| CatalogError::InvalidTransition {
                    state: SessionState::Editing(scope).to_string(),
                    event: "保存候補なし".into(),
                })?;
                SessionEvent::Edited(operator.edit(scope, draft)?)
            }

            SessionState::Saving => {
                let entry = session
                    .draft()
                    .map(Draft::entry)
                    .ok_or_else(|| CatalogError::InvalidTransition {
                        state: SessionState::Saving.to_string(),
                        event: "保存候補なし".into(),
                    })?;
                SessionEvent::Saved(save(store, entry, operator)?)
            }

            SessionState::Done => break,
        };

        session.handle(event)?;
    }

    Ok(session.stats())
}

fn save<O: Operator>(store: &CatalogStore, entry: CatalogEntry, operator: &mut O) -> Result<SaveOutcome> {
    match store.append_and_resort(entry.clone()) {
        Ok(catalog) => {
            operator.notify(Notice::Saved {
                entry,
                total: catalog.len(),
            });
            Ok(SaveOutcome::Saved)
        }
        Err(CatalogError::DuplicateEntry { .. }) => {
            warn!(console = %entry.console, title = %entry.title, "重複のため保存しません");
            operator.notify(Notice::Duplicate(entry));
            Ok(SaveOutcome::Duplicate)
        }
        Err(e) if e.is_recoverable() => {
            error!(error = %e, "保存失敗");
            let message = e.to_string();
            operator.notify(Notice::SaveFailed(message.clone()));
            Ok(SaveOutcome::Failed(message))
        }
        Err(e) => Err(e),
    }
}
