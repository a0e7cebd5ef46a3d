//! スキャンセッションの状態機械
//!
//! 撮影 → 分類 → 確認 →（編集）→ 保存 を、外部から渡すイベントで進める。
//! 入出力は行わない。撮影・OCR・対話・保存は呼び出し側（scan.rs）の担当。
//!
//! ```text
//! Capturing ──Captured──▶ Classifying ──Recognized──▶ AwaitingConfirmation(prompt)
//!     ▲  └─CaptureEnded─▶ Done                          │ Retry/Skip ─▶ Capturing
//!     │                                                 │ Edit ─▶ Editing ─Edited─▶ AwaitingConfirmation(Review)
//!     └──────────── Saved ◀── Saving ◀── Accept ─────────┘ Quit ─▶ Done
//! ```

use crate::error::{CatalogError, Result};
use game_catalog_common::{
    classify, retitle_for_console, CatalogEntry, Classification, UNKNOWN_CONSOLE, UNKNOWN_TITLE,
};
use tracing::debug;

/// 確認時に何を尋ねるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// 文字が検出されなかった
    NoText,
    /// ゲーム機が検出されなかった
    ConsoleMissing,
    /// 検出結果の確認
    Review,
}

impl Prompt {
    /// この確認で選べる操作
    pub fn allowed(&self) -> &'static [Decision] {
        match self {
            Prompt::NoText => &[Decision::Retry, Decision::Quit],
            Prompt::ConsoleMissing => &[Decision::Retry, Decision::Edit, Decision::Quit],
            Prompt::Review => &[
                Decision::Accept,
                Decision::Edit,
                Decision::Retry,
                Decision::Skip,
                Decision::Quit,
            ],
        }
    }
}

/// 利用者の操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry,
    Edit,
    Accept,
    Skip,
    Quit,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Retry => write!(f, "再スキャン"),
            Decision::Edit => write!(f, "編集"),
            Decision::Accept => write!(f, "保存"),
            Decision::Skip => write!(f, "保存しない"),
            Decision::Quit => write!(f, "終了"),
        }
    }
}

/// 編集の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    /// ゲーム機のみ手入力（タイトルは再抽出）
    ConsoleOnly,
    /// ゲーム機とタイトル
    Full,
}

/// 手入力の内容（`None`・空文字・未検出表記は変更なし）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edit {
    pub console: Option<String>,
    pub title: Option<String>,
}

/// 保存の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Duplicate,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Capturing,
    Classifying,
    AwaitingConfirmation(Prompt),
    Editing(EditScope),
    Saving,
    Done,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Capturing => write!(f, "Capturing"),
            SessionState::Classifying => write!(f, "Classifying"),
            SessionState::AwaitingConfirmation(p) => write!(f, "AwaitingConfirmation({:?})", p),
            SessionState::Editing(s) => write!(f, "Editing({:?})", s),
            SessionState::Saving => write!(f, "Saving"),
            SessionState::Done => write!(f, "Done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Captured,
    CaptureEnded,
    Recognized(String),
    Decided(Decision),
    Edited(Edit),
    Saved(SaveOutcome),
}

impl SessionEvent {
    fn name(&self) -> String {
        match self {
            SessionEvent::Decided(d) => format!("Decided({:?})", d),
            SessionEvent::Saved(o) => format!("Saved({:?})", o),
            SessionEvent::Captured => "Captured".into(),
            SessionEvent::CaptureEnded => "CaptureEnded".into(),
            SessionEvent::Recognized(_) => "Recognized".into(),
            SessionEvent::Edited(_) => "Edited".into(),
        }
    }
}

/// 保存候補
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub raw_text: String,
    pub classification: Classification,
    pub console: String,
    pub title: String,
}

impl Draft {
    fn from_text(raw_text: String) -> Self {
        let classification = classify(&raw_text);
        Self {
            console: classification.console_name().to_string(),
            title: classification.game_title().to_string(),
            classification,
            raw_text,
        }
    }

    pub fn entry(&self) -> CatalogEntry {
        CatalogEntry::new(self.console.clone(), self.title.clone())
    }

    fn apply(&mut self, edit: Edit, scope: EditScope) -> bool {
        let console = edit
            .console
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(UNKNOWN_CONSOLE));
        let title = edit.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());

        if scope == EditScope::ConsoleOnly {
            let Some(console) = console else {
                return false;
            };
            self.title = retitle_for_console(&self.raw_text, &console)
                .map(|m| m.title)
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
            self.console = console;
            return true;
        }

        if let Some(console) = console {
            self.console = console;
        }
        if let Some(title) = title {
            self.title = title;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub captured: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    draft: Option<Draft>,
    stats: SessionStats,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Capturing,
            draft: None,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn is_done(&self) -> bool {
        self.state == SessionState::Done
    }

    /// イベントを適用して次の状態へ
    pub fn handle(&mut self, event: SessionEvent) -> Result<&SessionState> {
        let next = match (&self.state, event) {
            (SessionState::Capturing, SessionEvent::Captured) => {
                self.stats.captured += 1;
                self.draft = None;
                SessionState::Classifying
            }
            (SessionState::Capturing, SessionEvent::CaptureEnded) => SessionState::Done,

            (SessionState::Classifying, SessionEvent::Recognized(text)) => {
                if text.trim().is_empty() {
                    self.draft = None;
                    SessionState::AwaitingConfirmation(Prompt::NoText)
                } else {
                    let draft = Draft::from_text(text);
                    let prompt = if draft.classification.console_detected() {
                        Prompt::Review
                    } else {
                        Prompt::ConsoleMissing
                    };
                    self.draft = Some(draft);
                    SessionState::AwaitingConfirmation(prompt)
                }
            }

            (SessionState::AwaitingConfirmation(prompt), SessionEvent::Decided(decision))
                if prompt.allowed().contains(&decision) =>
            {
                let prompt = *prompt;
                match decision {
                    Decision::Retry => {
                        self.draft = None;
                        SessionState::Capturing
                    }
                    Decision::Edit => match prompt {
                        Prompt::ConsoleMissing => SessionState::Editing(EditScope::ConsoleOnly),
                        _ => SessionState::Editing(EditScope::Full),
                    },
                    Decision::Accept => SessionState::Saving,
                    Decision::Skip => {
                        self.stats.skipped += 1;
                        self.draft = None;
                        SessionState::Capturing
                    }
                    Decision::Quit => SessionState::Done,
                }
            }

            (SessionState::Editing(scope), SessionEvent::Edited(edit)) => {
                let scope = *scope;
                let applied = self
                    .draft
                    .as_mut()
                    .map(|draft| draft.apply(edit, scope))
                    .unwrap_or(false);
                match (applied, scope) {
                    (true, _) => SessionState::AwaitingConfirmation(Prompt::Review),
                    (false, EditScope::ConsoleOnly) => SessionState::AwaitingConfirmation(Prompt::ConsoleMissing),
                    (false, EditScope::Full) => SessionState::AwaitingConfirmation(Prompt::Review),
                }
            }

            (SessionState::Saving, SessionEvent::Saved(outcome)) => {
                match outcome {
                    SaveOutcome::Saved => self.stats.saved += 1,
                    SaveOutcome::Duplicate => self.stats.duplicates += 1,
                    SaveOutcome::Failed(_) => self.stats.failed += 1,
                }
                self.draft = None;
                SessionState::Capturing
            }

            (state, event) => {
                return Err(CatalogError::InvalidTransition {
                    state: state.to_string(),
                    event: event.name(),
                })
            }
        };

        debug!(from = %self.state, to = %next, "状態遷移");
        self.state = next;
        Ok(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognized(session: &mut Session, text: &str) -> SessionState {
        session.handle(SessionEvent::Captured).unwrap();
        session.handle(SessionEvent::Recognized(text.into())).unwrap().clone()
    }

    #[test]
    fn test_starts_capturing() {
        let session = Session::new();
        assert_eq!(session.state(), &SessionState::Capturing);
        assert!(session.draft().is_none());
    }

    #[test]
    fn test_blank_text_asks_no_text() {
        let mut session = Session::new();
        let state = recognized(&mut session, "  \n ");
        assert_eq!(state, SessionState::AwaitingConfirmation(Prompt::NoText));
        assert!(session.draft().is_none());
    }

    #[test]
    fn test_no_text_only_allows_retry_or_quit() {
        let mut session = Session::new();
        recognized(&mut session, "");
        let err = session.handle(SessionEvent::Decided(Decision::Accept)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTransition { .. }));
        // 不正なイベントでは状態は変わらない
        assert_eq!(session.state(), &SessionState::AwaitingConfirmation(Prompt::NoText));

        session.handle(SessionEvent::Decided(Decision::Retry)).unwrap();
        assert_eq!(session.state(), &SessionState::Capturing);
    }

    #[test]
    fn test_review_then_accept_then_saved() {
        let mut session = Session::new();
        let state = recognized(&mut session, "PS4\nBloodborne");
        assert_eq!(state, SessionState::AwaitingConfirmation(Prompt::Review));
        assert_eq!(session.draft().unwrap().entry(), CatalogEntry::new("PS4", "Bloodborne"));

        session.handle(SessionEvent::Decided(Decision::Accept)).unwrap();
        assert_eq!(session.state(), &SessionState::Saving);

        session.handle(SessionEvent::Saved(SaveOutcome::Saved)).unwrap();
        assert_eq!(session.state(), &SessionState::Capturing);
        assert_eq!(session.stats().saved, 1);
        assert_eq!(session.stats().captured, 1);
    }

    #[test]
    fn test_console_missing_manual_entry_retitles() {
        let mut session = Session::new();
        let state = recognized(&mut session, "Dreamcast\nSonic Adventure");
        assert_eq!(state, SessionState::AwaitingConfirmation(Prompt::ConsoleMissing));

        session.handle(SessionEvent::Decided(Decision::Edit)).unwrap();
        assert_eq!(session.state(), &SessionState::Editing(EditScope::ConsoleOnly));

        session
            .handle(SessionEvent::Edited(Edit {
                console: Some(" Dreamcast ".into()),
                title: None,
            }))
            .unwrap();
        assert_eq!(session.state(), &SessionState::AwaitingConfirmation(Prompt::Review));
        assert_eq!(session.draft().unwrap().entry(), CatalogEntry::new("Dreamcast", "Sonic Adventure"));
    }

    #[test]
    fn test_console_missing_blank_edit_asks_again() {
        let mut session = Session::new();
        recognized(&mut session, "Sonic Adventure");
        session.handle(SessionEvent::Decided(Decision::Edit)).unwrap();
        session.handle(SessionEvent::Edited(Edit::default())).unwrap();
        assert_eq!(session.state(), &SessionState::AwaitingConfirmation(Prompt::ConsoleMissing));
    }

    #[test]
    fn test_console_missing_unknown_label_is_not_accepted() {
        let mut session = Session::new();
        recognized(&mut session, "Sonic Adventure");
        session.handle(SessionEvent::Decided(Decision::Edit)).unwrap();
        assert_eq!(session.state(), &SessionState::Editing(EditScope::ConsoleOnly));

        session
            .handle(SessionEvent::Edited(Edit {
                console: Some("Unknown Console".into()),
                title: None,
            }))
            .unwrap();
        assert_eq!(session.state(), &SessionState::AwaitingConfirmation(Prompt::ConsoleMissing));
        assert_eq!(session.draft().unwrap().console, UNKNOWN_CONSOLE);
    }

    #[test]
    fn test_full_edit_overrides_both_fields() {
        let mut session = Session::new();
        recognized(&mut session, "Switch\nZeIda Breath of the WiId");
        session.handle(SessionEvent::Decided(Decision::Edit)).unwrap();
        assert_eq!(session.state(), &SessionState::Editing(EditScope::Full));

        session
            .handle(SessionEvent::Edited(Edit {
                console: Some("".into()),
                title: Some("Zelda: Breath of the Wild".into()),
            }))
            .unwrap();
        let draft = session.draft().unwrap();
        assert_eq!(draft.console, "Switch");
        assert_eq!(draft.title, "Zelda: Breath of the Wild");
    }

    #[test]
    fn test_skip_and_duplicate_continue_loop() {
        let mut session = Session::new();
        recognized(&mut session, "PS5\nReturnal");
        session.handle(SessionEvent::Decided(Decision::Skip)).unwrap();
        assert_eq!(session.state(), &SessionState::Capturing);

        recognized(&mut session, "PS5\nReturnal");
        session.handle(SessionEvent::Decided(Decision::Accept)).unwrap();
        session.handle(SessionEvent::Saved(SaveOutcome::Duplicate)).unwrap();
        assert_eq!(session.state(), &SessionState::Capturing);

        let stats = session.stats();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.captured, 2);
    }

    #[test]
    fn test_capture_ended_and_quit_finish() {
        let mut session = Session::new();
        session.handle(SessionEvent::CaptureEnded).unwrap();
        assert!(session.is_done());

        let mut session = Session::new();
        recognized(&mut session, "Wii\nWii Sports Resort");
        session.handle(SessionEvent::Decided(Decision::Quit)).unwrap();
        assert!(session.is_done());
    }

    #[test]
    fn test_events_rejected_out_of_order() {
        let mut session = Session::new();
        assert!(session.handle(SessionEvent::Recognized("PS4".into())).is_err());
        assert!(session.handle(SessionEvent::Saved(SaveOutcome::Saved)).is_err());
        assert_eq!(session.state(), &SessionState::Capturing);
    }
}
