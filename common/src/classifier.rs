//! OCRテキスト分類モジュール
//!
//! ゲームケース写真のOCRテキストから（ゲーム機, タイトル）を推定する。
//! 入出力なし・状態なしの純粋関数のみ。
//!
//! ## 処理フロー
//! 1. テキストを行に分割（trim、空行除去）
//! 2. ゲーム機検出: Header（先頭2行）→ FullText（全行）の順に照合
//! 3. タイトル抽出: Preferred → ゲーム機名と衝突した場合のみ CollisionRetry（1回のみ）

use crate::types::{
    Classification, ConsoleMatch, ConsolePass, Console, TitleMatch, TitlePass,
};

/// タイトル候補から外すキーワード（部分一致、大文字小文字を無視）
pub const EXCLUSION_KEYWORDS: [&str; 4] = ["edition", "version", "collector", "region"];

/// ゲーム機を優先的に探す先頭行数
pub const HEADER_LINES: usize = 2;

/// タイトル候補とみなす最小文字数（この値より長い行のみ）
pub const MIN_TITLE_CHARS: usize = 4;

impl ConsolePass {
    /// 照合順
    pub const ORDER: [ConsolePass; 2] = [ConsolePass::Header, ConsolePass::FullText];

    /// この段階で走査する行
    pub fn window<'a>(&self, lines: &'a [String]) -> &'a [String] {
        match self {
            ConsolePass::Header => &lines[..lines.len().min(HEADER_LINES)],
            ConsolePass::FullText => lines,
        }
    }
}

/// OCRテキストを行に分割
///
/// 各行をtrimし、空行を除く。順序はOCRの上から下の順のまま。
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// ゲーム機を検出
///
/// 段階ごとに行順→優先順位順で走査し、最初に一致したものを返す。
pub fn detect_console(lines: &[String]) -> Option<ConsoleMatch> {
    ConsolePass::ORDER
        .iter()
        .find_map(|&pass| scan_window(lines, pass))
}

fn scan_window(lines: &[String], pass: ConsolePass) -> Option<ConsoleMatch> {
    pass.window(lines)
        .iter()
        .enumerate()
        .find_map(|(line_index, line)| {
            let lower = line.to_lowercase();
            Console::PRIORITY
                .into_iter()
                .find(|console| console.appears_in(&lower))
                .map(|console| ConsoleMatch { console, pass, line_index })
        })
}

/// 除外キーワードを含むか
pub fn has_exclusion(line: &str) -> bool {
    let lower = line.to_lowercase();
    EXCLUSION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// タイトル候補行（MIN_TITLE_CHARS より長い行）
pub fn title_candidates(lines: &[String]) -> Vec<&str> {
    lines
        .iter()
        .map(String::as_str)
        .filter(|line| line.trim().chars().count() > MIN_TITLE_CHARS)
        .collect()
}

/// タイトルを抽出
///
/// `console` は衝突判定に使うゲーム機名（検出値または手入力値）。
/// 候補行がなければ `None`。
pub fn extract_title(lines: &[String], console: Option<&str>) -> Option<TitleMatch> {
    let candidates = title_candidates(lines);
    let preferred = pick_title(&candidates, TitlePass::Preferred)?;

    let console = console
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());
    let collides = console
        .as_deref()
        .is_some_and(|c| preferred.title.to_lowercase().contains(c));

    if collides && candidates.len() > 1 {
        return pick_title(&candidates[1..], TitlePass::CollisionRetry);
    }

    Some(preferred)
}

fn pick_title(candidates: &[&str], pass: TitlePass) -> Option<TitleMatch> {
    if let Some(line) = candidates.iter().find(|line| !has_exclusion(line)) {
        return Some(TitleMatch {
            title: line.to_string(),
            pass,
            excluded_fallback: false,
        });
    }

    // すべて除外キーワードを含む場合は先頭候補
    candidates.first().map(|line| TitleMatch {
        title: line.to_string(),
        pass,
        excluded_fallback: true,
    })
}

/// OCRテキストを分類
///
/// 空文字列を含むすべての入力に対して結果を返す。
pub fn classify(raw: &str) -> Classification {
    let lines = split_lines(raw);
    let console = detect_console(&lines);
    let title = extract_title(&lines, console.as_ref().map(|m| m.console.label()));
    Classification { console, title }
}

/// 手入力したゲーム機名でタイトルを再抽出
pub fn retitle_for_console(raw: &str, console: &str) -> Option<TitleMatch> {
    extract_title(&split_lines(raw), Some(console))
}
