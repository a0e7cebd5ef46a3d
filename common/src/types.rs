//! カタログの型定義
//!
//! CLIとテストで共有される型:
//! - Console: 既知のゲーム機（優先順位付き）
//! - CatalogEntry: 永続化の単位（ゲーム機, タイトル）
//! - Classification: OCRテキストの分類結果

use serde::{Deserialize, Serialize};

/// ゲーム機が検出できなかった場合の表示値
pub const UNKNOWN_CONSOLE: &str = "Unknown Console";

/// タイトルが抽出できなかった場合の表示値
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// カタログファイルのヘッダー行
pub const CATALOG_HEADER: [&str; 2] = ["Console", "Game Title"];

/// 既知のゲーム機
///
/// 宣言順がそのまま照合の優先順位になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Console {
    Ps3,
    Ps4,
    Ps5,
    Xbox360,
    XboxOne,
    XboxSeriesX,
    Wii,
    Switch,
    GameCube,
}

impl Console {
    /// 照合の優先順位
    pub const PRIORITY: [Console; 9] = [
        Console::Ps3,
        Console::Ps4,
        Console::Ps5,
        Console::Xbox360,
        Console::XboxOne,
        Console::XboxSeriesX,
        Console::Wii,
        Console::Switch,
        Console::GameCube,
    ];

    /// カタログに書き込む表記
    pub fn label(&self) -> &'static str {
        match self {
            Console::Ps3 => "PS3",
            Console::Ps4 => "PS4",
            Console::Ps5 => "PS5",
            Console::Xbox360 => "Xbox 360",
            Console::XboxOne => "Xbox One",
            Console::XboxSeriesX => "Xbox Series X",
            Console::Wii => "Wii",
            Console::Switch => "Switch",
            Console::GameCube => "GameCube",
        }
    }

    /// 行にこのゲーム機名が含まれるか（大文字小文字を無視）
    pub fn appears_in(&self, lowercase_line: &str) -> bool {
        lowercase_line.contains(&self.label().to_lowercase())
    }
}

impl std::fmt::Display for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// カタログの1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub console: String,
    pub title: String,
}

impl CatalogEntry {
    pub fn new(console: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            console: console.into(),
            title: title.into(),
        }
    }

    /// ソートキー（ゲーム機, タイトル）の小文字
    pub fn sort_key(&self) -> (String, String) {
        (self.console.to_lowercase(), self.title.to_lowercase())
    }

    /// 大文字小文字を無視して同一か判定
    pub fn same_as(&self, other: &CatalogEntry) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl std::fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.console, self.title)
    }
}

/// ゲーム機検出の段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsolePass {
    /// 先頭2行のみ
    Header,
    /// 全行
    FullText,
}

/// タイトル抽出の段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitlePass {
    /// 候補行すべてから選択
    Preferred,
    /// ゲーム機名と衝突したため先頭候補を除いて再選択
    CollisionRetry,
}

/// ゲーム機の検出結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleMatch {
    pub console: Console,
    pub pass: ConsolePass,
    /// 一致した行（LineSequence上の位置）
    pub line_index: usize,
}

/// タイトルの抽出結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMatch {
    pub title: String,
    pub pass: TitlePass,
    /// 除外キーワードを含む行しかなく、先頭候補を採用した
    pub excluded_fallback: bool,
}

/// OCRテキストの分類結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub console: Option<ConsoleMatch>,
    pub title: Option<TitleMatch>,
}

impl Classification {
    /// ゲーム機名（未検出なら UNKNOWN_CONSOLE）
    pub fn console_name(&self) -> &str {
        self.console
            .as_ref()
            .map(|m| m.console.label())
            .unwrap_or(UNKNOWN_CONSOLE)
    }

    /// タイトル（未検出なら UNKNOWN_TITLE）
    pub fn game_title(&self) -> &str {
        self.title
            .as_ref()
            .map(|m| m.title.as_str())
            .unwrap_or(UNKNOWN_TITLE)
    }

    pub fn console_detected(&self) -> bool {
        self.console.is_some()
    }
}
