//! カタログ（メモリ上）
//!
//! ヘッダーを除いたデータ行を保持する。
//! 挿入のたびに全体を（ゲーム機, タイトル）の小文字順で並べ直す。

use crate::types::CatalogEntry;
use serde::{Deserialize, Serialize};

/// 重複挿入の拒否
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate(pub CatalogEntry);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 読み込んだ行をそのままの順序で保持
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 大文字小文字を無視して同じ組があるか
    pub fn contains(&self, entry: &CatalogEntry) -> bool {
        self.entries.iter().any(|e| e.same_as(entry))
    }

    /// 追加して全体を並べ直す
    ///
    /// 既にある組なら何も変更せず `Duplicate` を返す。
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<(), Duplicate> {
        if self.contains(&entry) {
            return Err(Duplicate(entry));
        }
        self.entries.push(entry);
        self.sort();
        Ok(())
    }

    /// （ゲーム機, タイトル）の小文字で昇順ソート（安定ソート）
    pub fn sort(&mut self) {
        self.entries.sort_by_cached_key(CatalogEntry::sort_key);
    }

    pub fn is_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| w[0].sort_key() <= w[1].sort_key())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
