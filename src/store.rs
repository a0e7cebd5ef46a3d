//! カタログファイル（xlsx）の永続化
//!
//! - 読み込み: calamine（バイト列から）
//! - 書き込み: common の excel_core でバッファ生成 → 同じフォルダの一時ファイル → rename
//!
//! 書き込みは常に全体の書き直し。途中で失敗しても既存ファイルはそのまま残る。

use crate::error::{CatalogError, Result};
use calamine::{Data, Reader, Xlsx};
use game_catalog_common::export::excel_core::generate_catalog_buffer;
use game_catalog_common::{Catalog, CatalogEntry, Duplicate, CATALOG_HEADER};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ファイルがなければヘッダーのみで作成
    ///
    /// 作成した場合は `true`。
    pub fn ensure_initialized(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.parent_dir() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CatalogError::storage(&self.path, e))?;
        }

        self.save(&Catalog::new())?;
        info!(path = %self.path.display(), "カタログファイルを作成");
        Ok(true)
    }

    /// ヘッダー以降の全行を読み込み
    pub fn load_entries(&self) -> Result<Catalog> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| CatalogError::storage(&self.path, e))?;
        let mut workbook = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| CatalogError::storage(&self.path, e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| CatalogError::storage(&self.path, "シートがありません"))?
            .map_err(|e| CatalogError::storage(&self.path, e))?;

        let mut rows = range.rows();
        match rows.next() {
            Some(header) if is_header(header) => {}
            _ => {
                return Err(CatalogError::storage(
                    &self.path,
                    format!("ヘッダー行が不正です（期待値: {}）", CATALOG_HEADER.join(", ")),
                ))
            }
        }

        let entries: Vec<CatalogEntry> = rows
            .map(|row| CatalogEntry::new(cell_text(row.first()), cell_text(row.get(1))))
            .filter(|e| !(e.console.is_empty() && e.title.is_empty()))
            .collect();

        debug!(path = %self.path.display(), count = entries.len(), "カタログ読み込み");
        Ok(Catalog::from_entries(entries))
    }

    /// 追加して全体を並べ直し、保存
    ///
    /// 既にある組なら書き込まずに `DuplicateEntry` を返す。
    pub fn append_and_resort(&self, entry: CatalogEntry) -> Result<Catalog> {
        let mut catalog = self.load_entries()?;

        catalog
            .insert(entry.clone())
            .map_err(|Duplicate(e)| CatalogError::DuplicateEntry {
                console: e.console,
                title: e.title,
            })?;

        self.save(&catalog)?;
        info!(console = %entry.console, title = %entry.title, total = catalog.len(), "カタログに追加");
        Ok(catalog)
    }

    fn save(&self, catalog: &Catalog) -> Result<()> {
        let buffer = generate_catalog_buffer(catalog)
            .map_err(|e| CatalogError::storage(&self.path, e))?;

        let dir = self.parent_dir().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| CatalogError::storage(&self.path, e))?;
        temp.write_all(&buffer)
            .map_err(|e| CatalogError::storage(&self.path, e))?;
        if let Some(permissions) = self.target_permissions()? {
            temp.as_file()
                .set_permissions(permissions)
                .map_err(|e| CatalogError::storage(&self.path, e))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|e| CatalogError::storage(&self.path, e))?;
        temp.persist(&self.path)
            .map_err(|e| CatalogError::storage(&self.path, e.error))?;

        Ok(())
    }

    /// 既存ファイルの権限を引き継ぐ（新規は 0644）
    fn target_permissions(&self) -> Result<Option<std::fs::Permissions>> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.permissions())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default_permissions()),
            Err(e) => Err(CatalogError::storage(&self.path, e)),
        }
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

/// 大文字小文字を無視して同じ組があるか
pub fn contains(catalog: &Catalog, entry: &CatalogEntry) -> bool {
    catalog.contains(entry)
}

#[cfg(unix)]
fn default_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<std::fs::Permissions> {
    None
}

fn is_header(row: &[Data]) -> bool {
    row.len() >= CATALOG_HEADER.len()
        && CATALOG_HEADER
            .iter()
            .zip(row)
            .all(|(expected, cell)| cell_text(Some(cell)).eq_ignore_ascii_case(expected))
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}
