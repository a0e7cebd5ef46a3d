//! Excel生成（共通ライブラリ）
//!
//! カタログを1シートのワークブックとしてバッファに書き出す。
//! 1行目はヘッダー（Console, Game Title）、2行目以降がデータ行。

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::types::CATALOG_HEADER;
use rust_xlsxwriter::*;

/// シート名
pub const SHEET_NAME: &str = "Library";

/// 列幅（Excel単位）
const CONSOLE_COL_WIDTH: f64 = 18.0;
const TITLE_COL_WIDTH: f64 = 48.0;

/// カタログをxlsxバッファに生成
pub fn generate_catalog_buffer(catalog: &Catalog) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border_bottom(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)
        .map_err(|e| Error::Excel(format!("シート名設定エラー: {}", e)))?;
    worksheet.set_column_width(0, CONSOLE_COL_WIDTH)
        .map_err(|e| Error::Excel(format!("列幅設定エラー: {}", e)))?;
    worksheet.set_column_width(1, TITLE_COL_WIDTH)
        .map_err(|e| Error::Excel(format!("列幅設定エラー: {}", e)))?;
    worksheet.set_freeze_panes(1, 0)
        .map_err(|e| Error::Excel(format!("ウィンドウ枠固定エラー: {}", e)))?;

    for (col, label) in CATALOG_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *label, &header_format)
            .map_err(|e| Error::Excel(format!("ヘッダー書き込みエラー: {}", e)))?;
    }

    for (idx, entry) in catalog.iter().enumerate() {
        let row = u32::try_from(idx + 1)
            .map_err(|_| Error::Excel(format!("行数が上限を超えています: {}", idx + 1)))?;
        worksheet.write_string(row, 0, &entry.console)
            .map_err(|e| Error::Excel(format!("値書き込みエラー: {}", e)))?;
        worksheet.write_string(row, 1, &entry.title)
            .map_err(|e| Error::Excel(format!("値書き込みエラー: {}", e)))?;
    }

    workbook.save_to_buffer()
        .map_err(|e| Error::Excel(format!("Excel保存エラー: {}", e)))
}
