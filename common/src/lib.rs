//! Game Catalog Common Library
//!
//! OCRテキスト分類とカタログ型（入出力なし）

pub mod types;
pub mod error;
pub mod classifier;
pub mod catalog;
pub mod export;

pub use types::{
    CatalogEntry, Classification, Console, ConsoleMatch, ConsolePass, TitleMatch, TitlePass,
    CATALOG_HEADER, UNKNOWN_CONSOLE, UNKNOWN_TITLE,
};
pub use error::{Error, Result};
pub use classifier::{classify, detect_console, extract_title, retitle_for_console, split_lines};
pub use catalog::{Catalog, Duplicate};
