pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod ocr;
pub mod prompt;
pub mod scan;
pub mod session;
pub mod store;
