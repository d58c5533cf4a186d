//! Utilities

pub mod file;

pub use file::FileUtils;
