//! Adapters between the term model and files on disk.

pub mod excel_read;
pub mod excel_write;
pub mod json;
