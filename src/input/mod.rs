//! Input processing module
//! Handles document text extraction and loading of parsed skill lists

pub mod cleaner;
pub mod file_detector;
pub mod manager;
pub mod skills;
pub mod text_extractor;
