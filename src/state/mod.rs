/// State management module
///
/// This module handles all application state, including:
/// - Board and card documents (data.rs)
/// - The local SQLite board cache (library.rs)
/// - Picture transform parameters and drag tracking (edit.rs)
/// - Undo/redo history (history.rs) and the editing session (editor.rs)
/// - Grid geometry for the editor and printable view (layout.rs)
/// - Card usage statistics (stats.rs)

pub mod data;
pub mod edit;
pub mod editor;
pub mod history;
pub mod layout;
pub mod library;
pub mod stats;
