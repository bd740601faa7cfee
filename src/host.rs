// Host module
// The editor-facing surface the extension runs against

use crate::config::{ConfigurationChange, Settings};
use std::path::PathBuf;

/// Services the editor provides to the extension
pub trait Host {
    /// Current settings snapshot
    fn configuration(&self) -> Settings;

    /// Open workspace folders, first one is the workspace root
    fn workspace_folders(&self) -> Vec<PathBuf>;

    /// Directory the extension is installed in
    fn extension_path(&self) -> PathBuf;

    /// Show an advisory error notice to the user
    fn show_error_message(&self, message: &str);
}

/// Input delivered by the editor, one at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The cursor or selection moved
    SelectionChanged,
    /// Text in a document changed
    TextDocumentChanged,
    ConfigurationChanged(ConfigurationChange),
}
