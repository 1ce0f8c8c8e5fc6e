//! Clipboard operations

use std::path::PathBuf;

/// Copy text to the system clipboard. Where no clipboard is available
/// (headless sessions, SSH) the text goes to a temp file instead.
/// Returns a status line for the user.
pub fn copy_text_to_clipboard(text: &str) -> String {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => "Copied to clipboard".to_string(),
        Err(e) => {
            log::warn!("Clipboard unavailable: {}", e);
            let path = fallback_path();
            match std::fs::write(&path, text) {
                Ok(()) => format!("Clipboard unavailable; wrote to {}", path.display()),
                Err(e) => format!("Clipboard error & file write failed: {}", e),
            }
        }
    }
}

fn fallback_path() -> PathBuf {
    std::env::temp_dir().join("itinera-clipboard.md")
}
