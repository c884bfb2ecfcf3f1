pub mod config;
pub mod parse;
pub mod quote;

use std::path::PathBuf;

pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

pub(crate) fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("ratebot.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/ratebot.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}
