use std::env;
use std::fs;
use std::path::Path;

use ratebot_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use super::detect_config_path;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "channel.access_token",
        &redact_secret(config.channel.access_token.expose_secret()),
        source("channel.access_token", "RATEBOT_CHANNEL_ACCESS_TOKEN"),
    ));
    lines.push(render_line(
        "channel.secret",
        &redact_secret(config.channel.secret.expose_secret()),
        source("channel.secret", "RATEBOT_CHANNEL_SECRET"),
    ));

    lines.push(render_line(
        "directory.path",
        &config.directory.path.display().to_string(),
        source("directory.path", "RATEBOT_DIRECTORY_PATH"),
    ));

    lines.push(render_line(
        "admin.user_ids",
        &render_id_list(&config.admin.user_ids),
        source("admin.user_ids", "RATEBOT_ADMIN_USER_IDS"),
    ));
    lines.push(render_line(
        "admin.group_ids",
        &render_id_list(&config.admin.group_ids),
        source("admin.group_ids", "RATEBOT_ADMIN_GROUP_IDS"),
    ));

    // The tariff has no env override; it comes from the file or defaults.
    lines.push(render_line(
        "tariff.base_sell_rate",
        &config.tariff.base_sell_rate.to_string(),
        source("tariff.base_sell_rate", ""),
    ));
    lines.push(render_line(
        "tariff.coupon_min_amount",
        &config.tariff.coupon_min_amount.to_string(),
        source("tariff.coupon_min_amount", ""),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", "RATEBOT_LOGGING_LEVEL"),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", "RATEBOT_LOGGING_FORMAT"),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if !env_key.is_empty() && env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn render_id_list(ids: &[String]) -> String {
    if ids.is_empty() {
        "<none>".to_string()
    } else {
        ids.join(",")
    }
}

fn redact_secret(secret: &str) -> String {
    if secret.trim().is_empty() {
        "<empty>".to_string()
    } else {
        "<redacted>".to_string()
    }
}
