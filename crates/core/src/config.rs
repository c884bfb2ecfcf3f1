use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tariff::Tariff;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub channel: ChannelConfig,
    pub directory: DirectoryConfig,
    pub admin: AdminConfig,
    pub tariff: Tariff,
    pub logging: LoggingConfig,
}

/// Messaging-platform channel credentials. Consumed by whatever transport
/// adapter sits in front of the dispatcher; never logged.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    pub access_token: SecretString,
    pub secret: SecretString,
}

#[derive(Clone, Debug)]
pub struct DirectoryConfig {
    pub path: PathBuf,
}

/// Allow-lists for privileged commands (push-to-alias, bind-alias).
/// A sender qualifies by user id or by originating group.
#[derive(Clone, Debug, Default)]
pub struct AdminConfig {
    pub user_ids: Vec<String>,
    pub group_ids: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl LoggingConfig {
    /// Logging settings alone, from whatever config file and
    /// `RATEBOT_LOGGING_*` variables are present. For binaries that must
    /// initialize a subscriber before (or without) credential validation;
    /// unreadable sources fall back to the defaults instead of failing.
    pub fn discover(explicit_path: Option<&Path>) -> Self {
        let mut logging = Self::default();

        if let Some(path) = resolve_config_path(explicit_path) {
            if let Ok(patch) = read_patch(&path) {
                if let Some(patch) = patch.logging {
                    if let Some(level) = patch.level {
                        logging.level = level;
                    }
                    if let Some(format) = patch.format {
                        logging.format = format;
                    }
                }
            }
        }

        if let Some(value) = read_env("RATEBOT_LOGGING_LEVEL").or_else(|| read_env("RATEBOT_LOG_LEVEL"))
        {
            logging.level = value;
        }
        let format = read_env("RATEBOT_LOGGING_FORMAT").or_else(|| read_env("RATEBOT_LOG_FORMAT"));
        if let Some(parsed) = format.and_then(|value| value.parse().ok()) {
            logging.format = parsed;
        }

        logging
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub directory_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub channel_access_token: Option<String>,
    pub channel_secret: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig {
                access_token: String::new().into(),
                secret: String::new().into(),
            },
            directory: DirectoryConfig { path: PathBuf::from("aliases.json") },
            admin: AdminConfig::default(),
            tariff: Tariff::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("ratebot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(channel) = patch.channel {
            if let Some(access_token) = channel.access_token {
                self.channel.access_token = access_token.into();
            }
            if let Some(secret) = channel.secret {
                self.channel.secret = secret.into();
            }
        }

        if let Some(directory) = patch.directory {
            if let Some(path) = directory.path {
                self.directory.path = path;
            }
        }

        if let Some(admin) = patch.admin {
            if let Some(user_ids) = admin.user_ids {
                self.admin.user_ids = user_ids;
            }
            if let Some(group_ids) = admin.group_ids {
                self.admin.group_ids = group_ids;
            }
        }

        if let Some(tariff) = patch.tariff {
            self.tariff = tariff;
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("RATEBOT_CHANNEL_ACCESS_TOKEN") {
            self.channel.access_token = value.into();
        }
        if let Some(value) = read_env("RATEBOT_CHANNEL_SECRET") {
            self.channel.secret = value.into();
        }
        if let Some(value) = read_env("RATEBOT_DIRECTORY_PATH") {
            self.directory.path = PathBuf::from(value);
        }
        if let Some(value) = read_env("RATEBOT_ADMIN_USER_IDS") {
            self.admin.user_ids = split_id_list(&value);
        }
        if let Some(value) = read_env("RATEBOT_ADMIN_GROUP_IDS") {
            self.admin.group_ids = split_id_list(&value);
        }

        let log_level = read_env("RATEBOT_LOGGING_LEVEL").or_else(|| read_env("RATEBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("RATEBOT_LOGGING_FORMAT").or_else(|| read_env("RATEBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(directory_path) = overrides.directory_path {
            self.directory.path = directory_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(access_token) = overrides.channel_access_token {
            self.channel.access_token = access_token.into();
        }
        if let Some(secret) = overrides.channel_secret {
            self.channel.secret = secret.into();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel.access_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "channel.access_token is required (issued in the messaging platform console)"
                    .to_string(),
            ));
        }
        if self.channel.secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "channel.secret is required (issued in the messaging platform console)"
                    .to_string(),
            ));
        }

        if self.directory.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "directory.path must not be empty".to_string(),
            ));
        }

        self.tariff
            .validate()
            .map_err(|error| ConfigError::Validation(format!("tariff: {error}")))?;

        let level = self.logging.level.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            )),
        }
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("ratebot.toml"), PathBuf::from("config/ratebot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn split_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    channel: Option<ChannelPatch>,
    directory: Option<DirectoryPatch>,
    admin: Option<AdminPatch>,
    tariff: Option<Tariff>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ChannelPatch {
    access_token: Option<String>,
    secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct AdminPatch {
    user_ids: Option<Vec<String>>,
    group_ids: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_CHANNEL_ACCESS_TOKEN", "token-from-env");
        env::set_var("TEST_CHANNEL_SECRET", "secret-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("ratebot.toml");
            fs::write(
                &path,
                r#"
[channel]
access_token = "${TEST_CHANNEL_ACCESS_TOKEN}"
secret = "${TEST_CHANNEL_SECRET}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.channel.access_token.expose_secret() == "token-from-env",
                "access token should be loaded from environment",
            )?;
            ensure(
                config.channel.secret.expose_secret() == "secret-from-env",
                "channel secret should be loaded from environment",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_CHANNEL_ACCESS_TOKEN", "TEST_CHANNEL_SECRET"]);
        result
    }

    #[test]
    fn partial_tariff_table_overlays_defaults() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("RATEBOT_CHANNEL_ACCESS_TOKEN", "token");
        env::set_var("RATEBOT_CHANNEL_SECRET", "secret");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("ratebot.toml");
            fs::write(
                &path,
                r#"
[tariff]
base_sell_rate = "4.6"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.tariff.base_sell_rate == Decimal::new(46, 1),
                "patched base rate should apply",
            )?;
            ensure(config.tariff.min_fee == 20, "unpatched tariff fields keep defaults")?;
            Ok(())
        })();

        clear_vars(&["RATEBOT_CHANNEL_ACCESS_TOKEN", "RATEBOT_CHANNEL_SECRET"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("RATEBOT_CHANNEL_ACCESS_TOKEN", "token-from-env");
        env::set_var("RATEBOT_CHANNEL_SECRET", "secret-from-env");
        env::set_var("RATEBOT_DIRECTORY_PATH", "from-env.json");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("ratebot.toml");
            fs::write(
                &path,
                r#"
[directory]
path = "from-file.json"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.directory.path.to_string_lossy() == "from-env.json",
                "env directory path should win over file",
            )?;
            ensure(config.logging.level == "debug", "programmatic log level should win")?;
            Ok(())
        })();

        clear_vars(&[
            "RATEBOT_CHANNEL_ACCESS_TOKEN",
            "RATEBOT_CHANNEL_SECRET",
            "RATEBOT_DIRECTORY_PATH",
        ]);
        result
    }

    #[test]
    fn admin_id_lists_parse_from_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("RATEBOT_CHANNEL_ACCESS_TOKEN", "token");
        env::set_var("RATEBOT_CHANNEL_SECRET", "secret");
        env::set_var("RATEBOT_ADMIN_USER_IDS", "U1, U2 ,,U3");
        env::set_var("RATEBOT_ADMIN_GROUP_IDS", "G9");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.admin.user_ids == ["U1", "U2", "U3"], "user id list should be trimmed")?;
            ensure(config.admin.group_ids == ["G9"], "group id list should be parsed")?;
            Ok(())
        })();

        clear_vars(&[
            "RATEBOT_CHANNEL_ACCESS_TOKEN",
            "RATEBOT_CHANNEL_SECRET",
            "RATEBOT_ADMIN_USER_IDS",
            "RATEBOT_ADMIN_GROUP_IDS",
        ]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("RATEBOT_CHANNEL_SECRET", "secret-only");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("channel.access_token")
            );
            ensure(has_message, "validation failure should mention channel.access_token")
        })();

        clear_vars(&["RATEBOT_CHANNEL_SECRET"]);
        result
    }

    #[test]
    fn logging_discovery_reads_file_then_env_without_credentials() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(&[
            "RATEBOT_LOGGING_LEVEL",
            "RATEBOT_LOGGING_FORMAT",
            "RATEBOT_LOG_LEVEL",
            "RATEBOT_LOG_FORMAT",
        ]);

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("ratebot.toml");
            // No [channel] section: discovery must not require credentials.
            fs::write(
                &path,
                r#"
[logging]
level = "debug"
format = "json"
"#,
            )
            .map_err(|err| err.to_string())?;

            let logging = LoggingConfig::discover(Some(&path));
            ensure(logging.level == "debug", "file log level should apply")?;
            ensure(logging.format == LogFormat::Json, "file log format should apply")?;

            env::set_var("RATEBOT_LOGGING_FORMAT", "pretty");
            let logging = LoggingConfig::discover(Some(&path));
            ensure(logging.format == LogFormat::Pretty, "env log format should win over file")?;
            ensure(logging.level == "debug", "file log level should survive env format override")?;
            Ok(())
        })();

        clear_vars(&["RATEBOT_LOGGING_FORMAT"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("RATEBOT_CHANNEL_ACCESS_TOKEN", "token-secret-value");
        env::set_var("RATEBOT_CHANNEL_SECRET", "channel-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("token-secret-value"),
                "debug output should not contain access token",
            )?;
            ensure(
                !debug.contains("channel-secret-value"),
                "debug output should not contain channel secret",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&["RATEBOT_CHANNEL_ACCESS_TOKEN", "RATEBOT_CHANNEL_SECRET"]);
        result
    }
}
