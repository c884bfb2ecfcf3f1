use std::fs;
use std::path::Path;

use ratebot_core::format::format_quote;
use ratebot_core::parser::parse_quote_request;
use ratebot_core::pricing::PricingEngine;
use ratebot_core::tariff::Tariff;

use super::{detect_config_path, CommandResult};

pub fn run(words: &[String], json: bool) -> CommandResult {
    let text = words.join(" ");

    let request = match parse_quote_request(&text) {
        Ok(request) => request,
        Err(error) => {
            let output = if json {
                serde_json::json!({ "ok": false, "error": error.to_string() }).to_string()
            } else {
                format!("parse failed: {error}")
            };
            return CommandResult { exit_code: 1, output };
        }
    };

    let tariff = match effective_tariff() {
        Ok(tariff) => tariff,
        Err(message) => return CommandResult { exit_code: 1, output: message },
    };
    let engine = match PricingEngine::new(tariff) {
        Ok(engine) => engine,
        Err(error) => {
            return CommandResult { exit_code: 1, output: format!("invalid tariff: {error}") }
        }
    };

    let quote = engine.quote(&request);
    let output = if json {
        serde_json::json!({
            "ok": true,
            "request": request,
            "local_amount": quote.local_amount,
            "message": format_quote(&quote),
        })
        .to_string()
    } else {
        format_quote(&quote)
    };

    CommandResult { exit_code: 0, output }
}

/// Tariff from the `[tariff]` table of the config file when one is present,
/// otherwise the default tariff. Channel credentials are deliberately not
/// required to price offline.
fn effective_tariff() -> Result<Tariff, String> {
    let Some(path) = detect_config_path() else {
        return Ok(Tariff::default());
    };
    tariff_from_file(&path)
}

fn tariff_from_file(path: &Path) -> Result<Tariff, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read `{}`: {error}", path.display()))?;
    let doc: toml::Value = raw
        .parse()
        .map_err(|error| format!("could not parse `{}`: {error}", path.display()))?;

    match doc.get("tariff") {
        Some(table) => table
            .clone()
            .try_into::<Tariff>()
            .map_err(|error| format!("invalid [tariff] table in `{}`: {error}", path.display())),
        None => Ok(Tariff::default()),
    }
}
