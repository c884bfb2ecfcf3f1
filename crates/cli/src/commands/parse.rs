use ratebot_core::parser::parse_quote_request;

use super::CommandResult;

pub fn run(words: &[String], json: bool) -> CommandResult {
    let text = words.join(" ");

    match parse_quote_request(&text) {
        Ok(request) => {
            let output = if json {
                serde_json::json!({ "ok": true, "request": request }).to_string()
            } else {
                format!(
                    "amount={} tier={} coupon={} target={}",
                    request.amount,
                    request.tier.token(),
                    request.use_coupon,
                    request.target_alias.as_deref().unwrap_or("<none>"),
                )
            };
            CommandResult { exit_code: 0, output }
        }
        Err(error) => {
            let output = if json {
                serde_json::json!({ "ok": false, "error": error.to_string() }).to_string()
            } else {
                format!("parse failed: {error}")
            };
            CommandResult { exit_code: 1, output }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::run;

    fn words(text: &[&str]) -> Vec<String> {
        text.iter().map(|word| (*word).to_owned()).collect()
    }

    #[test]
    fn renders_parsed_fields() {
        let result = run(&words(&["報價", "900", "VIP1", "@小美"]), false);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "amount=900 tier=VIP1 coupon=false target=小美");
    }

    #[test]
    fn reports_unrecognized_token() {
        let result = run(&words(&["報價", "900", "VIP9"]), false);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.contains("VIP9"));
    }
}
