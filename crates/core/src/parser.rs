use thiserror::Error;

use crate::domain::quote::{QuoteRequest, Tier};

/// Literal keyword opening a quote command.
pub const QUOTE_KEYWORD: &str = "報價";
/// Literal token marking coupon redemption.
pub const COUPON_TOKEN: &str = "用券";

/// A failed parse. `NotAQuote` is the normal "this message is something
/// else" outcome; `UnrecognizedToken` means the message was a quote command
/// but carried a token the grammar does not know, and is reported back to
/// the sender instead of silently quoting at the standard tier.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("message is not a quote command")]
    NotAQuote,
    #[error("unrecognized token `{0}` in quote command")]
    UnrecognizedToken(String),
}

/// Parses a quote command out of raw chat text.
///
/// Canonical grammar, whitespace separated, optional tokens order-fixed:
///
/// ```text
/// 報價 <amount> [一般|VIP1|VIP2|VIP3] [用券] [@<alias>]
/// ```
///
/// Earlier grammars also accepted `報價1680` and `報價：1680`; those forms
/// are deliberately no longer recognized.
pub fn parse_quote_request(text: &str) -> Result<QuoteRequest, ParseError> {
    let mut tokens = text.split_whitespace();

    if tokens.next() != Some(QUOTE_KEYWORD) {
        return Err(ParseError::NotAQuote);
    }

    // `str::parse::<u32>` tolerates a leading `+`; amounts are plain digits.
    let amount = tokens
        .next()
        .filter(|token| token.bytes().all(|byte| byte.is_ascii_digit()))
        .and_then(|token| token.parse::<u32>().ok())
        .ok_or(ParseError::NotAQuote)?;

    let mut tier = None;
    let mut use_coupon = false;
    let mut target_alias = None;

    for token in tokens {
        if tier.is_none() && !use_coupon && target_alias.is_none() {
            if let Some(parsed) = Tier::from_token(token) {
                tier = Some(parsed);
                continue;
            }
        }

        if !use_coupon && target_alias.is_none() && token == COUPON_TOKEN {
            use_coupon = true;
            continue;
        }

        if target_alias.is_none() {
            if let Some(alias) = token.strip_prefix('@') {
                if !alias.is_empty() {
                    target_alias = Some(alias.to_owned());
                    continue;
                }
            }
        }

        return Err(ParseError::UnrecognizedToken(token.to_owned()));
    }

    Ok(QuoteRequest {
        amount,
        tier: tier.unwrap_or(Tier::Standard),
        use_coupon,
        target_alias,
    })
}
