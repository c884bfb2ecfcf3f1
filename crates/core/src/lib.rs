pub mod config;
pub mod domain;
pub mod errors;
pub mod format;
pub mod parser;
pub mod pricing;
pub mod tariff;

pub use domain::quote::{Quote, QuoteRequest, Tier, UserId};
pub use errors::{ApplicationError, DomainError};
pub use format::{format_quotation, usage_hint};
pub use parser::{parse_quote_request, ParseError};
pub use pricing::PricingEngine;
pub use tariff::{Tariff, TariffError, TierPolicy};
