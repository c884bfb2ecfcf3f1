use serde::{Deserialize, Serialize};

/// Opaque messaging-platform user identifier. Operators address users by
/// alias; this is what the alias resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Customer loyalty level. Affects the sell rate and the service fee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Standard,
    Vip1,
    Vip2,
    Vip3,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Standard, Tier::Vip1, Tier::Vip2, Tier::Vip3];

    /// The literal token used in chat messages for this tier.
    pub fn token(&self) -> &'static str {
        match self {
            Tier::Standard => "一般",
            Tier::Vip1 => "VIP1",
            Tier::Vip2 => "VIP2",
            Tier::Vip3 => "VIP3",
        }
    }

    pub fn from_token(token: &str) -> Option<Tier> {
        match token {
            "一般" => Some(Tier::Standard),
            "VIP1" => Some(Tier::Vip1),
            "VIP2" => Some(Tier::Vip2),
            "VIP3" => Some(Tier::Vip3),
            _ => None,
        }
    }
}

/// A parsed quote command, as extracted from raw chat text.
///
/// `amount` is in foreign-currency units; `u32` keeps the non-negative
/// invariant out of the checked domain entirely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub amount: u32,
    pub tier: Tier,
    pub use_coupon: bool,
    pub target_alias: Option<String>,
}

impl QuoteRequest {
    pub fn new(amount: u32, tier: Tier, use_coupon: bool) -> Self {
        Self { amount, tier, use_coupon, target_alias: None }
    }
}

/// A computed quote: the foreign amount plus its rounded local-currency
/// price. Exists only long enough to be formatted into a reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub foreign_amount: u32,
    pub local_amount: u64,
    pub tier: Tier,
    pub use_coupon: bool,
}

#[cfg(test)]
mod tests {
    use super::Tier;

    #[test]
    fn tier_tokens_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_token(tier.token()), Some(tier));
        }
    }

    #[test]
    fn unknown_tier_token_is_rejected() {
        assert_eq!(Tier::from_token("VIP4"), None);
        assert_eq!(Tier::from_token("vip1"), None);
        assert_eq!(Tier::from_token(""), None);
    }
}
