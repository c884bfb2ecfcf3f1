use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::quote::Tier;

/// Per-tier pricing adjustments: a discount off the base sell rate and a
/// flat reduction of the service fee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPolicy {
    pub rate_off: Decimal,
    pub fee_off: u64,
}

/// Immutable pricing configuration. Constructed once and handed to the
/// pricing engine; tests can inject alternate tariffs instead of patching
/// process-wide constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tariff {
    /// Local-currency units charged per foreign-currency unit before any
    /// tier discount.
    pub base_sell_rate: Decimal,
    /// Service fee for amounts inside the first bracket.
    pub fee_start: u64,
    /// Fee increment per full bracket of foreign amount.
    pub fee_step: u64,
    /// Bracket width in foreign-currency units.
    pub fee_bracket: u32,
    /// Floor applied after a tier fee discount. Never applied to the
    /// standard tier, which receives no discount.
    pub min_fee: u64,
    /// Flat cut for a redeemed coupon.
    pub coupon_cut: u64,
    /// Minimum foreign amount before a coupon may be redeemed.
    pub coupon_min_amount: u32,
    pub standard: TierPolicy,
    pub vip1: TierPolicy,
    pub vip2: TierPolicy,
    pub vip3: TierPolicy,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TariffError {
    #[error("base_sell_rate must be positive, got {0}")]
    NonPositiveBaseRate(Decimal),
    #[error("fee_bracket must be greater than zero")]
    ZeroFeeBracket,
    #[error("rate_off {rate_off} for tier {tier:?} must be below base_sell_rate {base_rate}")]
    RateOffExceedsBase { tier: Tier, rate_off: Decimal, base_rate: Decimal },
    #[error("rate_off for tier {0:?} must not be negative")]
    NegativeRateOff(Tier),
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            base_sell_rate: Decimal::new(45, 1),
            fee_start: 30,
            fee_step: 50,
            fee_bracket: 500,
            min_fee: 20,
            coupon_cut: 50,
            coupon_min_amount: 2000,
            standard: TierPolicy { rate_off: Decimal::ZERO, fee_off: 0 },
            vip1: TierPolicy { rate_off: Decimal::new(2, 2), fee_off: 10 },
            vip2: TierPolicy { rate_off: Decimal::new(3, 2), fee_off: 10 },
            vip3: TierPolicy { rate_off: Decimal::new(5, 2), fee_off: 10 },
        }
    }
}

impl Tariff {
    pub fn policy(&self, tier: Tier) -> &TierPolicy {
        match tier {
            Tier::Standard => &self.standard,
            Tier::Vip1 => &self.vip1,
            Tier::Vip2 => &self.vip2,
            Tier::Vip3 => &self.vip3,
        }
    }

    /// Checks the invariants the pricing engine relies on so that pricing
    /// itself stays total: a positive effective sell rate for every tier
    /// and a nonzero fee bracket.
    pub fn validate(&self) -> Result<(), TariffError> {
        if self.base_sell_rate <= Decimal::ZERO {
            return Err(TariffError::NonPositiveBaseRate(self.base_sell_rate));
        }
        if self.fee_bracket == 0 {
            return Err(TariffError::ZeroFeeBracket);
        }

        for tier in Tier::ALL {
            let policy = self.policy(tier);
            if policy.rate_off < Decimal::ZERO {
                return Err(TariffError::NegativeRateOff(tier));
            }
            if policy.rate_off >= self.base_sell_rate {
                return Err(TariffError::RateOffExceedsBase {
                    tier,
                    rate_off: policy.rate_off,
                    base_rate: self.base_sell_rate,
                });
            }
        }

        Ok(())
    }
}
