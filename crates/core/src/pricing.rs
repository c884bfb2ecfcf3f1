use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::quote::{Quote, QuoteRequest, Tier};
use crate::tariff::{Tariff, TariffError};

/// Deterministic converter from a foreign-currency amount to a rounded
/// local-currency quote. Holds a validated [`Tariff`]; pricing itself is
/// total over the request domain.
pub struct PricingEngine {
    tariff: Tariff,
}

impl Default for PricingEngine {
    fn default() -> Self {
        // The default tariff always satisfies its own invariants.
        Self { tariff: Tariff::default() }
    }
}

impl PricingEngine {
    pub fn new(tariff: Tariff) -> Result<Self, TariffError> {
        tariff.validate()?;
        Ok(Self { tariff })
    }

    pub fn tariff(&self) -> &Tariff {
        &self.tariff
    }

    /// Step-function service charge: `fee_start` inside the first bracket,
    /// plus `fee_step` for each further full bracket of foreign amount.
    fn base_fee(&self, amount: u32) -> u64 {
        self.tariff.fee_start + u64::from(amount / self.tariff.fee_bracket) * self.tariff.fee_step
    }

    /// Local-currency amount for a request, rounded half-away-from-zero.
    pub fn price(&self, amount: u32, tier: Tier, use_coupon: bool) -> u64 {
        let policy = self.tariff.policy(tier);
        let sell_rate = self.tariff.base_sell_rate - policy.rate_off;

        let mut fee = self.base_fee(amount);
        if tier != Tier::Standard {
            // The fee floor only engages for tiers that receive a fee
            // discount; the standard tier keeps its raw fee.
            fee = fee.saturating_sub(policy.fee_off).max(self.tariff.min_fee);
        }

        let coupon_cut = if tier == Tier::Vip3
            && use_coupon
            && amount >= self.tariff.coupon_min_amount
        {
            self.tariff.coupon_cut
        } else {
            0
        };

        let local = Decimal::from(amount) * sell_rate + Decimal::from(fee)
            - Decimal::from(coupon_cut);

        // A coupon cut can exceed the computed price under a small-rate
        // tariff; a quote never goes below zero. Saturate rather than panic
        // if an injected tariff produces a value outside u64.
        local
            .max(Decimal::ZERO)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .unwrap_or(u64::MAX)
    }

    pub fn quote(&self, request: &QuoteRequest) -> Quote {
        Quote {
            foreign_amount: request.amount,
            local_amount: self.price(request.amount, request.tier, request.use_coupon),
            tier: request.tier,
            use_coupon: request.use_coupon,
        }
    }
}
