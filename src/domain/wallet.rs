//! Wallet reward catalog and payment gateway vocabulary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardCode {
    Voucher5,
    Voucher10,
    FreeCharge,
    Voucher25,
    PremiumMembership,
}

#[derive(Debug, Clone, Copy)]
pub struct RewardItem {
    pub code: RewardCode,
    pub points_cost: i64,
    pub cash_value: Decimal,
}

/// Fixed catalog -- a mismatch between what the client sends and this table
/// is a validation error, not something `redeem_reward` silently corrects.
pub fn reward_catalog() -> [RewardItem; 5] {
    [
        RewardItem { code: RewardCode::Voucher5, points_cost: 500, cash_value: Decimal::new(500, 2) },
        RewardItem { code: RewardCode::Voucher10, points_cost: 1000, cash_value: Decimal::new(1000, 2) },
        RewardItem { code: RewardCode::FreeCharge, points_cost: 2000, cash_value: Decimal::new(2500, 2) },
        RewardItem { code: RewardCode::Voucher25, points_cost: 2500, cash_value: Decimal::new(2500, 2) },
        RewardItem { code: RewardCode::PremiumMembership, points_cost: 5000, cash_value: Decimal::new(0, 2) },
    ]
}

pub fn find_reward(code: RewardCode) -> Option<RewardItem> {
    reward_catalog().into_iter().find(|item| item.code == code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentGatewayKind {
    Manual,
    Billplz,
    Ocbc,
}

impl PaymentGatewayKind {
    /// Unknown gateway names fall back to `Manual`, logged by the caller --
    /// matches the original registry's `.get(name, ManualGateway)` lookup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "billplz" => PaymentGatewayKind::Billplz,
            "ocbc" => PaymentGatewayKind::Ocbc,
            _ => PaymentGatewayKind::Manual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_five_fixed_rewards() {
        assert_eq!(reward_catalog().len(), 5);
        assert_eq!(find_reward(RewardCode::FreeCharge).unwrap().points_cost, 2000);
    }

    #[test]
    fn unknown_gateway_name_falls_back_to_manual() {
        assert_eq!(PaymentGatewayKind::from_name("stripe"), PaymentGatewayKind::Manual);
        assert_eq!(PaymentGatewayKind::from_name("billplz"), PaymentGatewayKind::Billplz);
    }
}
