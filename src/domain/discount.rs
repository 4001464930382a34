use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// How a discount code reduces the order subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// `value` percent of the subtotal, optionally capped.
    Percentage,
    /// `value` subtracted from the subtotal.
    Fixed,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountKind::Percentage),
            "fixed" => Ok(DiscountKind::Fixed),
            other => Err(DomainError::Validation(format!(
                "Unknown discount kind '{}', expected 'percentage' or 'fixed'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscountCodeView {
    pub id: Uuid,
    pub code: String,
    pub kind: DiscountKind,
    pub value: BigDecimal,
    pub min_order_total: BigDecimal,
    pub max_discount_amount: Option<BigDecimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub per_user_limit: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDiscountCode {
    pub code: String,
    pub kind: DiscountKind,
    pub value: BigDecimal,
    pub min_order_total: BigDecimal,
    pub max_discount_amount: Option<BigDecimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub per_user_limit: Option<i32>,
    pub is_active: bool,
}

/// Partial update; `None` leaves the field unchanged. For the nullable
/// fields the inner option distinguishes clearing from setting:
/// `Some(None)` resets the field to unset, `Some(Some(v))` stores `v`.
#[derive(Debug, Clone, Default)]
pub struct DiscountCodeUpdate {
    pub value: Option<BigDecimal>,
    pub min_order_total: Option<BigDecimal>,
    pub max_discount_amount: Option<Option<BigDecimal>>,
    pub starts_at: Option<Option<DateTime<Utc>>>,
    pub ends_at: Option<Option<DateTime<Utc>>>,
    pub usage_limit: Option<Option<i32>>,
    pub per_user_limit: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct DiscountPage {
    pub items: Vec<DiscountCodeView>,
    pub total: i64,
}

/// Canonical form used for storage and lookup: trimmed and uppercased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
