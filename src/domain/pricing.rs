//! Order pricing: discount eligibility/amount evaluation and total
//! computation. Pure functions over already-loaded data; persistence
//! side effects (e.g. bumping a code's usage count) live in the
//! repositories.

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::discount::{DiscountCodeView, DiscountKind};

/// Why a discount code cannot be applied to an order.
///
/// Messages are end-user facing: the checkout flow shows them verbatim
/// and lets the customer retry with a different code or cart.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    #[error("Discount code not found")]
    NotFound,
    #[error("This discount code is no longer active")]
    Inactive,
    #[error("This discount code is not valid yet")]
    NotYetValid,
    #[error("This discount code has expired")]
    Expired,
    #[error("This discount code has reached its usage limit")]
    UsageExhausted,
    #[error("Order subtotal must be at least {minimum} to use this code")]
    BelowMinimum { minimum: BigDecimal },
    #[error("This discount code is not applicable to this order")]
    NotApplicable,
}

impl From<DiscountError> for super::errors::DomainError {
    fn from(e: DiscountError) -> Self {
        match e {
            DiscountError::NotFound => super::errors::DomainError::NotFound(e.to_string()),
            _ => super::errors::DomainError::Validation(e.to_string()),
        }
    }
}

/// Validate `code` against `subtotal` at time `now` and compute the
/// discount amount.
///
/// Checks run in order: active flag, validity window, usage limit,
/// minimum order total. The raw amount (`subtotal × value / 100` capped
/// at `max_discount_amount` for percentage codes, `value` for fixed
/// codes) is then clamped to `[0, subtotal]` and rounded to two decimal
/// places; a clamped amount of zero is rejected as `NotApplicable`.
///
/// Does not mutate `usage_count`.
pub fn evaluate(
    code: &DiscountCodeView,
    subtotal: &BigDecimal,
    now: DateTime<Utc>,
) -> Result<BigDecimal, DiscountError> {
    if !code.is_active {
        return Err(DiscountError::Inactive);
    }
    if let Some(starts_at) = code.starts_at {
        if now < starts_at {
            return Err(DiscountError::NotYetValid);
        }
    }
    if let Some(ends_at) = code.ends_at {
        if now > ends_at {
            return Err(DiscountError::Expired);
        }
    }
    if let Some(limit) = code.usage_limit {
        if code.usage_count >= limit {
            return Err(DiscountError::UsageExhausted);
        }
    }
    if *subtotal < code.min_order_total {
        return Err(DiscountError::BelowMinimum {
            minimum: code.min_order_total.clone(),
        });
    }

    let mut amount = match code.kind {
        DiscountKind::Percentage => {
            let raw = (subtotal * &code.value) / BigDecimal::from(100);
            match &code.max_discount_amount {
                Some(cap) if raw > *cap => cap.clone(),
                _ => raw,
            }
        }
        DiscountKind::Fixed => code.value.clone(),
    };

    let zero = BigDecimal::from(0);
    if amount > *subtotal {
        amount = subtotal.clone();
    }
    if amount < zero {
        amount = zero.clone();
    }
    // Half-up rounding can overshoot a sub-cent subtotal, so clamp again.
    let mut amount = amount.with_scale_round(2, RoundingMode::HalfUp);
    if amount > *subtotal {
        amount = subtotal.clone();
    }

    if amount <= zero {
        return Err(DiscountError::NotApplicable);
    }
    Ok(amount)
}

/// Final payable total for an order.
///
/// The discount is normalised to `min(discount_amount, subtotal)` so the
/// goods portion never goes negative; delivery fees are always charged
/// in full. Callers reject negative inputs before invoking this.
pub fn compute_total(
    subtotal: &BigDecimal,
    delivery_fees: &BigDecimal,
    discount_amount: &BigDecimal,
) -> BigDecimal {
    let discount = if discount_amount > subtotal {
        subtotal
    } else {
        discount_amount
    };
    (subtotal - discount) + delivery_fees
}
