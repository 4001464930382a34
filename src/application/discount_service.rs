use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::discount::{
    normalize_code, DiscountCodeUpdate, DiscountCodeView, DiscountKind, DiscountPage,
    NewDiscountCode,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::DiscountRepository;
use crate::domain::pricing::{evaluate, DiscountError};

pub struct DiscountService<D> {
    repo: D,
}

impl<D: DiscountRepository> DiscountService<D> {
    pub fn new(repo: D) -> Self {
        Self { repo }
    }

    pub fn create(&self, mut new: NewDiscountCode) -> Result<DiscountCodeView, DomainError> {
        new.code = normalize_code(&new.code);
        if new.code.is_empty() {
            return Err(DomainError::Validation("Discount code is required".into()));
        }
        validate_terms(
            new.kind,
            &new.value,
            &new.min_order_total,
            new.starts_at,
            new.ends_at,
            new.usage_limit,
            new.per_user_limit,
        )?;
        self.repo.create(new)
    }

    pub fn get(&self, id: Uuid) -> Result<DiscountCodeView, DomainError> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| DomainError::NotFound("Discount code not found".to_string()))
    }

    pub fn list(&self, page: i64, limit: i64) -> Result<DiscountPage, DomainError> {
        self.repo.list(page, limit)
    }

    pub fn update(
        &self,
        id: Uuid,
        update: DiscountCodeUpdate,
    ) -> Result<DiscountCodeView, DomainError> {
        let existing = self.get(id)?;
        validate_terms(
            existing.kind,
            update.value.as_ref().unwrap_or(&existing.value),
            update
                .min_order_total
                .as_ref()
                .unwrap_or(&existing.min_order_total),
            update.starts_at.unwrap_or(existing.starts_at),
            update.ends_at.unwrap_or(existing.ends_at),
            update.usage_limit.unwrap_or(existing.usage_limit),
            update.per_user_limit.unwrap_or(existing.per_user_limit),
        )?;
        self.repo.update(id, update)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id)
    }

    /// Checkout-time preview: resolve the code and price it against a
    /// subtotal. Read-only; usage counting happens when an order is
    /// actually placed.
    pub fn validate_for_subtotal(
        &self,
        raw_code: &str,
        subtotal: &BigDecimal,
    ) -> Result<(String, BigDecimal), DomainError> {
        let normalized = normalize_code(raw_code);
        let code = self
            .repo
            .find_by_code(&normalized)?
            .ok_or(DiscountError::NotFound)?;
        let amount = evaluate(&code, subtotal, Utc::now())?;
        Ok((code.code, amount))
    }
}

fn validate_terms(
    kind: DiscountKind,
    value: &BigDecimal,
    min_order_total: &BigDecimal,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    usage_limit: Option<i32>,
    per_user_limit: Option<i32>,
) -> Result<(), DomainError> {
    let zero = BigDecimal::from(0);

    if *value <= zero {
        return Err(DomainError::Validation(
            "Discount value must be positive".into(),
        ));
    }
    if kind == DiscountKind::Percentage && *value > BigDecimal::from(100) {
        return Err(DomainError::Validation(
            "Percentage discount cannot exceed 100".into(),
        ));
    }
    if *min_order_total < zero {
        return Err(DomainError::Validation(
            "Minimum order total cannot be negative".into(),
        ));
    }
    if let (Some(starts_at), Some(ends_at)) = (starts_at, ends_at) {
        if ends_at <= starts_at {
            return Err(DomainError::Validation(
                "End date must be after start date".into(),
            ));
        }
    }
    if let Some(limit) = usage_limit {
        if limit <= 0 {
            return Err(DomainError::Validation(
                "Usage limit must be positive".into(),
            ));
        }
    }
    if let Some(limit) = per_user_limit {
        if limit <= 0 {
            return Err(DomainError::Validation(
                "Per-user limit must be positive".into(),
            ));
        }
    }
    Ok(())
}
