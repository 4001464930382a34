use uuid::Uuid;

use super::discount::{DiscountCodeUpdate, DiscountCodeView, DiscountPage, NewDiscountCode};
use super::errors::DomainError;
use super::order::{NewOrderRecord, OrderPage, OrderStatus, OrderView};

pub trait OrderRepository: Send + Sync + 'static {
    /// Persist the order, its item snapshots, and the initial `pending`
    /// history row in one transaction. When a discount is attached, the
    /// code's usage count is incremented in the same transaction, guarded
    /// against the usage limit.
    fn create(&self, order: NewOrderRecord) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(
        &self,
        page: i64,
        limit: i64,
        status: Option<OrderStatus>,
    ) -> Result<OrderPage, DomainError>;
    /// Compare-and-set status update: fails if the stored status is no
    /// longer `from`. Appends a history row on success.
    fn update_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        note: Option<String>,
    ) -> Result<OrderView, DomainError>;
}

pub trait DiscountRepository: Send + Sync + 'static {
    fn create(&self, new: NewDiscountCode) -> Result<DiscountCodeView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<DiscountCodeView>, DomainError>;
    /// Lookup by normalized code (trimmed, uppercased).
    fn find_by_code(&self, code: &str) -> Result<Option<DiscountCodeView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<DiscountPage, DomainError>;
    fn update(
        &self,
        id: Uuid,
        update: DiscountCodeUpdate,
    ) -> Result<DiscountCodeView, DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}
