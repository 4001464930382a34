use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::discount::normalize_code;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    generate_order_code, AppliedDiscount, NewOrderRecord, OrderItemInput, OrderPage, OrderStatus,
    OrderView,
};
use crate::domain::ports::{DiscountRepository, OrderRepository};
use crate::domain::pricing::{compute_total, evaluate, DiscountError};

/// Checkout payload after DTO parsing, before pricing.
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub address: String,
    pub city: String,
    pub items: Vec<OrderItemInput>,
    pub delivery_fees: BigDecimal,
    pub discount_code: Option<String>,
}

pub struct OrderService<O, D> {
    orders: O,
    discounts: D,
}

impl<O: OrderRepository, D: DiscountRepository> OrderService<O, D> {
    pub fn new(orders: O, discounts: D) -> Self {
        Self { orders, discounts }
    }

    /// Price and persist a checkout: compute the subtotal from the item
    /// snapshots, evaluate the discount code (if any), derive the total,
    /// and create the order with its initial `pending` history entry.
    pub fn place_order(&self, input: CheckoutInput) -> Result<OrderView, DomainError> {
        validate_checkout(&input)?;

        let zero = BigDecimal::from(0);
        let subtotal: BigDecimal = input
            .items
            .iter()
            .map(|i| &i.unit_price * BigDecimal::from(i.quantity))
            .sum();

        let discount = match input.discount_code.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let normalized = normalize_code(raw);
                let code = self
                    .discounts
                    .find_by_code(&normalized)?
                    .ok_or(DiscountError::NotFound)?;
                let amount = evaluate(&code, &subtotal, Utc::now())?;
                Some(AppliedDiscount {
                    code_id: code.id,
                    code: code.code,
                    amount,
                })
            }
            _ => None,
        };

        let discount_amount = discount.as_ref().map(|d| d.amount.clone()).unwrap_or(zero);
        let total = compute_total(&subtotal, &input.delivery_fees, &discount_amount);

        self.orders.create(NewOrderRecord {
            order_code: generate_order_code(),
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_email: input.customer_email,
            address: input.address,
            city: input.city,
            items: input.items,
            subtotal,
            delivery_fees: input.delivery_fees,
            discount,
            total,
        })
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        self.orders.find_by_id(id)
    }

    pub fn list_orders(
        &self,
        page: i64,
        limit: i64,
        status: Option<OrderStatus>,
    ) -> Result<OrderPage, DomainError> {
        self.orders.list(page, limit, status)
    }

    /// Admin status transition. Illegal moves (e.g. cancelling a shipped
    /// order) are rejected before touching the database.
    pub fn update_status(
        &self,
        id: Uuid,
        to: OrderStatus,
        note: Option<String>,
    ) -> Result<OrderView, DomainError> {
        let order = self
            .orders
            .find_by_id(id)?
            .ok_or_else(|| DomainError::NotFound("Order not found".to_string()))?;

        if !order.status.can_transition_to(to) {
            return Err(DomainError::Validation(format!(
                "Cannot move order from '{}' to '{}'",
                order.status, to
            )));
        }

        self.orders.update_status(id, order.status, to, note)
    }
}

fn validate_checkout(input: &CheckoutInput) -> Result<(), DomainError> {
    let zero = BigDecimal::from(0);

    if input.customer_name.trim().is_empty() {
        return Err(DomainError::Validation("Customer name is required".into()));
    }
    if input.customer_phone.trim().is_empty() {
        return Err(DomainError::Validation("Customer phone is required".into()));
    }
    if input.address.trim().is_empty() {
        return Err(DomainError::Validation("Delivery address is required".into()));
    }
    if input.items.is_empty() {
        return Err(DomainError::Validation(
            "Order must contain at least one item".into(),
        ));
    }
    for item in &input.items {
        if item.quantity <= 0 {
            return Err(DomainError::Validation(format!(
                "Quantity for '{}' must be positive",
                item.title
            )));
        }
        if item.unit_price < zero {
            return Err(DomainError::Validation(format!(
                "Price for '{}' cannot be negative",
                item.title
            )));
        }
    }
    if input.delivery_fees < zero {
        return Err(DomainError::Validation(
            "Delivery fees cannot be negative".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::discount::{
        DiscountCodeUpdate, DiscountCodeView, DiscountKind, DiscountPage, NewDiscountCode,
    };
    use crate::domain::order::StatusChangeView;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[derive(Default)]
    struct InMemoryOrders {
        orders: Mutex<Vec<OrderView>>,
    }

    impl OrderRepository for InMemoryOrders {
        fn create(&self, order: NewOrderRecord) -> Result<OrderView, DomainError> {
            let now = Utc::now();
            let view = OrderView {
                id: Uuid::new_v4(),
                order_code: order.order_code,
                customer_name: order.customer_name,
                customer_phone: order.customer_phone,
                customer_email: order.customer_email,
                address: order.address,
                city: order.city,
                subtotal: order.subtotal,
                delivery_fees: order.delivery_fees,
                discount_code: order.discount.as_ref().map(|d| d.code.clone()),
                discount_amount: order
                    .discount
                    .map(|d| d.amount)
                    .unwrap_or_else(|| BigDecimal::from(0)),
                total: order.total,
                status: OrderStatus::Pending,
                created_at: now,
                items: vec![],
                history: vec![StatusChangeView {
                    status: OrderStatus::Pending,
                    note: None,
                    changed_at: now,
                }],
            };
            self.orders.lock().unwrap().push(view.clone());
            Ok(view)
        }

        fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id == id)
                .cloned())
        }

        fn list(
            &self,
            _page: i64,
            _limit: i64,
            _status: Option<OrderStatus>,
        ) -> Result<OrderPage, DomainError> {
            let orders = self.orders.lock().unwrap();
            Ok(OrderPage {
                items: orders.clone(),
                total: orders.len() as i64,
            })
        }

        fn update_status(
            &self,
            id: Uuid,
            from: OrderStatus,
            to: OrderStatus,
            note: Option<String>,
        ) -> Result<OrderView, DomainError> {
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .iter_mut()
                .find(|o| o.id == id && o.status == from)
                .ok_or_else(|| DomainError::NotFound("Order not found".to_string()))?;
            order.status = to;
            order.history.push(StatusChangeView {
                status: to,
                note,
                changed_at: Utc::now(),
            });
            Ok(order.clone())
        }
    }

    #[derive(Default)]
    struct InMemoryDiscounts {
        codes: Mutex<HashMap<String, DiscountCodeView>>,
    }

    impl InMemoryDiscounts {
        fn with_code(code: DiscountCodeView) -> Self {
            let repo = Self::default();
            repo.codes
                .lock()
                .unwrap()
                .insert(code.code.clone(), code);
            repo
        }
    }

    impl DiscountRepository for InMemoryDiscounts {
        fn create(&self, _new: NewDiscountCode) -> Result<DiscountCodeView, DomainError> {
            unimplemented!("not needed in these tests")
        }

        fn find_by_id(&self, id: Uuid) -> Result<Option<DiscountCodeView>, DomainError> {
            Ok(self
                .codes
                .lock()
                .unwrap()
                .values()
                .find(|c| c.id == id)
                .cloned())
        }

        fn find_by_code(&self, code: &str) -> Result<Option<DiscountCodeView>, DomainError> {
            Ok(self.codes.lock().unwrap().get(code).cloned())
        }

        fn list(&self, _page: i64, _limit: i64) -> Result<DiscountPage, DomainError> {
            unimplemented!("not needed in these tests")
        }

        fn update(
            &self,
            _id: Uuid,
            _update: DiscountCodeUpdate,
        ) -> Result<DiscountCodeView, DomainError> {
            unimplemented!("not needed in these tests")
        }

        fn delete(&self, _id: Uuid) -> Result<(), DomainError> {
            unimplemented!("not needed in these tests")
        }
    }

    fn percentage_code(code: &str, value: &str) -> DiscountCodeView {
        DiscountCodeView {
            id: Uuid::new_v4(),
            code: code.to_string(),
            kind: DiscountKind::Percentage,
            value: dec(value),
            min_order_total: dec("0"),
            max_discount_amount: None,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
            usage_count: 0,
            per_user_limit: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(title: &str, price: &str, quantity: i32) -> OrderItemInput {
        OrderItemInput {
            book_id: Uuid::new_v4(),
            title: title.to_string(),
            unit_price: dec(price),
            quantity,
        }
    }

    fn checkout(items: Vec<OrderItemInput>, discount_code: Option<&str>) -> CheckoutInput {
        CheckoutInput {
            customer_name: "Nadia K.".to_string(),
            customer_phone: "+212600000000".to_string(),
            customer_email: None,
            address: "12 Rue des Libraires".to_string(),
            city: "Casablanca".to_string(),
            items,
            delivery_fees: dec("7"),
            discount_code: discount_code.map(String::from),
        }
    }

    fn service_with_code(
        code: DiscountCodeView,
    ) -> OrderService<InMemoryOrders, InMemoryDiscounts> {
        OrderService::new(InMemoryOrders::default(), InMemoryDiscounts::with_code(code))
    }

    #[test]
    fn checkout_without_discount_sums_items_and_adds_delivery() {
        let svc = OrderService::new(InMemoryOrders::default(), InMemoryDiscounts::default());
        let order = svc
            .place_order(checkout(
                vec![item("Dune", "25.50", 2), item("Foundation", "19", 1)],
                None,
            ))
            .expect("checkout failed");

        assert_eq!(order.subtotal, dec("70.00"));
        assert_eq!(order.discount_amount, dec("0"));
        assert_eq!(order.total, dec("77.00"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_code.starts_with("BK-"));
    }

    #[test]
    fn checkout_applies_percentage_discount() {
        let svc = service_with_code(percentage_code("SUMMER20", "20"));
        let order = svc
            .place_order(checkout(vec![item("Dune", "100", 1)], Some("summer20")))
            .expect("checkout failed");

        assert_eq!(order.discount_code.as_deref(), Some("SUMMER20"));
        assert_eq!(order.discount_amount, dec("20.00"));
        // total = max(0, subtotal - discount) + delivery
        assert_eq!(order.total, dec("87.00"));
    }

    #[test]
    fn checkout_trims_and_uppercases_the_code() {
        let svc = service_with_code(percentage_code("SUMMER20", "20"));
        let order = svc
            .place_order(checkout(vec![item("Dune", "100", 1)], Some("  Summer20 ")))
            .expect("checkout failed");
        assert_eq!(order.discount_code.as_deref(), Some("SUMMER20"));
    }

    #[test]
    fn unknown_code_fails_with_not_found() {
        let svc = OrderService::new(InMemoryOrders::default(), InMemoryDiscounts::default());
        let err = svc
            .place_order(checkout(vec![item("Dune", "100", 1)], Some("NOPE")))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn below_minimum_surfaces_the_evaluator_message() {
        let mut code = percentage_code("BIG10", "10");
        code.min_order_total = dec("200");
        let svc = service_with_code(code);
        let err = svc
            .place_order(checkout(vec![item("Dune", "100", 1)], Some("BIG10")))
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("200")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn blank_discount_code_is_treated_as_absent() {
        let svc = OrderService::new(InMemoryOrders::default(), InMemoryDiscounts::default());
        let order = svc
            .place_order(checkout(vec![item("Dune", "10", 1)], Some("   ")))
            .expect("checkout failed");
        assert!(order.discount_code.is_none());
    }

    #[test]
    fn empty_cart_is_rejected() {
        let svc = OrderService::new(InMemoryOrders::default(), InMemoryDiscounts::default());
        let err = svc.place_order(checkout(vec![], None)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let svc = OrderService::new(InMemoryOrders::default(), InMemoryDiscounts::default());
        let err = svc
            .place_order(checkout(vec![item("Dune", "10", 0)], None))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_delivery_fees_are_rejected() {
        let svc = OrderService::new(InMemoryOrders::default(), InMemoryDiscounts::default());
        let mut input = checkout(vec![item("Dune", "10", 1)], None);
        input.delivery_fees = dec("-1");
        assert!(matches!(
            svc.place_order(input).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn legal_status_transition_appends_history() {
        let svc = OrderService::new(InMemoryOrders::default(), InMemoryDiscounts::default());
        let order = svc
            .place_order(checkout(vec![item("Dune", "10", 1)], None))
            .expect("checkout failed");

        let updated = svc
            .update_status(order.id, OrderStatus::Confirmed, Some("called client".into()))
            .expect("transition failed");

        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(updated.history.len(), 2);
        assert_eq!(updated.history[1].note.as_deref(), Some("called client"));
    }

    #[test]
    fn illegal_status_transition_is_rejected() {
        let svc = OrderService::new(InMemoryOrders::default(), InMemoryDiscounts::default());
        let order = svc
            .place_order(checkout(vec![item("Dune", "10", 1)], None))
            .expect("checkout failed");

        let err = svc
            .update_status(order.id, OrderStatus::Delivered, None)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn expired_code_is_rejected_at_checkout() {
        let mut code = percentage_code("OLD", "20");
        code.ends_at = Some(Utc::now() - chrono::Duration::days(2));
        let svc = service_with_code(code);
        let err = svc
            .place_order(checkout(vec![item("Dune", "100", 1)], Some("OLD")))
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("expired")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
