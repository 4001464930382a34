use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::CheckoutInput;
use crate::domain::order::{OrderItemInput, OrderStatus, OrderView};
use crate::errors::AppError;
use crate::AppOrderService;

use super::parse_decimal;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutItemRequest {
    pub book_id: Uuid,
    /// Title snapshot shown on the order, independent of later catalog edits.
    pub title: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub address: String,
    pub city: String,
    pub items: Vec<CheckoutItemRequest>,
    /// Decimal fee as a string, e.g. "7.00"
    pub delivery_fees: String,
    pub discount_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub unit_price: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChangeResponse {
    pub status: String,
    pub note: Option<String>,
    pub changed_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub address: String,
    pub city: String,
    pub subtotal: String,
    pub delivery_fees: String,
    pub discount_code: Option<String>,
    pub discount_amount: String,
    pub total: String,
    pub status: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
    pub status_history: Vec<StatusChangeResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            order_code: order.order_code,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_email: order.customer_email,
            address: order.address,
            city: order.city,
            subtotal: order.subtotal.to_string(),
            delivery_fees: order.delivery_fees.to_string(),
            discount_code: order.discount_code,
            discount_amount: order.discount_amount.to_string(),
            total: order.total.to_string(),
            status: order.status.to_string(),
            created_at: order.created_at.to_rfc3339(),
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    book_id: i.book_id,
                    title: i.title,
                    unit_price: i.unit_price.to_string(),
                    quantity: i.quantity,
                })
                .collect(),
            status_history: order
                .history
                .into_iter()
                .map(|h| StatusChangeResponse {
                    status: h.status.to_string(),
                    note: h.note,
                    changed_at: h.changed_at.to_rfc3339(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub note: Option<String>,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Optional status filter, e.g. "pending".
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Checkout: prices the cart (subtotal from the item snapshots, discount
/// evaluation, total), then persists the order, its items, and the
/// initial `pending` history entry in one transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 404, description = "Discount code not found"),
        (status = 422, description = "Invalid cart or ineligible discount code"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    svc: web::Data<AppOrderService>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let items = body
        .items
        .into_iter()
        .map(|i| {
            Ok(OrderItemInput {
                book_id: i.book_id,
                title: i.title,
                unit_price: parse_decimal("unit_price", &i.unit_price)?,
                quantity: i.quantity,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let input = CheckoutInput {
        customer_name: body.customer_name,
        customer_phone: body.customer_phone,
        customer_email: body.customer_email,
        address: body.address,
        city: body.city,
        items,
        delivery_fees: parse_decimal("delivery_fees", &body.delivery_fees)?,
        discount_code: body.discount_code,
    };

    let svc = svc.into_inner();
    let order = web::block(move || svc.place_order(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
///
/// Returns the order with its item snapshots and status history.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    svc: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let svc = svc.into_inner();
    let order = web::block(move || svc.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound("Order not found".to_string())),
    }
}

/// GET /orders
///
/// Paginated list of orders (without items or history), newest first.
/// Use `page` (1-based), `limit`, and optionally `status` to filter.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 422, description = "Unknown status filter"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    svc: web::Data<AppOrderService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.clamp(1, 1_000_000);
    let limit = params.limit.clamp(1, 100);

    let status = params
        .status
        .as_deref()
        .map(|s| s.parse::<OrderStatus>())
        .transpose()?;

    let svc = svc.into_inner();
    let result = web::block(move || svc.list_orders(page, limit, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// PATCH /orders/{id}/status
///
/// Admin-side lifecycle transition. Illegal moves (per the order state
/// machine) are rejected with 422.
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order changed concurrently"),
        (status = 422, description = "Illegal status transition"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    svc: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let status = body.status.parse::<OrderStatus>()?;

    let svc = svc.into_inner();
    let order = web::block(move || svc.update_status(order_id, status, body.note))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
