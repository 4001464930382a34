use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::discount::{
    DiscountCodeUpdate, DiscountCodeView, DiscountKind, NewDiscountCode,
};
use crate::errors::AppError;
use crate::AppDiscountService;

use super::parse_decimal;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDiscountCodeRequest {
    pub code: String,
    /// "percentage" or "fixed"
    pub kind: String,
    /// Decimal as a string: percent for percentage codes, amount for fixed.
    pub value: String,
    pub min_order_total: Option<String>,
    /// Cap on the computed amount; meaningful for percentage codes.
    pub max_discount_amount: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub per_user_limit: Option<i32>,
    /// Defaults to true.
    pub is_active: Option<bool>,
}

/// Omitted fields are left unchanged; sending an explicit `null` clears
/// the nullable fields (cap, validity window, limits).
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDiscountCodeRequest {
    pub value: Option<String>,
    pub min_order_total: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_discount_amount: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub starts_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ends_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub usage_limit: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub per_user_limit: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) during deserialization.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountCodeResponse {
    pub id: Uuid,
    pub code: String,
    pub kind: String,
    pub value: String,
    pub min_order_total: String,
    pub max_discount_amount: Option<String>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub per_user_limit: Option<i32>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DiscountCodeView> for DiscountCodeResponse {
    fn from(code: DiscountCodeView) -> Self {
        DiscountCodeResponse {
            id: code.id,
            code: code.code,
            kind: code.kind.to_string(),
            value: code.value.to_string(),
            min_order_total: code.min_order_total.to_string(),
            max_discount_amount: code.max_discount_amount.map(|c| c.to_string()),
            starts_at: code.starts_at.map(|t| t.to_rfc3339()),
            ends_at: code.ends_at.map(|t| t.to_rfc3339()),
            usage_limit: code.usage_limit,
            usage_count: code.usage_count,
            per_user_limit: code.per_user_limit,
            is_active: code.is_active,
            created_at: code.created_at.to_rfc3339(),
            updated_at: code.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListDiscountCodesParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListDiscountCodesResponse {
    pub items: Vec<DiscountCodeResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateDiscountRequest {
    pub code: String,
    /// Cart subtotal as a decimal string.
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateDiscountResponse {
    /// Canonical (uppercased) form of the code.
    pub code: String,
    pub amount: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /discount-codes
#[utoipa::path(
    post,
    path = "/discount-codes",
    request_body = CreateDiscountCodeRequest,
    responses(
        (status = 201, description = "Discount code created", body = DiscountCodeResponse),
        (status = 409, description = "Code already exists"),
        (status = 422, description = "Invalid discount terms"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "discount-codes"
)]
pub async fn create_discount_code(
    svc: web::Data<AppDiscountService>,
    body: web::Json<CreateDiscountCodeRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let new = NewDiscountCode {
        code: body.code,
        kind: body.kind.parse::<DiscountKind>()?,
        value: parse_decimal("value", &body.value)?,
        min_order_total: match body.min_order_total.as_deref() {
            Some(v) => parse_decimal("min_order_total", v)?,
            None => 0.into(),
        },
        max_discount_amount: body
            .max_discount_amount
            .as_deref()
            .map(|v| parse_decimal("max_discount_amount", v))
            .transpose()?,
        starts_at: body.starts_at,
        ends_at: body.ends_at,
        usage_limit: body.usage_limit,
        per_user_limit: body.per_user_limit,
        is_active: body.is_active.unwrap_or(true),
    };

    let svc = svc.into_inner();
    let created = web::block(move || svc.create(new))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(DiscountCodeResponse::from(created)))
}

/// GET /discount-codes
#[utoipa::path(
    get,
    path = "/discount-codes",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of discount codes", body = ListDiscountCodesResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "discount-codes"
)]
pub async fn list_discount_codes(
    svc: web::Data<AppDiscountService>,
    query: web::Query<ListDiscountCodesParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.clamp(1, 1_000_000);
    let limit = params.limit.clamp(1, 100);

    let svc = svc.into_inner();
    let result = web::block(move || svc.list(page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListDiscountCodesResponse {
        items: result
            .items
            .into_iter()
            .map(DiscountCodeResponse::from)
            .collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// GET /discount-codes/{id}
#[utoipa::path(
    get,
    path = "/discount-codes/{id}",
    params(
        ("id" = Uuid, Path, description = "Discount code UUID"),
    ),
    responses(
        (status = 200, description = "Discount code found", body = DiscountCodeResponse),
        (status = 404, description = "Discount code not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "discount-codes"
)]
pub async fn get_discount_code(
    svc: web::Data<AppDiscountService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let svc = svc.into_inner();
    let code = web::block(move || svc.get(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(DiscountCodeResponse::from(code)))
}

/// PUT /discount-codes/{id}
///
/// Partial update; omitted fields are left unchanged.
#[utoipa::path(
    put,
    path = "/discount-codes/{id}",
    params(
        ("id" = Uuid, Path, description = "Discount code UUID"),
    ),
    request_body = UpdateDiscountCodeRequest,
    responses(
        (status = 200, description = "Discount code updated", body = DiscountCodeResponse),
        (status = 404, description = "Discount code not found"),
        (status = 422, description = "Invalid discount terms"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "discount-codes"
)]
pub async fn update_discount_code(
    svc: web::Data<AppDiscountService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateDiscountCodeRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();

    let update = DiscountCodeUpdate {
        value: body
            .value
            .as_deref()
            .map(|v| parse_decimal("value", v))
            .transpose()?,
        min_order_total: body
            .min_order_total
            .as_deref()
            .map(|v| parse_decimal("min_order_total", v))
            .transpose()?,
        max_discount_amount: match body.max_discount_amount {
            None => None,
            Some(None) => Some(None),
            Some(Some(v)) => Some(Some(parse_decimal("max_discount_amount", &v)?)),
        },
        starts_at: body.starts_at,
        ends_at: body.ends_at,
        usage_limit: body.usage_limit,
        per_user_limit: body.per_user_limit,
        is_active: body.is_active,
    };

    let svc = svc.into_inner();
    let updated = web::block(move || svc.update(id, update))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(DiscountCodeResponse::from(updated)))
}

/// DELETE /discount-codes/{id}
#[utoipa::path(
    delete,
    path = "/discount-codes/{id}",
    params(
        ("id" = Uuid, Path, description = "Discount code UUID"),
    ),
    responses(
        (status = 204, description = "Discount code deleted"),
        (status = 404, description = "Discount code not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "discount-codes"
)]
pub async fn delete_discount_code(
    svc: web::Data<AppDiscountService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let svc = svc.into_inner();
    web::block(move || svc.delete(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /discount-codes/validate
///
/// Checkout-time preview: prices a code against a cart subtotal without
/// consuming a use. Eligibility failures come back as 422 with the
/// end-user message.
#[utoipa::path(
    post,
    path = "/discount-codes/validate",
    request_body = ValidateDiscountRequest,
    responses(
        (status = 200, description = "Code is applicable", body = ValidateDiscountResponse),
        (status = 404, description = "Discount code not found"),
        (status = 422, description = "Code not applicable to this subtotal"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "discount-codes"
)]
pub async fn validate_discount_code(
    svc: web::Data<AppDiscountService>,
    body: web::Json<ValidateDiscountRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let subtotal = parse_decimal("subtotal", &body.subtotal)?;

    let svc = svc.into_inner();
    let (code, amount) = web::block(move || svc.validate_for_subtotal(&body.code, &subtotal))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ValidateDiscountResponse {
        code,
        amount: amount.to_string(),
    }))
}
