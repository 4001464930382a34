pub mod discounts;
pub mod orders;

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::errors::AppError;

/// Parse a decimal-as-string JSON field, e.g. "9.99".
pub(crate) fn parse_decimal(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value)
        .map_err(|e| AppError::Validation(format!("Invalid {} '{}': {}", field, value, e)))
}
