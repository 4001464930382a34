pub mod discount_service;
pub mod order_service;
