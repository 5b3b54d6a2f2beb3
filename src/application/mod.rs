pub mod order_builder;
pub mod order_service;
