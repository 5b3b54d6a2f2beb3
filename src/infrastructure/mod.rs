pub mod lookups;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod notifier;
pub mod order_repo;
