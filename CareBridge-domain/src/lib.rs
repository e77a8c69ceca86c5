// CareBridge Domain
// This crate contains the health metric aggregation logic for the CareBridge client

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Re-export the repository module from care_bridge_data for convenience
pub use care_bridge_data::repository;

// Testing utilities - only available with mock feature or in tests
#[cfg(any(test, feature = "mock"))]
pub mod testing;
