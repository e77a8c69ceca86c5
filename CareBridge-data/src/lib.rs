// CareBridge Data
// This crate handles API access, session storage and metric repositories

// REST client for the CareBridge API
pub mod api;

// Wire models
pub mod models;

// Repository implementations for metric records
pub mod repository;

// Session persistence
pub mod session;

// Validation helpers shared with the domain layer
pub mod validation;
