//! Core types, rate engines, and quote orchestration for the freightquote comparison tool.

/// Runtime settings: tax rates, fuel percentages, and risk bearer.
pub mod config;
/// Pricing engines shared by every carrier configuration.
pub mod engine;
/// Domain models and identifiers shared by all carriers.
pub mod model;
/// Two-decimal money rounding.
pub mod money;
/// Ordered surcharge steps and the ledger they fill.
pub mod pipeline;
/// Registry and helpers for plugging carrier rate engines into the service.
pub mod plugin;
/// Traits describing the engine and location lookup interfaces.
pub mod ports;
/// Pincode registry loaded from CSV.
pub mod registry;
/// High-level service facade used by clients.
pub mod service;
/// GST computation and total assembly.
pub mod tax;
/// Actual, volumetric, and chargeable weight.
pub mod weight;
/// Location to zone resolution with fallback precedence.
pub mod zones;

pub use config::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;
