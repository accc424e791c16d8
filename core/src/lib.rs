//! Lead intelligence engine.
//!
//! Four independent analyzers over a pipeline snapshot:
//! momentum, patterns, forecast and actions. Each is a pure function of
//! `(leads, activities, now)`.

pub mod actions;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod lead;
pub mod momentum;
pub mod name_generator;
pub mod patterns;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod synthetic;
pub mod types;
pub mod valuation;

pub use actions::prioritize_actions;
pub use forecast::forecast_revenue;
pub use momentum::compute_momentum;
pub use patterns::detect_patterns;
