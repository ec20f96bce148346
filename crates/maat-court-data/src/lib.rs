//! Links legal-aid (MAAT) applications to common platform court cases and applies court
//! events to the linked records.

pub mod config;
pub mod consumer;
pub mod domain;
pub mod error;
pub mod hearing;
pub mod link;
pub mod reference;
pub mod status;
pub mod store;
pub mod telemetry;
