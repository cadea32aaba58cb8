//! Domain layer for the weekly briefing pipeline
//!
//! Contains the entities and value objects that flow through generation,
//! rendering and delivery, plus domain errors.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
