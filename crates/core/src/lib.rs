//! `slotwise-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the domain error model, and smallest-unit
//! measure value objects shared by the warehouse modules.

pub mod entity;
pub mod error;
pub mod id;
pub mod measure;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BranchId, CompanyId, HandlingUnitId, ItemId, JobId, LocationId};
pub use measure::{Dimensions, Quantity, Volume, Weight};
pub use value_object::ValueObject;
