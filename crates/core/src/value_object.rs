//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// create a new one with the new values.
///
/// - **Value Object**: No identity (two value objects with same values are equal),
///   e.g. `Weight`, `Dimensions`.
/// - **Entity**: Has identity (two entities with same ID are the same entity),
///   e.g. a storage location.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
