//! Entity trait: a record with a stable numeric identity.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + Into<i64> + Send + Sync + 'static;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
