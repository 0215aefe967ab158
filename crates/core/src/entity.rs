//! Entity trait: identity that survives state changes.

/// A domain object with identity.
///
/// Two entities are the same entity when their ids match, regardless of the
/// rest of their attributes (a client keeps its id across inline edits).
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
