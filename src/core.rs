//! Core, non-public data structures for the service container.

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased service instance. Always holds the concrete object; edges
/// that requested a capability receive a reshaped view of it.
pub type AnyService = Arc<dyn Any + Send + Sync>;

/// A resolved value shaped for one requesting edge: a boxed `Arc<Concrete>`
/// or `Arc<dyn Capability>`, depending on the edge's target token.
pub(crate) type ShapedService = Box<dyn Any + Send + Sync>;

/// Reshapes a concrete instance for a requesting edge. Returns `None` when
/// the stored instance does not match the binding's concrete identity.
pub(crate) type CastFn = Box<dyn Fn(&AnyService) -> Option<ShapedService> + Send + Sync>;

/// A stable per-type token. Identity is the `TypeId`; the name rides along
/// for diagnostics and string lookup.
#[derive(Clone, Copy)]
pub(crate) struct ServiceToken {
  pub(crate) id: TypeId,
  pub(crate) name: &'static str,
}

impl ServiceToken {
  pub(crate) fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub(crate) fn renamed(self, name: &'static str) -> Self {
    Self { name, ..self }
  }
}

impl PartialEq for ServiceToken {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for ServiceToken {}

impl Hash for ServiceToken {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for ServiceToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Token({})", self.name)
  }
}

/// The set of concrete types under construction on the active call stack.
///
/// Created for one top-level resolution, mutated by the nested recursive
/// calls, and discarded when that call returns or fails. The container's
/// resolution lock guarantees it is never observed by another traversal.
#[derive(Default)]
pub(crate) struct ResolutionContext {
  in_progress: HashSet<TypeId>,
}

impl ResolutionContext {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn contains(&self, id: TypeId) -> bool {
    self.in_progress.contains(&id)
  }

  pub(crate) fn enter(&mut self, id: TypeId) {
    self.in_progress.insert(id);
  }

  pub(crate) fn exit(&mut self, id: TypeId) {
    self.in_progress.remove(&id);
  }
}
