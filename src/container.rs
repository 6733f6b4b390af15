//! The public `Container`: construction, the singleton cache and the
//! resolution surface.

use crate::core::{AnyService, ServiceToken};
use crate::error::ContainerError;
use crate::registration::{Initialization, Settings};
use crate::registry::Registry;
use crate::resolver::Resolver;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A constructor-injection service container.
///
/// The container owns an interface registry built once at construction and
/// an append-only singleton cache: each declared type is constructed at most
/// once for the container's lifetime, and dropping the container releases
/// every cached instance together.
///
/// All resolution entry points serialize on one internal lock: a top-level
/// call and its entire recursive descent finish before the next caller
/// proceeds, so the in-progress construction set is never observed by
/// another traversal and the cache never has two writers.
pub struct Container {
  registry: Registry,
  cache: Mutex<HashMap<TypeId, AnyService>>,
}

impl Container {
  /// Builds a container from the declared services and pre-built instances.
  ///
  /// Fails with `InvalidState` when two registrations provide the same
  /// capability or a service designates more than one constructor, and with
  /// the originating error when [`Initialization::EagerAll`] cannot resolve
  /// a declared service. A failed construction never yields a partial
  /// container.
  pub fn new(settings: Settings) -> Result<Self, ContainerError> {
    let Settings {
      initialization,
      services,
      instances,
    } = settings;

    let (registry, seeds) = Registry::build(services, instances)?;

    let mut cache = HashMap::new();
    for (id, instance) in seeds {
      cache.insert(id, instance);
    }

    let container = Self {
      registry,
      cache: Mutex::new(cache),
    };

    if initialization == Initialization::EagerAll {
      let mut cache = container.cache.lock();
      for token in container.registry.declared() {
        let binding = container.registry.binding(token.id).ok_or_else(|| {
          ContainerError::not_found(format!("'{}' is not registered", token.name))
        })?;
        Resolver::new(&container.registry, &mut cache).resolve_required(binding.descriptor.clone())?;
      }
      debug!(
        services = container.registry.declared().len(),
        "eager initialization complete"
      );
    }

    Ok(container)
  }

  /// Resolves a service by type. `T` may be a registered concrete type or a
  /// capability trait object (`dyn Capability`).
  ///
  /// Returns the process-wide singleton; repeated calls yield the identical
  /// instance. Fails with `NotFound` when `T` has no bound implementation.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>, ContainerError> {
    let token = ServiceToken::of::<T>();
    let binding = self.registry.binding(token.id).ok_or_else(|| {
      ContainerError::not_found(format!("no registered implementation for '{}'", token.name))
    })?;

    let mut cache = self.cache.lock();
    let instance =
      Resolver::new(&self.registry, &mut cache).resolve_required(binding.descriptor.clone())?;

    let shaped = (binding.cast)(&instance).ok_or_else(|| identity_mismatch(token.name))?;
    shaped
      .downcast::<Arc<T>>()
      .map(|boxed| *boxed)
      .map_err(|_| identity_mismatch(token.name))
  }

  /// Resolves a service by registered name, returning the type-erased
  /// concrete instance. Names default to the type name unless overridden at
  /// registration.
  pub fn get_by_name(&self, name: &str) -> Result<AnyService, ContainerError> {
    if name.is_empty() {
      return Err(ContainerError::invalid_parameter("service name is empty"));
    }
    let binding = self.registry.binding_by_name(name).ok_or_else(|| {
      ContainerError::not_found(format!("no registered implementation for '{}'", name))
    })?;
    let descriptor = binding.descriptor.clone();

    let mut cache = self.cache.lock();
    Resolver::new(&self.registry, &mut cache).resolve_required(descriptor)
  }
}

impl std::fmt::Debug for Container {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Container").finish_non_exhaustive()
  }
}

fn identity_mismatch(name: &str) -> ContainerError {
  ContainerError::invalid_state(format!(
    "cached instance does not match the identity of '{}'",
    name
  ))
}
