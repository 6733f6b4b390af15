//! The recursive resolution algorithm.

use crate::core::{AnyService, ResolutionContext, ShapedService};
use crate::error::ContainerError;
use crate::registration::ResolvedArgs;
use crate::registry::{Binding, Registry, ServiceDescriptor};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Upper bound on recursion depth. Converts degenerate dependency graphs
/// into a deterministic error instead of unbounded descent.
pub(crate) const MAX_RESOLUTION_DEPTH: u32 = 100;

/// One pass over the object graph. Borrows the immutable registry and the
/// cache, which the container keeps locked for the entire top-level call.
pub(crate) struct Resolver<'a> {
  registry: &'a Registry,
  cache: &'a mut HashMap<TypeId, AnyService>,
}

impl<'a> Resolver<'a> {
  pub fn new(registry: &'a Registry, cache: &'a mut HashMap<TypeId, AnyService>) -> Self {
    Self { registry, cache }
  }

  /// Resolves a concrete service where degrading is not an option. Entry
  /// point for the public lookups and for eager initialization.
  pub fn resolve_required(
    &mut self,
    descriptor: Arc<ServiceDescriptor>,
  ) -> Result<AnyService, ContainerError> {
    let name = descriptor.token.name;
    let mut context = ResolutionContext::new();
    self.resolve(descriptor, false, &mut context, 0)?.ok_or_else(|| {
      // A non-optional resolution either produces an instance or fails.
      ContainerError::invalid_state(format!("resolution of '{}' produced no instance", name))
    })
  }

  /// Resolves one concrete service for one requesting edge.
  ///
  /// `optional` is the requesting edge's flag: every unresolvable state at
  /// this edge (depth, allow list, cycle, missing constructor) degrades to
  /// `Ok(None)` when it is set and fails otherwise. Failures deeper in the
  /// subtree propagate regardless once construction has begun there.
  fn resolve(
    &mut self,
    descriptor: Arc<ServiceDescriptor>,
    optional: bool,
    context: &mut ResolutionContext,
    depth: u32,
  ) -> Result<Option<AnyService>, ContainerError> {
    let token = descriptor.token;

    if depth > MAX_RESOLUTION_DEPTH {
      return degrade(optional, || {
        ContainerError::invalid_state(format!(
          "maximum resolution depth reached while resolving '{}'",
          token.name
        ))
      });
    }

    // A cache hit wins over every other check, including the cycle logic.
    if let Some(cached) = self.cache.get(&token.id) {
      trace!(service = token.name, "cache hit");
      return Ok(Some(cached.clone()));
    }

    if !self.registry.is_allowed(token.id) {
      return degrade(optional, || {
        ContainerError::not_found(format!("not allowed to create '{}'", token.name))
      });
    }

    if context.contains(token.id) {
      if optional {
        debug!(service = token.name, "circular edge degraded to none");
        return Ok(None);
      }
      return Err(ContainerError::invalid_state(format!(
        "circular reference involving '{}'",
        token.name
      )));
    }

    let constructor = match &descriptor.constructor {
      Some(constructor) => constructor,
      None => {
        return degrade(optional, || {
          ContainerError::not_found(format!("no designated constructor for '{}'", token.name))
        });
      }
    };

    context.enter(token.id);
    trace!(service = token.name, depth, "constructing service");

    let registry = self.registry;
    let mut values: Vec<(bool, Option<ShapedService>)> =
      Vec::with_capacity(constructor.dependencies.len());
    for dependency in &constructor.dependencies {
      let value = match registry.binding(dependency.target.id) {
        None if dependency.optional => {
          debug!(
            service = token.name,
            dependency = dependency.target.name,
            "unbound optional dependency degraded to none"
          );
          None
        }
        None => {
          return Err(ContainerError::not_found(format!(
            "no registered implementation for '{}' required by '{}'",
            dependency.target.name, token.name
          )));
        }
        Some(binding) => {
          match self.resolve(binding.descriptor.clone(), dependency.optional, context, depth + 1)? {
            None => None,
            Some(instance) => Some(shape(binding, &instance, dependency.target.name)?),
          }
        }
      };
      values.push((dependency.optional, value));
    }

    let mut args = ResolvedArgs::new(values);
    let instance = (constructor.build)(&mut args)?;
    context.exit(token.id);
    // The cache is written only after full construction; a failed
    // resolution never leaves a partial entry.
    self.cache.insert(token.id, instance.clone());
    debug!(service = token.name, "service constructed and cached");
    Ok(Some(instance))
  }
}

// Reshapes the concrete instance for the requesting edge's token.
fn shape(
  binding: &Binding,
  instance: &AnyService,
  target: &str,
) -> Result<ShapedService, ContainerError> {
  (binding.cast)(instance).ok_or_else(|| {
    ContainerError::invalid_state(format!(
      "cached instance does not match the identity of '{}'",
      target
    ))
  })
}

fn degrade(
  optional: bool,
  error: impl FnOnce() -> ContainerError,
) -> Result<Option<AnyService>, ContainerError> {
  if optional {
    Ok(None)
  } else {
    Err(error())
  }
}
