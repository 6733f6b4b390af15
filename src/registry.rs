//! The interface registry: every requestable token mapped to its single
//! binding, plus the allow list and the name index. Built once at container
//! construction and immutable thereafter.

use crate::core::{AnyService, CastFn, ServiceToken};
use crate::error::ContainerError;
use crate::registration::{Constructor, InstanceRegistration, ServiceRegistration};
use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Immutable identity of one declared or pre-built service: its concrete
/// token and its designated constructor, if any.
pub(crate) struct ServiceDescriptor {
  pub token: ServiceToken,
  pub constructor: Option<Constructor>,
}

/// One requestable token bound to its single implementation, with the shim
/// that reshapes the cached concrete instance for this token.
pub(crate) struct Binding {
  pub descriptor: Arc<ServiceDescriptor>,
  pub cast: CastFn,
}

#[derive(Default)]
pub(crate) struct Registry {
  bindings: HashMap<TypeId, Binding>,
  names: HashMap<&'static str, TypeId>,
  allowed: HashSet<TypeId>,
  declared: Vec<ServiceToken>,
}

impl Registry {
  /// Builds the registry from the declared services and pre-built
  /// instances, returning the cache seeds for the latter. Fails on binding
  /// collisions and duplicate registrations; a failed build never yields a
  /// partial registry.
  pub fn build(
    services: Vec<ServiceRegistration>,
    instances: Vec<InstanceRegistration>,
  ) -> Result<(Self, Vec<(TypeId, AnyService)>), ContainerError> {
    let mut registry = Registry::default();

    for service in services {
      if service.extra_constructors > 0 {
        return Err(ContainerError::invalid_state(format!(
          "'{}' designates more than one constructor",
          service.token.name
        )));
      }
      let descriptor = Arc::new(ServiceDescriptor {
        token: service.token,
        constructor: service.constructor,
      });
      registry.declared.push(service.token);
      registry.allowed.insert(service.token.id);
      registry.bind(service.token, &descriptor, service.self_cast)?;
      for capability in service.capabilities {
        registry.bind(capability.token, &descriptor, capability.cast)?;
      }
      debug!(service = descriptor.token.name, "service registered");
    }

    let mut seeds = Vec::with_capacity(instances.len());
    for instance in instances {
      let descriptor = Arc::new(ServiceDescriptor {
        token: instance.token,
        constructor: None,
      });
      registry.allowed.insert(instance.token.id);
      registry.bind(instance.token, &descriptor, instance.self_cast)?;
      for capability in instance.capabilities {
        registry.bind(capability.token, &descriptor, capability.cast)?;
      }
      seeds.push((instance.token.id, instance.instance));
      debug!(service = descriptor.token.name, "pre-built instance registered");
    }

    Ok((registry, seeds))
  }

  // At most one implementation per token, and at most one token per lookup
  // name. A violated binding fails construction, never silently overrides.
  fn bind(
    &mut self,
    token: ServiceToken,
    descriptor: &Arc<ServiceDescriptor>,
    cast: CastFn,
  ) -> Result<(), ContainerError> {
    if token.name.is_empty() {
      return Err(ContainerError::invalid_parameter(
        "service name is empty",
      ));
    }
    if let Some(previous_id) = self.names.get(token.name) {
      if *previous_id != token.id {
        let previous = self
          .bindings
          .get(previous_id)
          .map(|binding| binding.descriptor.token.name)
          .unwrap_or(token.name);
        return Err(ContainerError::invalid_state(format!(
          "'{}' and '{}' both use the name '{}'",
          previous, descriptor.token.name, token.name
        )));
      }
    }
    match self.bindings.entry(token.id) {
      Entry::Occupied(occupied) => {
        let previous = occupied.get().descriptor.token;
        if previous.id == descriptor.token.id {
          Err(ContainerError::invalid_parameter(format!(
            "'{}' is registered more than once",
            descriptor.token.name
          )))
        } else {
          Err(ContainerError::invalid_state(format!(
            "'{}' and '{}' both provide '{}'",
            previous.name, descriptor.token.name, token.name
          )))
        }
      }
      Entry::Vacant(vacant) => {
        vacant.insert(Binding {
          descriptor: descriptor.clone(),
          cast,
        });
        self.names.insert(token.name, token.id);
        Ok(())
      }
    }
  }

  pub fn binding(&self, id: TypeId) -> Option<&Binding> {
    self.bindings.get(&id)
  }

  pub fn binding_by_name(&self, name: &str) -> Option<&Binding> {
    self.names.get(name).and_then(|id| self.bindings.get(id))
  }

  pub fn is_allowed(&self, id: TypeId) -> bool {
    self.allowed.contains(&id)
  }

  /// Declared service tokens in registration order, for eager
  /// initialization.
  pub fn declared(&self) -> &[ServiceToken] {
    &self.declared
  }
}
