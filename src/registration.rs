//! Construction-time configuration: declared service types, pre-built
//! instances, and the declarative constructor tables the resolver walks.

use crate::core::{AnyService, CastFn, ServiceToken, ShapedService};
use crate::error::ContainerError;
use std::any::Any;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

/// Whether declared services are built during container construction or on
/// first demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialization {
  /// Build each declared service on its first request.
  Lazy,
  /// Resolve every declared service once during container construction.
  /// Any failure aborts construction with the originating error.
  EagerAll,
}

/// Construction-time configuration for a [`Container`](crate::Container).
pub struct Settings {
  pub initialization: Initialization,
  /// Declared service types, eligible for construction.
  pub services: Vec<ServiceRegistration>,
  /// Already-built instances seeding the cache. Never reconstructed, never
  /// subject to cycle checks.
  pub instances: Vec<InstanceRegistration>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      initialization: Initialization::Lazy,
      services: Vec::new(),
      instances: Vec::new(),
    }
  }
}

/// One constructor parameter: a target token and its optional flag.
///
/// Optionality is evaluated per edge, at the point the dependency is
/// requested. The same type may be optional as one dependent's parameter
/// and mandatory when requested elsewhere.
#[derive(Clone, Copy, Debug)]
pub struct Dependency {
  pub(crate) target: ServiceToken,
  pub(crate) optional: bool,
}

impl Dependency {
  /// A mandatory dependency on the concrete type or capability `T`.
  pub fn required<T: ?Sized + Any>() -> Self {
    Self {
      target: ServiceToken::of::<T>(),
      optional: false,
    }
  }

  /// An optional dependency on `T`. An unresolvable state at this edge (no
  /// binding, no constructor, cycle, depth) degrades to `None` instead of
  /// failing the resolution.
  pub fn optional<T: ?Sized + Any>() -> Self {
    Self {
      target: ServiceToken::of::<T>(),
      optional: true,
    }
  }
}

// One capability claimed by a registration: the capability token plus the
// shim reshaping Arc<Concrete> into Arc<dyn Capability>.
pub(crate) struct Capability {
  pub token: ServiceToken,
  pub cast: CastFn,
}

pub(crate) type BuildFn =
  Box<dyn Fn(&mut ResolvedArgs) -> Result<AnyService, ContainerError> + Send + Sync>;

/// The designated constructor of a service: its ordered parameter list and
/// the factory invoked with the resolved argument list.
pub(crate) struct Constructor {
  pub dependencies: Vec<Dependency>,
  pub build: BuildFn,
}

/// Positional access to resolved constructor arguments, in declared order.
///
/// A factory consumes exactly one slot per declared dependency, with
/// [`required`](ResolvedArgs::required) or
/// [`optional`](ResolvedArgs::optional) matching the declaration; a
/// mismatch between the accessor and the declared flag is an
/// `InvalidState`.
pub struct ResolvedArgs {
  values: VecDeque<(bool, Option<ShapedService>)>,
}

impl ResolvedArgs {
  pub(crate) fn new(values: Vec<(bool, Option<ShapedService>)>) -> Self {
    Self {
      values: values.into(),
    }
  }

  fn next(&mut self) -> Result<(bool, Option<ShapedService>), ContainerError> {
    self.values.pop_front().ok_or_else(|| {
      ContainerError::invalid_state("factory consumed more arguments than the constructor declared")
    })
  }

  /// Takes the next argument as a mandatory `Arc<T>`.
  pub fn required<T: ?Sized + Any + Send + Sync>(&mut self) -> Result<Arc<T>, ContainerError> {
    let (optional, value) = self.next()?;
    if optional {
      return Err(ContainerError::invalid_state(format!(
        "argument '{}' was declared optional but taken as required",
        std::any::type_name::<T>()
      )));
    }
    let value = value.ok_or_else(|| {
      ContainerError::invalid_state(format!(
        "argument '{}' resolved to no instance",
        std::any::type_name::<T>()
      ))
    })?;
    downcast_shaped::<T>(value)
  }

  /// Takes the next argument as an optional `Arc<T>`; `None` when the edge
  /// degraded.
  pub fn optional<T: ?Sized + Any + Send + Sync>(
    &mut self,
  ) -> Result<Option<Arc<T>>, ContainerError> {
    let (optional, value) = self.next()?;
    if !optional {
      return Err(ContainerError::invalid_state(format!(
        "argument '{}' was declared required but taken as optional",
        std::any::type_name::<T>()
      )));
    }
    match value {
      None => Ok(None),
      Some(value) => downcast_shaped::<T>(value).map(Some),
    }
  }
}

fn downcast_shaped<T: ?Sized + Any + Send + Sync>(
  value: ShapedService,
) -> Result<Arc<T>, ContainerError> {
  value.downcast::<Arc<T>>().map(|boxed| *boxed).map_err(|_| {
    ContainerError::invalid_state(format!(
      "resolved argument does not match the declared target '{}'",
      std::any::type_name::<T>()
    ))
  })
}

/// A declared service type: its concrete identity, the capabilities it
/// implements, and its designated constructor.
///
/// Built with [`ServiceRegistration::of`]; the registration table replaces
/// the runtime constructor introspection of reflective containers.
pub struct ServiceRegistration {
  pub(crate) token: ServiceToken,
  pub(crate) capabilities: Vec<Capability>,
  pub(crate) constructor: Option<Constructor>,
  pub(crate) extra_constructors: usize,
  pub(crate) self_cast: CastFn,
}

impl ServiceRegistration {
  /// Starts a registration for the concrete service type `T`.
  pub fn of<T: Any + Send + Sync>() -> ServiceBuilder<T> {
    ServiceBuilder {
      inner: ServiceRegistration {
        token: ServiceToken::of::<T>(),
        capabilities: Vec::new(),
        constructor: None,
        extra_constructors: 0,
        self_cast: self_cast_of::<T>(),
      },
      _marker: PhantomData,
    }
  }
}

/// Builder for a [`ServiceRegistration`].
pub struct ServiceBuilder<T> {
  inner: ServiceRegistration,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ServiceBuilder<T> {
  /// Declares that `T` implements the capability `I`. Pass the upcast
  /// coercion, usually `|it| it`. Repeated declarations of the same
  /// capability are deduplicated.
  pub fn implements<I: ?Sized + Any + Send + Sync>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self {
    push_capability(&mut self.inner.capabilities, capability_of::<T, I>(cast));
    self
  }

  /// Designates the constructor: the ordered dependency list and the
  /// factory receiving the resolved arguments. Designating a second
  /// constructor fails container construction.
  pub fn constructor(
    mut self,
    dependencies: Vec<Dependency>,
    build: impl Fn(&mut ResolvedArgs) -> Result<T, ContainerError> + Send + Sync + 'static,
  ) -> Self {
    if self.inner.constructor.is_some() {
      self.inner.extra_constructors += 1;
      return self;
    }
    self.inner.constructor = Some(Constructor {
      dependencies,
      build: Box::new(move |args| build(args).map(|value| Arc::new(value) as AnyService)),
    });
    self
  }

  /// Overrides the name used for string lookup. Defaults to the type name.
  pub fn named(mut self, name: &'static str) -> Self {
    self.inner.token = self.inner.token.renamed(name);
    self
  }

  pub fn build(self) -> ServiceRegistration {
    self.inner
  }
}

/// An already-built instance registered at construction time. It seeds the
/// cache directly and is returned as-is, never reconstructed.
pub struct InstanceRegistration {
  pub(crate) token: ServiceToken,
  pub(crate) capabilities: Vec<Capability>,
  pub(crate) self_cast: CastFn,
  pub(crate) instance: AnyService,
}

impl InstanceRegistration {
  /// Starts a registration for an already-built instance.
  pub fn new<T: Any + Send + Sync>(value: T) -> InstanceBuilder<T> {
    InstanceBuilder {
      inner: InstanceRegistration {
        token: ServiceToken::of::<T>(),
        capabilities: Vec::new(),
        self_cast: self_cast_of::<T>(),
        instance: Arc::new(value),
      },
      _marker: PhantomData,
    }
  }
}

/// Builder for an [`InstanceRegistration`].
pub struct InstanceBuilder<T> {
  inner: InstanceRegistration,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> InstanceBuilder<T> {
  /// Declares that the instance's type implements the capability `I`.
  pub fn implements<I: ?Sized + Any + Send + Sync>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self {
    push_capability(&mut self.inner.capabilities, capability_of::<T, I>(cast));
    self
  }

  /// Overrides the name used for string lookup. Defaults to the type name.
  pub fn named(mut self, name: &'static str) -> Self {
    self.inner.token = self.inner.token.renamed(name);
    self
  }

  pub fn build(self) -> InstanceRegistration {
    self.inner
  }
}

fn push_capability(capabilities: &mut Vec<Capability>, capability: Capability) {
  if !capabilities.iter().any(|existing| existing.token == capability.token) {
    capabilities.push(capability);
  }
}

fn self_cast_of<T: Any + Send + Sync>() -> CastFn {
  Box::new(|instance: &AnyService| {
    let concrete = instance.clone().downcast::<T>().ok()?;
    Some(Box::new(concrete) as ShapedService)
  })
}

fn capability_of<T, I>(cast: fn(Arc<T>) -> Arc<I>) -> Capability
where
  T: Any + Send + Sync,
  I: ?Sized + Any + Send + Sync,
{
  Capability {
    token: ServiceToken::of::<I>(),
    cast: Box::new(move |instance: &AnyService| {
      let concrete = instance.clone().downcast::<T>().ok()?;
      Some(Box::new(cast(concrete)) as ShapedService)
    }),
  }
}
