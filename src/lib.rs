//! # Lattice IoC
//!
//! A constructor-injection service container for Rust.
//!
//! A [`Container`] is built once from a declared set of service types and
//! optional pre-built instances. Services are constructed on demand by
//! recursively resolving their declared constructor dependencies, cached as
//! process-wide singletons, and guarded by cycle detection, a recursion
//! depth bound and an allow list of constructible types. Dependencies may
//! be marked optional so cycles and missing bindings degrade to `None`
//! instead of failing.
//!
//! ## Core Concepts
//!
//! - **Service**: a concrete type declared eligible for construction, with
//!   a designated constructor (an ordered dependency list plus a factory).
//! - **Capability**: a trait a service implements; each capability is bound
//!   to exactly one implementation per container.
//! - **Resolution**: `get::<T>()` resolves by type (concrete or
//!   `dyn Capability`), `get_by_name` by registered name. Either returns
//!   the singleton instance or a [`ContainerError`] carrying a result code.
//!
//! ## Quick Start
//!
//! ```
//! use lattice_ioc::{deps, Container, Initialization, ServiceRegistration, Settings};
//! use std::sync::Arc;
//!
//! // A capability and its single implementation.
//! trait Greeter: Send + Sync {
//!   fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter;
//!
//! impl Greeter for EnglishGreeter {
//!   fn greet(&self) -> String {
//!     "Hello!".to_string()
//!   }
//! }
//!
//! // A service depending on the capability.
//! struct App {
//!   greeter: Arc<dyn Greeter>,
//! }
//!
//! let settings = Settings {
//!   initialization: Initialization::Lazy,
//!   services: vec![
//!     ServiceRegistration::of::<EnglishGreeter>()
//!       .implements::<dyn Greeter>(|it| it)
//!       .constructor(deps![], |_| Ok(EnglishGreeter))
//!       .build(),
//!     ServiceRegistration::of::<App>()
//!       .constructor(deps![required dyn Greeter], |args| {
//!         Ok(App {
//!           greeter: args.required()?,
//!         })
//!       })
//!       .build(),
//!   ],
//!   instances: vec![],
//! };
//!
//! let container = Container::new(settings).unwrap();
//! let app = container.get::<App>().unwrap();
//! assert_eq!(app.greeter.greet(), "Hello!");
//! ```

mod container;
mod core;
mod error;
mod macros;
mod registration;
mod registry;
mod resolver;

pub use crate::container::Container;
pub use crate::core::AnyService;
pub use crate::error::{ContainerError, ResultCode};
pub use crate::registration::{
  Dependency, Initialization, InstanceBuilder, InstanceRegistration, ResolvedArgs, ServiceBuilder,
  ServiceRegistration, Settings,
};
