use lattice_ioc::{
  deps, Container, ContainerError, Initialization, InstanceRegistration, ResultCode,
  ServiceRegistration, Settings,
};
use std::sync::Arc;

// --- Test Fixtures ---

// Capabilities must be Send + Sync for the container to accept them.
trait Clock: Send + Sync {
  fn now(&self) -> u64;
}

trait Journal: Send + Sync {
  fn last(&self) -> &'static str;
}

struct FixedClock {
  at: u64,
}

impl Clock for FixedClock {
  fn now(&self) -> u64 {
    self.at
  }
}

struct OtherClock;

impl Clock for OtherClock {
  fn now(&self) -> u64 {
    0
  }
}

struct MemoryJournal;

impl Journal for MemoryJournal {
  fn last(&self) -> &'static str {
    "empty"
  }
}

#[derive(Debug)]
struct SimpleService {
  id: u32,
}

fn lazy(services: Vec<ServiceRegistration>) -> Settings {
  Settings {
    initialization: Initialization::Lazy,
    services,
    instances: vec![],
  }
}

// --- Basic Tests ---

#[test]
fn test_disjoint_capabilities_construct() {
  // Arrange: two services, each the sole provider of its capability.
  let settings = lazy(vec![
    ServiceRegistration::of::<FixedClock>()
      .implements::<dyn Clock>(|it| it)
      .constructor(deps![], |_| Ok(FixedClock { at: 7 }))
      .build(),
    ServiceRegistration::of::<MemoryJournal>()
      .implements::<dyn Journal>(|it| it)
      .constructor(deps![], |_| Ok(MemoryJournal))
      .build(),
  ]);

  // Act
  let container = Container::new(settings).unwrap();

  // Assert
  assert_eq!(container.get::<dyn Clock>().unwrap().now(), 7);
  assert_eq!(container.get::<dyn Journal>().unwrap().last(), "empty");
}

#[test]
fn test_capability_collision_fails_construction() {
  // Arrange: FixedClock and OtherClock both claim the Clock capability.
  let settings = lazy(vec![
    ServiceRegistration::of::<FixedClock>()
      .implements::<dyn Clock>(|it| it)
      .constructor(deps![], |_| Ok(FixedClock { at: 1 }))
      .build(),
    ServiceRegistration::of::<OtherClock>()
      .implements::<dyn Clock>(|it| it)
      .constructor(deps![], |_| Ok(OtherClock))
      .build(),
  ]);

  // Act
  let error = Container::new(settings).unwrap_err();

  // Assert: InvalidState naming both implementations and the capability.
  assert_eq!(error.code(), ResultCode::InvalidState);
  let message = error.to_string();
  assert!(message.contains("FixedClock"), "message was: {message}");
  assert!(message.contains("OtherClock"), "message was: {message}");
  assert!(message.contains("Clock"), "message was: {message}");
}

#[test]
fn test_singleton_identity() {
  let container = Container::new(lazy(vec![ServiceRegistration::of::<SimpleService>()
    .constructor(deps![], |_| Ok(SimpleService { id: 101 }))
    .build()]))
  .unwrap();

  let first = container.get::<SimpleService>().unwrap();
  let second = container.get::<SimpleService>().unwrap();

  assert_eq!(first.id, 101);
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_capability_and_concrete_lookup_share_the_singleton() {
  let container = Container::new(lazy(vec![ServiceRegistration::of::<FixedClock>()
    .implements::<dyn Clock>(|it| it)
    .constructor(deps![], |_| Ok(FixedClock { at: 42 }))
    .build()]))
  .unwrap();

  let by_capability = container.get::<dyn Clock>().unwrap();
  let by_type = container.get::<FixedClock>().unwrap();

  assert_eq!(by_capability.now(), 42);
  assert_eq!(by_type.at, 42);
  // Both views point at the same cached instance.
  assert!(Arc::ptr_eq(&by_type, &container.get::<FixedClock>().unwrap()));
}

#[test]
fn test_get_by_name_returns_the_concrete_instance() {
  let container = Container::new(lazy(vec![ServiceRegistration::of::<FixedClock>()
    .implements::<dyn Clock>(|it| it)
    .named("clock")
    .constructor(deps![], |_| Ok(FixedClock { at: 9 }))
    .build()]))
  .unwrap();

  let by_name = container.get_by_name("clock").unwrap();
  let concrete = by_name.downcast::<FixedClock>().unwrap();
  let typed = container.get::<FixedClock>().unwrap();

  assert_eq!(concrete.at, 9);
  assert!(Arc::ptr_eq(&concrete, &typed));

  // The capability's type name resolves to the same implementation.
  let via_capability_name = container
    .get_by_name(std::any::type_name::<dyn Clock>())
    .unwrap();
  assert!(Arc::ptr_eq(
    &via_capability_name.downcast::<FixedClock>().unwrap(),
    &typed
  ));
}

#[test]
fn test_pre_built_instance_is_never_reconstructed() {
  // Arrange: a pre-built instance with no registered constructor at all.
  let settings = Settings {
    initialization: Initialization::Lazy,
    services: vec![],
    instances: vec![InstanceRegistration::new(FixedClock { at: 1234 })
      .implements::<dyn Clock>(|it| it)
      .build()],
  };
  let container = Container::new(settings).unwrap();

  // Act
  let typed = container.get::<FixedClock>().unwrap();
  let by_capability = container.get::<dyn Clock>().unwrap();
  let by_name = container
    .get_by_name(std::any::type_name::<FixedClock>())
    .unwrap()
    .downcast::<FixedClock>()
    .unwrap();

  // Assert: every surface hands back the seeded object.
  assert_eq!(typed.at, 1234);
  assert_eq!(by_capability.now(), 1234);
  assert!(Arc::ptr_eq(&typed, &by_name));
}

#[test]
fn test_undeclared_type_is_not_found() {
  let container = Container::new(lazy(vec![])).unwrap();

  let error = container.get::<SimpleService>().unwrap_err();

  assert_eq!(error.code(), ResultCode::NotFound);
  assert!(error.to_string().contains("SimpleService"));
}

#[test]
fn test_unknown_name_is_not_found() {
  let container = Container::new(lazy(vec![])).unwrap();

  let error = container.get_by_name("no_such_service").unwrap_err();

  assert_eq!(error.code(), ResultCode::NotFound);
  assert!(error.to_string().contains("no_such_service"));
}

#[test]
fn test_empty_name_is_an_invalid_parameter() {
  let container = Container::new(lazy(vec![])).unwrap();

  let error = container.get_by_name("").unwrap_err();

  assert!(matches!(error, ContainerError::InvalidParameter(_)));
}

#[test]
fn test_empty_registered_name_is_an_invalid_parameter() {
  let settings = lazy(vec![ServiceRegistration::of::<SimpleService>()
    .named("")
    .constructor(deps![], |_| Ok(SimpleService { id: 1 }))
    .build()]);

  let error = Container::new(settings).unwrap_err();

  assert!(matches!(error, ContainerError::InvalidParameter(_)));
}

#[test]
fn test_missing_designated_constructor_is_not_found_at_resolution() {
  // Registered, but no constructor was designated.
  let container = Container::new(lazy(vec![ServiceRegistration::of::<SimpleService>().build()]))
    .unwrap();

  let error = container.get::<SimpleService>().unwrap_err();

  assert_eq!(error.code(), ResultCode::NotFound);
  assert!(error.to_string().contains("designated constructor"));
}

#[test]
fn test_second_designated_constructor_fails_construction() {
  let settings = lazy(vec![ServiceRegistration::of::<SimpleService>()
    .constructor(deps![], |_| Ok(SimpleService { id: 1 }))
    .constructor(deps![], |_| Ok(SimpleService { id: 2 }))
    .build()]);

  let error = Container::new(settings).unwrap_err();

  assert_eq!(error.code(), ResultCode::InvalidState);
  assert!(error.to_string().contains("more than one"));
}

#[test]
fn test_duplicate_registration_fails_construction() {
  let settings = lazy(vec![
    ServiceRegistration::of::<SimpleService>()
      .constructor(deps![], |_| Ok(SimpleService { id: 1 }))
      .build(),
    ServiceRegistration::of::<SimpleService>()
      .constructor(deps![], |_| Ok(SimpleService { id: 2 }))
      .build(),
  ]);

  let error = Container::new(settings).unwrap_err();

  assert!(matches!(error, ContainerError::InvalidParameter(_)));
  assert!(error.to_string().contains("more than once"));
}

#[test]
fn test_two_types_sharing_a_lookup_name_fail_construction() {
  struct FirstService;
  struct SecondService;

  // Distinct types, so the TypeId bindings are disjoint; only the string
  // lookup name collides.
  let settings = lazy(vec![
    ServiceRegistration::of::<FirstService>()
      .named("shared")
      .constructor(deps![], |_| Ok(FirstService))
      .build(),
    ServiceRegistration::of::<SecondService>()
      .named("shared")
      .constructor(deps![], |_| Ok(SecondService))
      .build(),
  ]);

  let error = Container::new(settings).unwrap_err();

  assert_eq!(error.code(), ResultCode::InvalidState);
  assert!(error.to_string().contains("shared"));
}

#[test]
fn test_factory_taking_an_optional_slot_as_required_fails() {
  #[derive(Debug)]
  struct Holder;

  let settings = lazy(vec![
    ServiceRegistration::of::<FixedClock>()
      .implements::<dyn Clock>(|it| it)
      .constructor(deps![], |_| Ok(FixedClock { at: 3 }))
      .build(),
    ServiceRegistration::of::<Holder>()
      .constructor(deps![optional dyn Clock], |args| {
        args.required::<dyn Clock>().map(|_| Holder)
      })
      .build(),
  ]);
  let container = Container::new(settings).unwrap();

  let error = container.get::<Holder>().unwrap_err();

  assert_eq!(error.code(), ResultCode::InvalidState);
  assert!(error.to_string().contains("declared optional"));
}

#[test]
fn test_factory_taking_a_required_slot_as_optional_fails() {
  #[derive(Debug)]
  struct Holder;

  let settings = lazy(vec![
    ServiceRegistration::of::<FixedClock>()
      .implements::<dyn Clock>(|it| it)
      .constructor(deps![], |_| Ok(FixedClock { at: 3 }))
      .build(),
    ServiceRegistration::of::<Holder>()
      .constructor(deps![required dyn Clock], |args| {
        args.optional::<dyn Clock>().map(|_| Holder)
      })
      .build(),
  ]);
  let container = Container::new(settings).unwrap();

  let error = container.get::<Holder>().unwrap_err();

  assert_eq!(error.code(), ResultCode::InvalidState);
  assert!(error.to_string().contains("declared required"));
}

#[test]
fn test_result_codes_follow_the_facility_encoding() {
  assert_eq!(ResultCode::NotFound.value(), 0x833c_0003);
  assert_eq!(ResultCode::InvalidState.value(), 0x833c_0005);
  assert_eq!(ResultCode::InvalidParameter.value(), 0x833c_0006);
}
