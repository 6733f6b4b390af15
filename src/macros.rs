//! Public macros for declaring constructor dependency lists.

/// Declares the ordered dependency list of a designated constructor.
///
/// Each entry is `required` or `optional` followed by the target type,
/// which may be a concrete service type or a capability trait object.
/// The resolver feeds the factory one argument per entry, in this order.
///
/// # Examples
///
/// ```
/// use lattice_ioc::deps;
///
/// trait EventSink: Send + Sync {}
/// struct Config;
///
/// let list = deps![required dyn EventSink, optional Config];
/// assert_eq!(list.len(), 2);
/// ```
#[macro_export]
macro_rules! deps {
  () => {
    ::std::vec::Vec::<$crate::Dependency>::new()
  };
  ($($kind:ident $target:ty),+ $(,)?) => {
    ::std::vec![$($crate::deps!(@entry $kind $target)),+]
  };
  (@entry required $target:ty) => {
    $crate::Dependency::required::<$target>()
  };
  (@entry optional $target:ty) => {
    $crate::Dependency::optional::<$target>()
  };
}
