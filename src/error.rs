//! Error taxonomy for container construction and resolution.

use thiserror::Error;

/// Facility-encoded result codes carried by every [`ContainerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResultCode {
  NotFound = 0x833c_0003,
  InvalidState = 0x833c_0005,
  InvalidParameter = 0x833c_0006,
}

impl ResultCode {
  /// The numeric value of this code.
  pub fn value(self) -> u32 {
    self as u32
  }
}

/// Errors raised while constructing a container or resolving a service.
///
/// Every error names the offending service type or capability and maps to a
/// numeric/symbolic [`ResultCode`]. Propagation is synchronous and
/// unrecovered: any failure during the recursive descent aborts the entire
/// in-flight top-level resolution.
#[derive(Debug, Error)]
pub enum ContainerError {
  /// An unregistered type, capability or constructor, or an unmet mandatory
  /// dependency.
  #[error("not found: {0}")]
  NotFound(String),
  /// A binding collision, circular reference, exceeded resolution depth or
  /// cached-identity mismatch.
  #[error("invalid state: {0}")]
  InvalidState(String),
  /// Malformed configuration or public arguments.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),
}

impl ContainerError {
  pub(crate) fn not_found(message: impl Into<String>) -> Self {
    ContainerError::NotFound(message.into())
  }

  pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
    ContainerError::InvalidState(message.into())
  }

  pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
    ContainerError::InvalidParameter(message.into())
  }

  /// The result code of this error.
  pub fn code(&self) -> ResultCode {
    match self {
      ContainerError::NotFound(_) => ResultCode::NotFound,
      ContainerError::InvalidState(_) => ResultCode::InvalidState,
      ContainerError::InvalidParameter(_) => ResultCode::InvalidParameter,
    }
  }
}
