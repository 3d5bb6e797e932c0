//! Error types for the grantflow core library.

use thiserror::Error;

use crate::coordinator::MAX_CORRELATION_ID;

/// Result type alias using the grantflow [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Usage errors raised by request construction and registration.
///
/// All variants signal a programmer mistake on the host side; there is
/// nothing to recover at runtime. An unrecognized correlation id in
/// [`PermissionCoordinator::handle_result`] is deliberately NOT an
/// error, it is reported through the `bool` return instead.
///
/// [`PermissionCoordinator::handle_result`]: crate::PermissionCoordinator::handle_result
#[derive(Debug, Error)]
pub enum Error {
    /// A request was built without naming any permission.
    #[error("a permission request must name at least one permission")]
    EmptyPermissions,

    /// An explicitly supplied correlation id is already tracking an
    /// in-flight request.
    #[error("correlation id {0} is already in use by an in-flight request")]
    CorrelationIdInUse(u8),

    /// Every id below [`MAX_CORRELATION_ID`] is taken.
    #[error(
        "no free correlation id below {}; resolve or drop in-flight requests \
         before issuing new ones",
        MAX_CORRELATION_ID
    )]
    CorrelationIdsExhausted,
}
