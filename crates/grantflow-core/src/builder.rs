//! Fluent builder for permission requests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::callbacks::{
    DeniedCallback, GrantedCallback, PermissionCallbacks, ShowRationaleCallback,
};
use crate::coordinator::PermissionCoordinator;
use crate::error::Result;
use crate::request::{PermissionRequest, RationaleRequest};

/// Accumulates a permission set, an optional explicit correlation id
/// and the outcome callbacks, then hands the finished request to the
/// coordinator through one of the terminal calls.
///
/// Obtained from [`PermissionCoordinator::with`]. The terminal calls
/// consume the builder; issue a fresh one per request.
///
/// ```no_run
/// # use grantflow_core::{PermissionCoordinator, SimulatedBinding};
/// let coordinator = PermissionCoordinator::new(SimulatedBinding::new(30));
/// coordinator
///     .with(["android.permission.CAMERA"])?
///     .on_granted(|| println!("camera ready"))
///     .on_denied(|never_ask_again| println!("denied (for good: {never_ask_again})"))
///     .on_show_rationale(|request| {
///         // present the rationale, then:
///         let _ = request.accept_rationale();
///     })
///     .request()?;
/// # Ok::<(), grantflow_core::Error>(())
/// ```
pub struct PermissionRequestBuilder {
    coordinator: Arc<PermissionCoordinator>,
    permissions: Vec<String>,
    correlation_id: Option<u8>,
    granted: Option<GrantedCallback>,
    denied: Option<DeniedCallback>,
    show_rationale: Option<ShowRationaleCallback>,
}

impl PermissionRequestBuilder {
    pub(crate) fn new(coordinator: Arc<PermissionCoordinator>, permissions: Vec<String>) -> Self {
        Self {
            coordinator,
            permissions,
            correlation_id: None,
            granted: None,
            denied: None,
            show_rationale: None,
        }
    }

    /// Use a specific correlation id instead of letting the coordinator
    /// allocate one. Registration fails with
    /// [`Error::CorrelationIdInUse`](crate::Error::CorrelationIdInUse)
    /// if the id is already tracking an in-flight request.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: u8) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Set the granted callback.
    #[must_use]
    pub fn on_granted(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.granted = Some(Box::new(callback));
        self
    }

    /// Set the denied callback. The argument is the never-ask-again
    /// flag.
    #[must_use]
    pub fn on_denied(mut self, callback: impl FnOnce(bool) + Send + 'static) -> Self {
        self.denied = Some(Box::new(callback));
        self
    }

    /// Set the show-rationale callback.
    #[must_use]
    pub fn on_show_rationale(
        mut self,
        callback: impl FnOnce(RationaleRequest) + Send + 'static,
    ) -> Self {
        self.show_rationale = Some(Box::new(callback));
        self
    }

    /// Fill all three slots from one combined handler.
    #[must_use]
    pub fn on_callback<C: PermissionCallbacks + 'static>(mut self, callback: C) -> Self {
        let shared = Arc::new(Mutex::new(callback));

        let granted = Arc::clone(&shared);
        self.granted = Some(Box::new(move || {
            granted
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .on_granted();
        }));

        let denied = Arc::clone(&shared);
        self.denied = Some(Box::new(move |never_ask_again| {
            denied
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .on_denied(never_ask_again);
        }));

        self.show_rationale = Some(Box::new(move |request| {
            shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .on_show_rationale(request);
        }));

        self
    }

    /// Query current grant state and report it through the callbacks
    /// without ever prompting: fires the granted callback when every
    /// permission is held, the denied callback otherwise. Never touches
    /// the in-flight table.
    pub fn check(self) {
        let (coordinator, request) = self.into_parts();
        coordinator.check(request);
    }

    /// Run the full request flow: report immediately when already
    /// granted, defer to the rationale callback when the platform wants
    /// one shown, otherwise register the request and trigger the
    /// platform prompt.
    pub fn request(self) -> Result<()> {
        let (coordinator, request) = self.into_parts();
        coordinator.request(request)
    }

    fn into_parts(self) -> (Arc<PermissionCoordinator>, PermissionRequest) {
        let Self {
            coordinator,
            permissions,
            correlation_id,
            granted,
            denied,
            show_rationale,
        } = self;
        let request = PermissionRequest::new(
            Arc::from(permissions),
            correlation_id,
            granted,
            denied,
            show_rationale,
        );
        (coordinator, request)
    }
}

impl std::fmt::Debug for PermissionRequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionRequestBuilder")
            .field("permissions", &self.permissions)
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}
