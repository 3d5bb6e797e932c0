//! In-flight permission request record and the rationale resume handle.

use std::sync::Arc;

use crate::callbacks::{DeniedCallback, GrantedCallback, ShowRationaleCallback};
use crate::coordinator::PermissionCoordinator;
use crate::error::Result;

/// One permission request: the permission set, the correlation id and
/// the three optional outcome callbacks.
///
/// Built by [`PermissionRequestBuilder`] and consumed exactly once, when
/// a branch fires. While a prompt is outstanding the record lives in
/// the coordinator's in-flight table under its correlation id.
///
/// [`PermissionRequestBuilder`]: crate::PermissionRequestBuilder
pub struct PermissionRequest {
    permissions: Arc<[String]>,
    correlation_id: Option<u8>,
    granted: Option<GrantedCallback>,
    denied: Option<DeniedCallback>,
    show_rationale: Option<ShowRationaleCallback>,
}

impl PermissionRequest {
    pub(crate) fn new(
        permissions: Arc<[String]>,
        correlation_id: Option<u8>,
        granted: Option<GrantedCallback>,
        denied: Option<DeniedCallback>,
        show_rationale: Option<ShowRationaleCallback>,
    ) -> Self {
        Self {
            permissions,
            correlation_id,
            granted,
            denied,
            show_rationale,
        }
    }

    /// The requested permissions, in request order.
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// The correlation id, once assigned by the coordinator. `None` on
    /// a record that has not been registered and carries no explicit id.
    pub fn correlation_id(&self) -> Option<u8> {
        self.correlation_id
    }

    /// Cheap shared handle to the permission set, for use after the
    /// record has moved into the in-flight table.
    pub(crate) fn permissions_handle(&self) -> Arc<[String]> {
        Arc::clone(&self.permissions)
    }

    pub(crate) fn assign_correlation_id(&mut self, correlation_id: u8) {
        self.correlation_id = Some(correlation_id);
    }

    pub(crate) fn fire_granted(self) {
        if let Some(callback) = self.granted {
            callback();
        }
    }

    pub(crate) fn fire_denied(self, never_ask_again: bool) {
        if let Some(callback) = self.denied {
            callback(never_ask_again);
        }
    }

    /// Detach the rationale slot so the rest of the record can travel
    /// on inside the [`RationaleRequest`] handle.
    pub(crate) fn take_show_rationale(&mut self) -> Option<ShowRationaleCallback> {
        self.show_rationale.take()
    }
}

impl std::fmt::Debug for PermissionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionRequest")
            .field("permissions", &self.permissions)
            .field("correlation_id", &self.correlation_id)
            .field("granted", &self.granted.is_some())
            .field("denied", &self.denied.is_some())
            .field("show_rationale", &self.show_rationale.is_some())
            .finish()
    }
}

/// Handle passed to the show-rationale callback.
///
/// Carries the original request; the host presents its rationale UI
/// and, if the user agrees to continue, calls
/// [`accept_rationale`](Self::accept_rationale) to proceed to the
/// actual platform prompt. Dropping the handle abandons the request
/// without firing any callback.
pub struct RationaleRequest {
    coordinator: Arc<PermissionCoordinator>,
    request: PermissionRequest,
}

impl RationaleRequest {
    pub(crate) fn new(coordinator: Arc<PermissionCoordinator>, request: PermissionRequest) -> Self {
        Self {
            coordinator,
            request,
        }
    }

    /// The permissions the rationale is about.
    pub fn permissions(&self) -> &[String] {
        self.request.permissions()
    }

    /// Resume the flow: register the request and trigger the platform
    /// prompt. The granted/denied callbacks of the original request
    /// fire once the result arrives.
    pub fn accept_rationale(self) -> Result<()> {
        self.coordinator.prompt(self.request)
    }
}

impl std::fmt::Debug for RationaleRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RationaleRequest")
            .field("request", &self.request)
            .finish()
    }
}
