//! Permission request lifecycle coordination.
//!
//! Owns the table of in-flight requests keyed by correlation id,
//! allocates ids, decides the initial callback branch and reconciles
//! asynchronous platform results back to the originating request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::binding::PlatformBinding;
use crate::builder::PermissionRequestBuilder;
use crate::error::{Error, Result};
use crate::outcome;
use crate::request::{PermissionRequest, RationaleRequest};

/// Exclusive upper bound of the correlation-id range. Ids are allocated
/// from `0..MAX_CORRELATION_ID`, lowest free first.
pub const MAX_CORRELATION_ID: u8 = 255;

/// Coordinates permission requests against one [`PlatformBinding`].
///
/// Entry points: [`with`](Self::with) starts a request builder,
/// [`handle_result`](Self::handle_result) feeds asynchronous prompt
/// results back in. The host must forward every platform result batch
/// it receives; a `false` return means the batch belongs to somebody
/// else (or to a coordinator instance that no longer exists) and can
/// be ignored.
///
/// Nothing is persisted: dropping the coordinator silently abandons
/// its in-flight requests, so a request issued from a UI context that
/// is destroyed before the user answers is lost. Hosts that recreate
/// their context must issue the request again.
pub struct PermissionCoordinator {
    binding: Box<dyn PlatformBinding>,
    inflight: Mutex<HashMap<u8, PermissionRequest>>,
}

impl PermissionCoordinator {
    /// Create a coordinator over the given platform binding.
    pub fn new(binding: impl PlatformBinding + 'static) -> Arc<Self> {
        Arc::new(Self {
            binding: Box::new(binding),
            inflight: Mutex::new(HashMap::new()),
        })
    }

    /// Start building a request for the given permissions.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyPermissions`] when the set is empty.
    pub fn with<I, S>(self: &Arc<Self>, permissions: I) -> Result<PermissionRequestBuilder>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let permissions: Vec<String> = permissions.into_iter().map(Into::into).collect();
        if permissions.is_empty() {
            return Err(Error::EmptyPermissions);
        }
        Ok(PermissionRequestBuilder::new(Arc::clone(self), permissions))
    }

    /// Reconcile an asynchronous platform result with its request.
    ///
    /// Looks up and removes the in-flight request registered under
    /// `correlation_id`, classifies the outcome batch and fires the
    /// granted or denied callback. Returns `false` without any side
    /// effect when no request is registered under the id; that is
    /// ordinary control flow (host context recreated, or a result
    /// addressed to another consumer), not an error.
    ///
    /// The never-ask-again flag handed to the denied callback reflects
    /// the platform's rationale hint *after* this result, so it
    /// captures whether the denial is now permanent under platform
    /// policy.
    pub fn handle_result(&self, correlation_id: u8, outcomes: &[i32]) -> bool {
        let Some(request) = self.inflight().remove(&correlation_id) else {
            debug!(correlation_id, "No in-flight request for result");
            return false;
        };

        if outcome::all_granted(outcomes) {
            info!(correlation_id, "Permission request granted");
            request.fire_granted();
        } else {
            let can_show_rationale = self.binding.should_show_rationale(request.permissions());
            info!(
                correlation_id,
                never_ask_again = !can_show_rationale,
                "Permission request denied"
            );
            request.fire_denied(!can_show_rationale);
        }
        true
    }

    /// Number of requests currently awaiting a platform result.
    pub fn pending_count(&self) -> usize {
        self.inflight().len()
    }

    /// Status query with callback delivery; never prompts, never
    /// touches the in-flight table.
    pub(crate) fn check(&self, request: PermissionRequest) {
        if self.binding.is_granted(request.permissions()) {
            request.fire_granted();
        } else {
            let can_show_rationale = self.binding.should_show_rationale(request.permissions());
            request.fire_denied(!can_show_rationale);
        }
    }

    /// Initial branch decision for a request: already granted,
    /// rationale wanted, or straight to the platform prompt.
    pub(crate) fn request(self: &Arc<Self>, mut request: PermissionRequest) -> Result<()> {
        if self.binding.is_granted(request.permissions()) {
            debug!(permissions = ?request.permissions(), "Already granted, skipping prompt");
            request.fire_granted();
            return Ok(());
        }

        if self.binding.should_show_rationale(request.permissions()) {
            match request.take_show_rationale() {
                Some(callback) => {
                    debug!(permissions = ?request.permissions(), "Deferring to rationale callback");
                    callback(RationaleRequest::new(Arc::clone(self), request));
                }
                None => {
                    debug!(
                        permissions = ?request.permissions(),
                        "Rationale wanted but no callback set, dropping request"
                    );
                }
            }
            return Ok(());
        }

        self.prompt(request)
    }

    /// Register the request and trigger the platform prompt. Also the
    /// re-entry point for an accepted rationale.
    pub(crate) fn prompt(&self, request: PermissionRequest) -> Result<()> {
        let (correlation_id, permissions) = self.register(request)?;
        // Lock released before leaving the library: the prompt call may
        // re-enter the coordinator synchronously.
        self.binding.prompt(correlation_id, &permissions);
        Ok(())
    }

    /// Allocate a correlation id and insert the request, atomically
    /// with respect to concurrent registrations and result delivery.
    fn register(&self, mut request: PermissionRequest) -> Result<(u8, Arc<[String]>)> {
        let mut inflight = self.inflight();

        let correlation_id = match request.correlation_id() {
            Some(id) if inflight.contains_key(&id) => return Err(Error::CorrelationIdInUse(id)),
            Some(id) => id,
            None => Self::lowest_free_id(&inflight)?,
        };

        request.assign_correlation_id(correlation_id);
        let permissions = request.permissions_handle();
        inflight.insert(correlation_id, request);
        let pending = inflight.len();
        drop(inflight);

        debug!(correlation_id, pending, "Registered in-flight request");
        Ok((correlation_id, permissions))
    }

    fn lowest_free_id(inflight: &HashMap<u8, PermissionRequest>) -> Result<u8> {
        (0..MAX_CORRELATION_ID)
            .find(|id| !inflight.contains_key(id))
            .ok_or(Error::CorrelationIdsExhausted)
    }

    fn inflight(&self) -> MutexGuard<'_, HashMap<u8, PermissionRequest>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PermissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionCoordinator")
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::binding::SimulatedBinding;
    use crate::outcome::{DENIED, GRANTED};

    const CAMERA: &str = "android.permission.CAMERA";
    const MIC: &str = "android.permission.RECORD_AUDIO";

    fn coordinator() -> (Arc<SimulatedBinding>, Arc<PermissionCoordinator>) {
        let binding = Arc::new(SimulatedBinding::new(30));
        let coordinator = PermissionCoordinator::new(Arc::clone(&binding));
        (binding, coordinator)
    }

    fn flag() -> (Arc<AtomicBool>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicBool::new(false));
        let handle = Arc::clone(&fired);
        (fired, move || handle.store(true, Ordering::SeqCst))
    }

    #[test]
    fn empty_permission_set_is_rejected() {
        let (_, coordinator) = coordinator();
        let empty: [&str; 0] = [];
        assert!(matches!(
            coordinator.with(empty),
            Err(Error::EmptyPermissions)
        ));
    }

    #[test]
    fn check_fires_granted_without_registering() {
        let (binding, coordinator) = coordinator();
        binding.grant(CAMERA);

        let (fired, on_granted) = flag();
        coordinator
            .with([CAMERA])
            .unwrap()
            .on_granted(on_granted)
            .check();

        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(coordinator.pending_count(), 0);
        assert!(binding.prompts().is_empty());
    }

    #[test]
    fn check_reports_denial_with_never_ask_again() {
        let (_, coordinator) = coordinator();

        // No rationale hint: the platform will not prompt again.
        let result = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&result);
        coordinator
            .with([CAMERA])
            .unwrap()
            .on_denied(move |never_ask_again| {
                *slot.lock().unwrap() = Some(never_ask_again);
            })
            .check();

        assert_eq!(*result.lock().unwrap(), Some(true));
        assert_eq!(coordinator.pending_count(), 0);
    }

    #[test]
    fn check_reports_denial_without_never_ask_again_when_rationale_wanted() {
        let (binding, coordinator) = coordinator();
        binding.set_rationale(CAMERA, true);

        let result = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&result);
        coordinator
            .with([CAMERA])
            .unwrap()
            .on_denied(move |never_ask_again| {
                *slot.lock().unwrap() = Some(never_ask_again);
            })
            .check();

        assert_eq!(*result.lock().unwrap(), Some(false));
    }

    #[test]
    fn request_on_granted_permissions_fires_synchronously() {
        let (binding, coordinator) = coordinator();
        binding.grant(CAMERA);
        binding.grant(MIC);

        let (fired, on_granted) = flag();
        coordinator
            .with([CAMERA, MIC])
            .unwrap()
            .on_granted(on_granted)
            .request()
            .unwrap();

        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(coordinator.pending_count(), 0);
        assert!(binding.prompts().is_empty());
    }

    #[test]
    fn request_registers_and_prompts_when_nothing_blocks_it() {
        let (binding, coordinator) = coordinator();

        coordinator.with([CAMERA]).unwrap().request().unwrap();

        assert_eq!(coordinator.pending_count(), 1);
        assert_eq!(binding.prompts(), vec![(0, vec![CAMERA.to_string()])]);
    }

    #[test]
    fn request_without_rationale_callback_is_dropped_on_the_rationale_branch() {
        let (binding, coordinator) = coordinator();
        binding.set_rationale(CAMERA, true);

        let (fired, on_granted) = flag();
        coordinator
            .with([CAMERA])
            .unwrap()
            .on_granted(on_granted)
            .request()
            .unwrap();

        assert!(!fired.load(Ordering::SeqCst));
        assert_eq!(coordinator.pending_count(), 0);
        assert!(binding.prompts().is_empty());
    }

    #[test]
    fn allocation_hands_out_distinct_ascending_ids() {
        let (binding, coordinator) = coordinator();

        for _ in 0..3 {
            coordinator.with([CAMERA]).unwrap().request().unwrap();
        }

        let ids: Vec<u8> = binding.prompts().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(coordinator.pending_count(), 3);
    }

    #[test]
    fn resolved_ids_are_recycled() {
        let (binding, coordinator) = coordinator();

        coordinator.with([CAMERA]).unwrap().request().unwrap();
        coordinator.with([MIC]).unwrap().request().unwrap();
        assert!(coordinator.handle_result(0, &[GRANTED]));

        // 0 is free again and is the lowest candidate.
        coordinator.with([CAMERA]).unwrap().request().unwrap();
        let ids: Vec<u8> = binding.prompts().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 0]);
        assert_eq!(coordinator.pending_count(), 2);
    }

    #[test]
    fn explicit_id_collision_is_a_usage_error() {
        let (_, coordinator) = coordinator();

        coordinator
            .with([CAMERA])
            .unwrap()
            .with_correlation_id(7)
            .request()
            .unwrap();

        let err = coordinator
            .with([MIC])
            .unwrap()
            .with_correlation_id(7)
            .request()
            .unwrap_err();

        assert!(matches!(err, Error::CorrelationIdInUse(7)));
        assert_eq!(coordinator.pending_count(), 1);
    }

    #[test]
    fn id_space_exhaustion_is_a_usage_error() {
        let (_, coordinator) = coordinator();

        for _ in 0..MAX_CORRELATION_ID {
            coordinator.with([CAMERA]).unwrap().request().unwrap();
        }
        assert_eq!(coordinator.pending_count(), usize::from(MAX_CORRELATION_ID));

        let err = coordinator.with([CAMERA]).unwrap().request().unwrap_err();
        assert!(matches!(err, Error::CorrelationIdsExhausted));
        assert_eq!(coordinator.pending_count(), usize::from(MAX_CORRELATION_ID));
    }

    #[test]
    fn unknown_correlation_id_is_not_handled() {
        let (_, coordinator) = coordinator();
        assert!(!coordinator.handle_result(42, &[GRANTED]));
    }

    #[test]
    fn granted_result_fires_exactly_the_granted_callback() {
        let (_, coordinator) = coordinator();

        let (granted, on_granted) = flag();
        let (denied, _) = flag();
        let denied_handle = Arc::clone(&denied);
        coordinator
            .with([CAMERA])
            .unwrap()
            .on_granted(on_granted)
            .on_denied(move |_| denied_handle.store(true, Ordering::SeqCst))
            .request()
            .unwrap();

        assert!(coordinator.handle_result(0, &[GRANTED]));
        assert!(granted.load(Ordering::SeqCst));
        assert!(!denied.load(Ordering::SeqCst));
        assert_eq!(coordinator.pending_count(), 0);

        // The record is gone; a duplicate delivery is a miss.
        assert!(!coordinator.handle_result(0, &[GRANTED]));
    }

    #[test]
    fn partial_denial_recomputes_never_ask_again_from_current_state() {
        let (binding, coordinator) = coordinator();

        let result = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&result);
        coordinator
            .with([CAMERA, MIC])
            .unwrap()
            .on_denied(move |never_ask_again| {
                *slot.lock().unwrap() = Some(never_ask_again);
            })
            .request()
            .unwrap();

        // Still no rationale hint after the result: permanently denied.
        assert!(coordinator.handle_result(0, &[GRANTED, DENIED]));
        assert_eq!(*result.lock().unwrap(), Some(true));
        assert_eq!(binding.prompts().len(), 1);
    }

    #[test]
    fn empty_result_batch_counts_as_denial() {
        let (_, coordinator) = coordinator();

        let result = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&result);
        coordinator
            .with([CAMERA])
            .unwrap()
            .on_denied(move |never_ask_again| {
                *slot.lock().unwrap() = Some(never_ask_again);
            })
            .request()
            .unwrap();

        // Cancelled prompt: the platform delivers no outcome codes.
        assert!(coordinator.handle_result(0, &[]));
        assert_eq!(*result.lock().unwrap(), Some(true));
    }

    #[test]
    fn rationale_accept_proceeds_to_the_prompt() {
        let (binding, coordinator) = coordinator();
        binding.set_rationale(CAMERA, true);

        let (shown, _) = flag();
        let shown_handle = Arc::clone(&shown);
        coordinator
            .with([CAMERA])
            .unwrap()
            .on_show_rationale(move |request| {
                shown_handle.store(true, Ordering::SeqCst);
                request.accept_rationale().unwrap();
            })
            .request()
            .unwrap();

        assert!(shown.load(Ordering::SeqCst));
        assert_eq!(coordinator.pending_count(), 1);
        assert_eq!(binding.prompts(), vec![(0, vec![CAMERA.to_string()])]);
    }

    #[test]
    fn dropping_the_rationale_handle_abandons_the_request() {
        let (binding, coordinator) = coordinator();
        binding.set_rationale(CAMERA, true);

        coordinator
            .with([CAMERA])
            .unwrap()
            .on_show_rationale(drop)
            .request()
            .unwrap();

        assert_eq!(coordinator.pending_count(), 0);
        assert!(binding.prompts().is_empty());
    }
}
