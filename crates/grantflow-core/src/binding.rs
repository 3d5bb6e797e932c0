//! Platform binding seam and the two bundled implementations.
//!
//! The coordinator never talks to the platform directly; everything it
//! needs is behind [`PlatformBinding`]: trigger a prompt, query grant
//! state, query the show-rationale hint. Hosts embedding the library
//! against a real platform wire a [`ClosureBinding`];
//! [`SimulatedBinding`] backs tests and dry-runs with in-memory state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::catalog;

/// Capability surface the coordinator requires from the platform.
pub trait PlatformBinding: Send + Sync {
    /// Display the permission prompt for `permissions`. The platform
    /// answers later through the host's result-delivery hook, tagged
    /// with `correlation_id`.
    fn prompt(&self, correlation_id: u8, permissions: &[String]);

    /// Whether every permission in the set is currently granted.
    fn is_granted(&self, permissions: &[String]) -> bool;

    /// Whether a rationale should be shown for at least one permission
    /// in the set.
    fn should_show_rationale(&self, permissions: &[String]) -> bool;
}

impl<B: PlatformBinding + ?Sized> PlatformBinding for Arc<B> {
    fn prompt(&self, correlation_id: u8, permissions: &[String]) {
        (**self).prompt(correlation_id, permissions);
    }

    fn is_granted(&self, permissions: &[String]) -> bool {
        (**self).is_granted(permissions)
    }

    fn should_show_rationale(&self, permissions: &[String]) -> bool {
        (**self).should_show_rationale(permissions)
    }
}

type PromptFn = dyn Fn(u8, &[String]) + Send + Sync;
type QueryFn = dyn Fn(&[String]) -> bool + Send + Sync;

/// Binding that delegates each operation to a host-supplied closure.
///
/// This is the adapter for embedding the coordinator on top of a real
/// platform surface: the host captures whatever context its platform
/// calls need inside the closures.
pub struct ClosureBinding {
    prompt: Box<PromptFn>,
    is_granted: Box<QueryFn>,
    should_show_rationale: Box<QueryFn>,
}

impl ClosureBinding {
    /// Build a binding from the three platform operations.
    pub fn new(
        prompt: impl Fn(u8, &[String]) + Send + Sync + 'static,
        is_granted: impl Fn(&[String]) -> bool + Send + Sync + 'static,
        should_show_rationale: impl Fn(&[String]) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            prompt: Box::new(prompt),
            is_granted: Box::new(is_granted),
            should_show_rationale: Box::new(should_show_rationale),
        }
    }
}

impl PlatformBinding for ClosureBinding {
    fn prompt(&self, correlation_id: u8, permissions: &[String]) {
        (self.prompt)(correlation_id, permissions);
    }

    fn is_granted(&self, permissions: &[String]) -> bool {
        (self.is_granted)(permissions)
    }

    fn should_show_rationale(&self, permissions: &[String]) -> bool {
        (self.should_show_rationale)(permissions)
    }
}

#[derive(Default)]
struct SimulatedState {
    granted: HashSet<String>,
    rationale: HashSet<String>,
    prompts: Vec<(u8, Vec<String>)>,
}

/// In-memory platform simulation.
///
/// Grant and rationale state are plain sets mutated through
/// [`grant`](Self::grant) / [`revoke`](Self::revoke) /
/// [`set_rationale`](Self::set_rationale). Prompt invocations are
/// recorded rather than displayed; the host (or test) replays them
/// into [`PermissionCoordinator::handle_result`] with whatever outcome
/// codes it wants to simulate.
///
/// Permissions the configured platform level does not know about count
/// as granted, since such a platform can never hold them back.
///
/// [`PermissionCoordinator::handle_result`]: crate::PermissionCoordinator::handle_result
pub struct SimulatedBinding {
    platform_level: u32,
    state: Mutex<SimulatedState>,
}

impl SimulatedBinding {
    /// Create a simulation of a platform at the given API level.
    pub fn new(platform_level: u32) -> Self {
        Self {
            platform_level,
            state: Mutex::new(SimulatedState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a permission as granted.
    pub fn grant(&self, permission: &str) {
        self.state().granted.insert(permission.to_string());
    }

    /// Remove a grant.
    pub fn revoke(&self, permission: &str) {
        self.state().granted.remove(permission);
    }

    /// Set whether a rationale is wanted for a permission.
    pub fn set_rationale(&self, permission: &str, wanted: bool) {
        let mut state = self.state();
        if wanted {
            state.rationale.insert(permission.to_string());
        } else {
            state.rationale.remove(permission);
        }
    }

    /// Prompts recorded so far, as (correlation id, permissions) pairs.
    pub fn prompts(&self) -> Vec<(u8, Vec<String>)> {
        self.state().prompts.clone()
    }
}

impl PlatformBinding for SimulatedBinding {
    fn prompt(&self, correlation_id: u8, permissions: &[String]) {
        debug!(correlation_id, ?permissions, "Simulated platform prompt");
        self.state().prompts.push((correlation_id, permissions.to_vec()));
    }

    fn is_granted(&self, permissions: &[String]) -> bool {
        let state = self.state();
        permissions.iter().all(|permission| {
            !catalog::available_on(permission, self.platform_level)
                || state.granted.contains(permission)
        })
    }

    fn should_show_rationale(&self, permissions: &[String]) -> bool {
        let state = self.state();
        permissions
            .iter()
            .any(|permission| state.rationale.contains(permission))
    }
}
