//! Callback slot types fed by a resolved permission request.
//!
//! Each slot fires at most once, so the slots are boxed `FnOnce`
//! closures. A host that wants one object handling all three branches
//! implements [`PermissionCallbacks`] and registers it through
//! [`PermissionRequestBuilder::on_callback`].
//!
//! [`PermissionRequestBuilder::on_callback`]: crate::PermissionRequestBuilder::on_callback

use crate::request::RationaleRequest;

/// Slot fired when every requested permission is granted.
pub type GrantedCallback = Box<dyn FnOnce() + Send>;

/// Slot fired when the request is denied. The argument is the
/// never-ask-again flag: `true` when the platform will no longer show a
/// rationale for any permission in the set, meaning further prompts are
/// suppressed by policy.
pub type DeniedCallback = Box<dyn FnOnce(bool) + Send>;

/// Slot fired when a rationale should be shown before prompting. The
/// handle resumes the flow via [`RationaleRequest::accept_rationale`].
pub type ShowRationaleCallback = Box<dyn FnOnce(RationaleRequest) + Send>;

/// Combined handler covering all three outcome branches of a request.
///
/// Exactly one of the three methods is invoked per prompt round; the
/// rationale branch may later lead to a second round (granted or
/// denied) on the same object once the rationale is accepted.
pub trait PermissionCallbacks: Send {
    /// Every requested permission is granted.
    fn on_granted(&mut self);

    /// The request was denied.
    fn on_denied(&mut self, never_ask_again: bool);

    /// A rationale should be presented before prompting.
    fn on_show_rationale(&mut self, request: RationaleRequest);
}
