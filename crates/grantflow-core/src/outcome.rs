//! Platform outcome codes and batch result classification.
//!
//! A prompt result arrives as one outcome code per requested permission,
//! in request order. The codes follow the platform's package-manager
//! convention: zero for granted, negative one for denied.

/// Outcome code for a granted permission.
pub const GRANTED: i32 = 0;

/// Outcome code for a denied permission.
pub const DENIED: i32 = -1;

/// Classify a batch prompt result as fully granted or not.
///
/// An empty batch means the prompt was interactively cancelled and is
/// treated as not granted. Otherwise the batch counts as granted only
/// when every single code is [`GRANTED`].
pub fn all_granted(outcomes: &[i32]) -> bool {
    if outcomes.is_empty() {
        return false;
    }
    outcomes.iter().all(|&code| code == GRANTED)
}
