//! Catalog of permissions introduced in later platform revisions.
//!
//! Some runtime permissions only exist from a given platform API level.
//! On an older device the platform cannot report them as granted or
//! denied, so grant checks must skip them entirely. Bindings consult
//! this catalog to decide whether a permission exists at all on the
//! level they run against.

/// Permissions gated on a minimum platform API level, ordered by name.
const INTRODUCED: &[(&str, u32)] = &[
    ("android.permission.BODY_SENSORS", 20),
    ("android.permission.READ_CALL_LOG", 16),
    ("android.permission.READ_EXTERNAL_STORAGE", 16),
    ("android.permission.SYSTEM_ALERT_WINDOW", 23),
    ("android.permission.USE_SIP", 9),
    ("android.permission.WRITE_CALL_LOG", 16),
    ("android.permission.WRITE_SETTINGS", 23),
    ("com.android.voicemail.permission.ADD_VOICEMAIL", 14),
];

/// Minimum platform level at which `permission` exists.
///
/// `None` means the permission is not level-gated and has always been
/// available.
pub fn introduced_in(permission: &str) -> Option<u32> {
    INTRODUCED
        .binary_search_by_key(&permission, |&(name, _)| name)
        .ok()
        .map(|idx| INTRODUCED[idx].1)
}

/// Whether `permission` exists on a platform of the given API level.
pub fn available_on(permission: &str, platform_level: u32) -> bool {
    introduced_in(permission).is_none_or(|min| platform_level >= min)
}
