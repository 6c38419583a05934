//! Who may sign in, and with which role.

/// Fixed administrator set. These accounts bypass the allowlist and are
/// stored with `role = superadmin`.
pub const SUPER_ADMINS: &[&str] = &["miraculine.j@zohocorp.com", "rajendran@zohocorp.com"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed { superadmin: bool },
    Denied,
}

/// Allowlist decision, case-insensitive. An empty allowlist admits nobody
/// except the fixed administrators.
pub fn check(email: &str, allowlist: &[String]) -> Access {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Access::Denied;
    }
    let superadmin = SUPER_ADMINS.contains(&email.as_str());
    if allowlist.contains(&email) || superadmin {
        Access::Allowed { superadmin }
    } else {
        Access::Denied
    }
}
