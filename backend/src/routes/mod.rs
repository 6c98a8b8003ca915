/// Router Module Index
///
/// Splits the portal's pages by who may reach them. The access guard in `lib.rs`
/// wraps all three; the split mirrors its rules so the two stay easy to compare.

/// Routes outside the guarded surface (health, registration, logout, `/unauthorized`)
/// plus the login page, which the guard keeps to anonymous callers.
pub mod public;

/// Reader pages. The guard admits only the `User` role.
pub mod authenticated;

/// The admin console, nested under `/admin`. The guard admits only the `Admin` role.
pub mod admin;
