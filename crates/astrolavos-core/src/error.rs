//! Crate-wide error type shared by the registry, geometry and radio paths.

use thiserror_no_std::Error;

/// Errors surfaced by the device logic.
///
/// These are signals, not control flow: callers log them and fall back to
/// placeholder rendering ("No Data") or skip the offending input. Nothing
/// here aborts a task loop.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Out-of-range identity, out-of-domain sensor value or a malformed
    /// radio frame.
    #[error("invalid argument")]
    InvalidArgument,
    /// Lookup or update for an identity with no active slot.
    #[error("no active slot for identity")]
    NotFound,
    /// Data too old or physically implausible to act on.
    #[error("stale or implausible data")]
    StaleOrImplausible,
    /// The radio link failed a transaction.
    #[error("radio transport failure")]
    TransportFailure,
}
