//! Core events emitted by the engine

use dashboard_api::LogoutReason;
use dashboard_util::AccountId;

/// Events emitted by the engine's tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// Session ended and its slots were cleared
    SessionEnded {
        account_id: AccountId,
        reason: LogoutReason,
    },

    /// The watchdog expired but the logout failed; the watchdog stays disarmed
    LogoutFailed {
        reason: LogoutReason,
        message: String,
    },
}
