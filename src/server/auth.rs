//! Access credential gate.

use crate::config::AccessConfig;
use crate::error::{RedactorError, RedactorResult};

/// Compares the supplied credential with the configured one.
///
/// Plain string equality; this is a shared-secret gate, not an account system.
pub fn verify_access(config: &AccessConfig, supplied: &str) -> RedactorResult<()> {
    if supplied == config.password {
        Ok(())
    } else {
        tracing::warn!("rejected access credential");
        Err(RedactorError::AccessDenied)
    }
}
