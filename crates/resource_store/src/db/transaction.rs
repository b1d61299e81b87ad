//! Opt-in scoped transaction for multi-statement writes.
//!
//! # Invariants
//! - Commit happens only when the closure returns `Ok`.
//! - Any `Err` (or unwinding panic) leaves the database untouched.

use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `work` inside an IMMEDIATE transaction.
///
/// The transaction derefs to `Connection`, so a repository can be built on
/// it for the duration of the closure. Errors returned by `work` are passed
/// through unchanged after rollback; begin/commit failures are converted
/// with `From<rusqlite::Error>`.
pub fn with_transaction<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    match work(&tx) {
        Ok(value) => {
            tx.commit()?;
            debug!("event=tx_commit module=db status=ok");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=tx_rollback module=db status=error error_code=rollback_failed error={}",
                    rollback_err
                );
            } else {
                debug!("event=tx_rollback module=db status=ok");
            }
            Err(err)
        }
    }
}
