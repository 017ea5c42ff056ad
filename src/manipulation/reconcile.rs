//! Mapping a re-read sibling set back onto the caller's inserted structures.

use crate::manipulation::errors::ManipulationError;
use tracing::trace;

/// Return the `inserted_count` siblings starting at `insert_index`, in order.
///
/// `updated` must be the sibling set re-read from the rebuilt tree.
pub fn get_nodes_to_return<T: Clone>(
    updated: &[T],
    insert_index: usize,
    inserted_count: usize,
) -> Result<Vec<T>, ManipulationError> {
    let end = insert_index + inserted_count;
    if end > updated.len() {
        return Err(ManipulationError::ReconciliationMismatch {
            what: "siblings",
            expected: end,
            found: updated.len(),
        });
    }
    trace!(insert_index, inserted_count, "reconciling inserted siblings");
    Ok(updated[insert_index..end].to_vec())
}

/// Check that a sibling set grew by exactly the number of inserted elements.
///
/// Fails when the inserted text parsed into a different number of nodes.
pub fn verify_sibling_count(
    what: &'static str,
    previous: usize,
    inserted: usize,
    found: usize,
) -> Result<(), ManipulationError> {
    if previous + inserted != found {
        return Err(ManipulationError::ReconciliationMismatch {
            what,
            expected: previous + inserted,
            found,
        });
    }
    Ok(())
}
