//! Object-storage collaborator seam.
//!
//! Media bytes live in an external object store; this backend only holds
//! references. Deleting a message or chat must request cleanup of the
//! referenced objects, and that request is best-effort: a missed cleanup
//! never fails the delete.

use tracing::info;

/// Cleanup interface to the external object store.
pub trait MediaStore: Send + Sync {
    /// Request deletion of one stored object. Best-effort.
    fn delete_object(&self, object_key: &str);
}

/// Default store used when no object-store integration is configured:
/// records the cleanup request in the log and nothing else.
#[derive(Debug, Default)]
pub struct LoggingMediaStore;

impl MediaStore for LoggingMediaStore {
    fn delete_object(&self, object_key: &str) {
        info!(object_key = %object_key, "media cleanup requested");
    }
}
