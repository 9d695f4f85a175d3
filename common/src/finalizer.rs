use crate::{
    Error, Result,
    client::{DebugModeClient, WriteOptions},
    debugmode::DebugMode,
};
use tracing::info;

impl DebugModeClient {
    /// Ensure `finalizer` is set on a copy of `obj` and replace the object.
    ///
    /// Conflicts are not retried, re-read the object and call again.
    pub async fn add_finalizer(&self, obj: &DebugMode, finalizer: &str) -> Result<DebugMode> {
        let mut next = obj.clone();
        let finalizers = next.metadata.finalizers.get_or_insert_with(Vec::new);
        if !finalizers.iter().any(|f| f == finalizer) {
            finalizers.push(finalizer.to_string());
        }
        let result = self
            .update(&next, &WriteOptions::default())
            .await
            .map_err(|e| Error::AddFinalizer {
                finalizer: finalizer.to_string(),
                object: obj.key(),
                source: Box::new(e),
            })?;
        info!("finalizer {finalizer} set on debugmode {}", result.key());
        Ok(result)
    }

    /// Ensure `finalizer` is absent from a copy of `obj` and replace the object
    pub async fn remove_finalizer(&self, obj: &DebugMode, finalizer: &str) -> Result<DebugMode> {
        let mut next = obj.clone();
        if let Some(finalizers) = next.metadata.finalizers.as_mut() {
            finalizers.retain(|f| f != finalizer);
        }
        let result = self
            .update(&next, &WriteOptions::default())
            .await
            .map_err(|e| Error::RemoveFinalizer {
                finalizer: finalizer.to_string(),
                object: obj.key(),
                source: Box::new(e),
            })?;
        info!("finalizer {finalizer} removed from debugmode {}", result.key());
        Ok(result)
    }
}
