//! Video lifecycle operations
//!
//! A video and its snippet batch live and die together: snippets are
//! regenerated wholesale when a transcript is (re)computed, and deleting a
//! video removes its snippets in the same logical operation. No stale
//! snippets from a previous transcript version may coexist with current
//! ones, so every write of a batch first clears the old one.

use serde_json::json;
use tracing::{info, warn};

use crate::client::DocumentStore;
use crate::error::{Result, StoreError};
use crate::models::{Snippet, Video};
use crate::schema::{fields, Collection};

/// Index a video together with its first snippet batch.
pub async fn index_video(store: &dyn DocumentStore, video: &Video, snippets: &[Snippet]) -> Result<()> {
    info!(
        "Indexing video '{}' with {} snippets",
        video.vid_id,
        snippets.len()
    );

    store
        .index(
            Collection::Videos,
            &video.vid_id,
            serde_json::to_value(video)?,
        )
        .await?;

    replace_snippets(store, &video.vid_id, snippets).await
}

/// Replace the whole snippet batch for a video.
///
/// Used on transcript recomputation; deletes the previous batch by query
/// before writing the new one.
pub async fn replace_snippets(
    store: &dyn DocumentStore,
    vid_id: &str,
    snippets: &[Snippet],
) -> Result<()> {
    let deleted = store
        .delete_by_query(
            Collection::Snippets,
            json!({ "term": { (fields::VID_ID): vid_id } }),
        )
        .await?;
    if deleted > 0 {
        info!("Cleared {deleted} stale snippets for video '{vid_id}'");
    }

    let docs = snippets
        .iter()
        .map(|s| {
            if s.vid_id != vid_id {
                return Err(StoreError::Decode(format!(
                    "snippet '{}' belongs to video '{}', not '{}'",
                    s.transcript_id, s.vid_id, vid_id
                )));
            }
            Ok((s.transcript_id.clone(), serde_json::to_value(s)?))
        })
        .collect::<Result<Vec<_>>>()?;

    store.bulk_index(Collection::Snippets, docs).await
}

/// Apply a partial metadata update to a video document.
pub async fn update_video(
    store: &dyn DocumentStore,
    vid_id: &str,
    partial: serde_json::Value,
) -> Result<()> {
    store.update(Collection::Videos, vid_id, partial).await
}

/// Delete a video and all of its snippets as one logical operation.
pub async fn delete_video(store: &dyn DocumentStore, vid_id: &str) -> Result<()> {
    info!("Deleting video '{vid_id}' and its snippets");

    store.delete(Collection::Videos, vid_id).await?;

    let deleted = store
        .delete_by_query(
            Collection::Snippets,
            json!({ "term": { (fields::VID_ID): vid_id } }),
        )
        .await?;
    if deleted == 0 {
        warn!("Video '{vid_id}' had no snippets to delete");
    }
    Ok(())
}

/// Fetch a video document by id.
pub async fn get_video(
    store: &dyn DocumentStore,
    vid_id: &str,
) -> Result<Option<serde_json::Value>> {
    store.get(Collection::Videos, vid_id).await
}
