//! Collection schemas and index mappings
//!
//! Defines the two logical collections of the archive and the explicit
//! Elasticsearch mappings they are created with.

use serde_json::{json, Value};

/// Embedding vector dimension for both collections. Vectors of any other
/// length must be rejected before they reach the store.
pub const EMBEDDING_DIM: usize = 3072;

/// Collection (index) names used by the archive
pub mod collections {
    /// Full videos with metadata and complete transcripts
    pub const VIDEOS: &str = "videos";
    /// Time-coded transcript snippets, many per video
    pub const SNIPPETS: &str = "video_snippets";
}

/// Target collection for a search or CRUD operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// The `videos` index
    Videos,
    /// The `video_snippets` index
    Snippets,
}

impl Collection {
    /// Index name as known to the store
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Videos => collections::VIDEOS,
            Collection::Snippets => collections::SNIPPETS,
        }
    }

    /// Parse an index name (`videos` / `video_snippets`)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            collections::VIDEOS => Some(Collection::Videos),
            collections::SNIPPETS => Some(Collection::Snippets),
            _ => None,
        }
    }

    /// The dense-vector field holding this collection's embedding
    pub fn embedding_field(&self) -> &'static str {
        match self {
            Collection::Videos => fields::TRANSCRIPT_EMBEDDING,
            Collection::Snippets => fields::SNIPPET_EMBEDDING,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document field names as persisted in the store
pub mod fields {
    /// Stable external video identifier, primary key of `videos`
    pub const VID_ID: &str = "vidID";
    /// Video title
    pub const VID_TITLE: &str = "vidTitle";
    /// Video description
    pub const VID_DESCRIPTION: &str = "vidDescription";
    /// Recording location
    pub const LOCATION: &str = "location";
    /// Upload date (YYYY-MM-DD)
    pub const UPLOAD_DATE: &str = "uploadDate";
    /// Recording date (YYYY-MM-DD)
    pub const RECORD_DATE: &str = "recordDate";
    /// Tag set
    pub const TAGS: &str = "tags";
    /// Full transcript in original script
    pub const TRANSCRIPT: &str = "transcript";
    /// Full English translation (videos) / snippet translation (snippets)
    pub const ENGLISH_TRANSLATION: &str = "englishTranslation";
    /// Time-coded transcript structure, original script
    pub const TRANSCRIPT_JSON: &str = "transcriptJson";
    /// Time-coded transcript structure, English
    pub const ENGLISH_TRANSCRIPT_JSON: &str = "englishTranscriptJson";
    /// Full-transcript embedding vector (videos)
    pub const TRANSCRIPT_EMBEDDING: &str = "transcriptEmbedding";
    /// Snippet identifier, primary key of `video_snippets`
    pub const TRANSCRIPT_ID: &str = "transcriptID";
    /// Snippet start offset in seconds
    pub const TIME_SEGMENT: &str = "timeSegment";
    /// Snippet end offset in seconds
    pub const END_TIME: &str = "endTime";
    /// Snippet text in original script
    pub const TRANSCRIPT_SNIPPET: &str = "transcriptSnippet";
    /// Playback URL deep-linking to the snippet start
    pub const VIDEO_LINK: &str = "videoLinkToSnippet";
    /// Snippet embedding vector
    pub const SNIPPET_EMBEDDING: &str = "snippetEmbedding";
}

/// Mapping for the `videos` index.
///
/// The time-coded transcript structures are stored but not indexed
/// (`enabled: false`); they are payload for clients, never search targets.
pub fn videos_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                (fields::VID_ID): { "type": "keyword" },
                (fields::VID_TITLE): { "type": "text" },
                (fields::VID_DESCRIPTION): { "type": "text" },
                (fields::LOCATION): { "type": "text" },
                (fields::UPLOAD_DATE): { "type": "date", "format": "yyyy-MM-dd" },
                (fields::RECORD_DATE): { "type": "date", "format": "yyyy-MM-dd" },
                (fields::TAGS): { "type": "keyword" },
                (fields::TRANSCRIPT): { "type": "text" },
                (fields::ENGLISH_TRANSLATION): { "type": "text" },
                (fields::TRANSCRIPT_JSON): { "type": "object", "enabled": false },
                (fields::ENGLISH_TRANSCRIPT_JSON): { "type": "object", "enabled": false },
                (fields::TRANSCRIPT_EMBEDDING): {
                    "type": "dense_vector",
                    "dims": EMBEDDING_DIM,
                    "index": true,
                    "similarity": "cosine"
                }
            }
        }
    })
}

/// Mapping for the `video_snippets` index.
pub fn snippets_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                (fields::TRANSCRIPT_ID): { "type": "keyword" },
                (fields::VID_ID): { "type": "keyword" },
                (fields::TIME_SEGMENT): { "type": "integer" },
                (fields::END_TIME): { "type": "integer" },
                (fields::TRANSCRIPT_SNIPPET): { "type": "text" },
                (fields::ENGLISH_TRANSLATION): { "type": "text" },
                (fields::VIDEO_LINK): { "type": "keyword" },
                (fields::SNIPPET_EMBEDDING): {
                    "type": "dense_vector",
                    "dims": EMBEDDING_DIM,
                    "index": true,
                    "similarity": "cosine"
                }
            }
        }
    })
}

/// Mapping body for a collection
pub fn mapping_for(collection: Collection) -> Value {
    match collection {
        Collection::Videos => videos_mapping(),
        Collection::Snippets => snippets_mapping(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_roundtrip() {
        assert_eq!(Collection::parse("videos"), Some(Collection::Videos));
        assert_eq!(Collection::parse("video_snippets"), Some(Collection::Snippets));
        assert_eq!(Collection::parse("nope"), None);
        assert_eq!(Collection::Videos.to_string(), "videos");
    }

    #[test]
    fn test_embedding_fields() {
        assert_eq!(Collection::Videos.embedding_field(), "transcriptEmbedding");
        assert_eq!(Collection::Snippets.embedding_field(), "snippetEmbedding");
    }

    #[test]
    fn test_mappings_use_cosine_ann_vectors() {
        for collection in [Collection::Videos, Collection::Snippets] {
            let mapping = mapping_for(collection);
            let vector = &mapping["mappings"]["properties"][collection.embedding_field()];
            assert_eq!(vector["type"], "dense_vector");
            assert_eq!(vector["dims"], EMBEDDING_DIM);
            assert_eq!(vector["index"], true);
            assert_eq!(vector["similarity"], "cosine");
        }
    }

    #[test]
    fn test_transcript_json_is_not_indexed() {
        let mapping = videos_mapping();
        for field in [fields::TRANSCRIPT_JSON, fields::ENGLISH_TRANSCRIPT_JSON] {
            assert_eq!(mapping["mappings"]["properties"][field]["enabled"], false);
        }
    }
}
