//! Document models for the two archive collections
//!
//! Field names on the wire keep the persisted schema (`vidID`, `vidTitle`,
//! `transcriptEmbedding`, ...) via serde renames.

use serde::{Deserialize, Serialize};

/// One archived interview/recording with full metadata and transcript.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Stable external identifier (derived from the source platform ID)
    #[serde(rename = "vidID")]
    pub vid_id: String,

    pub vid_title: String,

    #[serde(default)]
    pub vid_description: String,

    #[serde(default)]
    pub location: String,

    /// YYYY-MM-DD
    #[serde(default)]
    pub upload_date: String,

    /// YYYY-MM-DD
    #[serde(default)]
    pub record_date: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Full transcript in original script
    #[serde(default)]
    pub transcript: String,

    /// Full transcript translated to English
    #[serde(default)]
    pub english_translation: String,

    /// Time-coded transcript structure, original script (stored, not indexed)
    #[serde(default)]
    pub transcript_json: Vec<TranscriptSegment>,

    /// Time-coded transcript structure, English (stored, not indexed)
    #[serde(default)]
    pub english_transcript_json: Vec<TranscriptSegment>,

    /// Full-transcript embedding; never returned to clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_embedding: Option<Vec<f32>>,
}

/// One time-coded segment of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranscriptSegment {
    /// Recognition alternatives, best first
    pub alternatives: Vec<TranscriptAlternative>,
}

/// One recognition alternative for a segment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranscriptAlternative {
    /// Alternative text
    pub transcript: String,

    /// Recognition confidence in [0, 1]
    pub confidence: f64,

    /// Word-level time offsets, in segment order
    #[serde(default)]
    pub words: Vec<WordOffset>,
}

/// Word-level time offset within a segment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WordOffset {
    pub word: String,
    /// Offset into the recording, seconds
    pub start_time: f64,
    pub end_time: f64,
}

/// One searchable transcript snippet; many per video.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    /// Unique snippet identifier, independent of segment position
    #[serde(rename = "transcriptID")]
    pub transcript_id: String,

    /// Parent video; every snippet belongs to exactly one video
    #[serde(rename = "vidID")]
    pub vid_id: String,

    /// Segment start offset, seconds
    pub time_segment: u32,

    /// Segment end offset, seconds
    pub end_time: u32,

    /// Segment text in original script
    #[serde(default)]
    pub transcript_snippet: String,

    /// Segment text in English
    #[serde(default)]
    pub english_translation: String,

    /// Playback URL deep-linking to `time_segment`
    #[serde(default)]
    pub video_link_to_snippet: String,

    /// Snippet embedding; never returned to clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_embedding: Option<Vec<f32>>,
}
