//! Score normalization for vector similarity
//!
//! Raw cosine similarity on high-dimensional embeddings bunches up near the
//! top of its range, so it is not comparable to lexical scores. A logistic
//! (sigmoid) curve re-spreads the "likely relevant" band (similarity around
//! 0.5–0.7) before the similarity is used as a score component:
//!
//! `normalized = weight / (1 + e^(−steepness · (similarity − midpoint)))`
//!
//! Constants are tunable per collection; the sigmoid shape itself is not.

use serde_json::{json, Value};

use abhilekh_store::Collection;

/// Boost applied to the lexical clause wherever it runs alongside the
/// vector signal (vector and combined modes).
pub const LEXICAL_BOOST: f64 = 0.2;

/// Sigmoid normalization constants for one collection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidParams {
    /// Curve steepness (k)
    pub steepness: f64,
    /// Similarity value mapped to half weight
    pub midpoint: f64,
    /// Effective weight of the vector signal
    pub weight: f64,
}

impl SigmoidParams {
    /// Full-transcript embeddings: long texts, similarities center higher
    pub const VIDEOS: SigmoidParams = SigmoidParams {
        steepness: 12.0,
        midpoint: 0.55,
        weight: 0.8,
    };

    /// Snippet embeddings: short texts, similarities run lower
    pub const SNIPPETS: SigmoidParams = SigmoidParams {
        steepness: 12.0,
        midpoint: 0.50,
        weight: 0.8,
    };

    /// Parameters for a collection
    pub fn for_collection(collection: Collection) -> Self {
        match collection {
            Collection::Videos => Self::VIDEOS,
            Collection::Snippets => Self::SNIPPETS,
        }
    }

    /// Reference implementation of the normalization.
    ///
    /// The store evaluates the same formula in its scoring script; this
    /// function pins the semantics for tests.
    pub fn normalize(&self, similarity: f64) -> f64 {
        self.weight / (1.0 + (-self.steepness * (similarity - self.midpoint)).exp())
    }

    /// Painless source for the store-side evaluation.
    ///
    /// The embedding field name must be a literal in the script; everything
    /// else travels in `params` so the script body is cacheable.
    pub fn script_source(&self, embedding_field: &str, add_lexical_score: bool) -> String {
        let sigmoid = format!(
            "params.weight / (1 + Math.exp(-params.steepness * \
             (cosineSimilarity(params.query_vector, '{embedding_field}') - params.midpoint)))"
        );
        if add_lexical_score {
            format!("{sigmoid} + _score")
        } else {
            sigmoid
        }
    }

    /// Full `script` object for a `script_score` clause.
    pub fn script(
        &self,
        embedding_field: &str,
        query_vector: &[f32],
        add_lexical_score: bool,
    ) -> Value {
        json!({
            "source": self.script_source(embedding_field, add_lexical_score),
            "params": {
                "query_vector": query_vector,
                "weight": self.weight,
                "steepness": self.steepness,
                "midpoint": self.midpoint
            }
        })
    }
}
