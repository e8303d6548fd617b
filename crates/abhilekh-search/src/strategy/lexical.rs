//! Lexical (keyword) search strategy
//!
//! Multi-field fuzzy matching over the joined keyword list. Field choice
//! is language-aware per request: a query containing Devanagari targets
//! the original-script transcript field, anything else the English
//! translation. Best-matching-field semantics: the top-scoring field
//! dominates rather than fields summing.

use serde_json::{json, Value};
use tracing::debug;

use super::{assemble_body, filter_dsl, keyword_fields, QueryStrategy, StrategyInput};
use crate::error::Result;
use abhilekh_store::Collection;

pub struct LexicalStrategy;

impl QueryStrategy for LexicalStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn build(&self, input: &StrategyInput<'_>, collection: Collection) -> Result<Value> {
        let joined = input.keywords.join(" ");
        debug!("Lexical search for '{joined}' on '{collection}'");

        let query = json!({
            "bool": {
                "must": [{
                    "multi_match": {
                        "query": joined,
                        "fields": keyword_fields(collection, &joined),
                        "type": "best_fields",
                        "fuzziness": "AUTO"
                    }
                }],
                "filter": filter_dsl(input)
            }
        });

        Ok(assemble_body(query, input, collection))
    }
}
