//! Vector-similarity search strategy
//!
//! Primary signal: sigmoid-normalized cosine similarity between the query
//! embedding and the collection's stored vector field. Secondary signal: a
//! low-boost lexical pass over the text fields, added into the script via
//! `_score`. It acts as a tie-breaker and rescue for exact-term matches the
//! embedding might under-rank. The inner bool matches every document
//! (`minimum_should_match: 0`) so the vector signal alone can surface hits.

use serde_json::{json, Value};
use tracing::debug;

use super::{assemble_body, filter_dsl, text_fields, QueryStrategy, StrategyInput};
use crate::error::{Result, SearchError};
use crate::scoring::{SigmoidParams, LEXICAL_BOOST};
use abhilekh_store::Collection;

pub struct VectorStrategy;

impl QueryStrategy for VectorStrategy {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn build(&self, input: &StrategyInput<'_>, collection: Collection) -> Result<Value> {
        let embedding = input.embedding.ok_or_else(|| {
            SearchError::Embedding("vector search dispatched without a query embedding".into())
        })?;
        debug!("Vector search on '{collection}'");

        let params = SigmoidParams::for_collection(collection);
        let query = json!({
            "script_score": {
                "query": {
                    "bool": {
                        "should": [{
                            "multi_match": {
                                "query": input.query_text,
                                "fields": text_fields(collection),
                                "type": "most_fields",
                                "boost": LEXICAL_BOOST
                            }
                        }],
                        "minimum_should_match": 0,
                        "filter": filter_dsl(input)
                    }
                },
                "script": params.script(collection.embedding_field(), embedding, true)
            }
        });

        Ok(assemble_body(query, input, collection))
    }
}
