//! Hybrid ("combined") search strategy
//!
//! Lexical and vector signals as disjunctive alternatives rather than a
//! conjunction: a fuzzy keyword clause (low boost) and the sigmoid
//! similarity clause sit in one `should` list with
//! `minimum_should_match: 1`, and the engine sums whichever clauses match, so
//! documents satisfying both signals rank above either alone.

use serde_json::{json, Value};
use tracing::debug;

use super::{assemble_body, filter_dsl, keyword_fields, QueryStrategy, StrategyInput};
use crate::error::{Result, SearchError};
use crate::scoring::{SigmoidParams, LEXICAL_BOOST};
use abhilekh_store::Collection;

pub struct HybridStrategy;

impl QueryStrategy for HybridStrategy {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn build(&self, input: &StrategyInput<'_>, collection: Collection) -> Result<Value> {
        let embedding = input.embedding.ok_or_else(|| {
            SearchError::Embedding("combined search dispatched without a query embedding".into())
        })?;
        let joined = input.keywords.join(" ");
        debug!("Combined search for '{joined}' on '{collection}'");

        let params = SigmoidParams::for_collection(collection);
        let query = json!({
            "bool": {
                "should": [
                    {
                        "multi_match": {
                            "query": joined,
                            "fields": keyword_fields(collection, &joined),
                            "type": "best_fields",
                            "fuzziness": "AUTO",
                            "boost": LEXICAL_BOOST
                        }
                    },
                    {
                        "script_score": {
                            "query": { "match_all": { "boost": 0.0 } },
                            "script": params.script(collection.embedding_field(), embedding, false)
                        }
                    }
                ],
                "minimum_should_match": 1,
                "filter": filter_dsl(input)
            }
        });

        Ok(assemble_body(query, input, collection))
    }
}
