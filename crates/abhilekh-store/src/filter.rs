//! Filter normalization
//!
//! Turns raw, possibly user-supplied filter values into typed clauses that
//! serialize to the store's query language. Invalid or absent values are
//! dropped silently: a malformed date must neither error nor filter.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::schema::{fields, Collection};

/// Strict YYYY-MM-DD. Anything else is not a date filter.
fn is_strict_date(s: &str) -> bool {
    let pattern = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    pattern.is_match(s)
}

/// Raw filter values as they arrive from the classifier or the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFilters {
    #[serde(rename = "uploadDate")]
    pub upload_date: Option<String>,

    pub location: Option<String>,

    pub tags: Vec<String>,

    #[serde(rename = "vidID")]
    pub vid_id: Option<String>,
}

impl RawFilters {
    /// True when no filter value is present at all.
    pub fn is_empty(&self) -> bool {
        self.upload_date.is_none()
            && self.location.is_none()
            && self.tags.is_empty()
            && self.vid_id.is_none()
    }

    /// Merge `self` over `inferred`: explicit values win, inferred values
    /// fill the gaps. Request-supplied filters take precedence over
    /// classifier-inferred ones.
    pub fn merged_over(&self, inferred: &RawFilters) -> RawFilters {
        RawFilters {
            upload_date: self.upload_date.clone().or_else(|| inferred.upload_date.clone()),
            location: self.location.clone().or_else(|| inferred.location.clone()),
            tags: if self.tags.is_empty() {
                inferred.tags.clone()
            } else {
                self.tags.clone()
            },
            vid_id: self.vid_id.clone().or_else(|| inferred.vid_id.clone()),
        }
    }

    /// Validate and shape the raw values into clauses for one collection.
    ///
    /// Clause order is stable: date, location, tags, vidID. Date and
    /// location are video metadata; snippets carry neither field, so both
    /// are dropped at snippet level rather than mapped through the parent.
    pub fn normalize(&self, collection: Collection) -> Vec<FilterClause> {
        let mut clauses = Vec::new();

        if collection == Collection::Videos {
            if let Some(date) = self.upload_date.as_deref() {
                if is_strict_date(date) {
                    clauses.push(FilterClause::DateEquals(date.to_string()));
                }
            }
            if let Some(location) = self.location.as_deref() {
                if !location.trim().is_empty() {
                    clauses.push(FilterClause::LocationMatches(location.to_string()));
                }
            }
        }

        if !self.tags.is_empty() {
            let tags: Vec<String> = self
                .tags
                .iter()
                .filter(|t| !t.trim().is_empty())
                .cloned()
                .collect();
            if !tags.is_empty() {
                clauses.push(FilterClause::TagsIn(tags));
            }
        }

        if let Some(vid_id) = self.vid_id.as_deref() {
            if !vid_id.trim().is_empty() {
                clauses.push(FilterClause::VidIdEquals(vid_id.to_string()));
            }
        }

        clauses
    }
}

/// One validated filter clause. Clauses AND-combine in the query's
/// filter context.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// Exact match on `uploadDate` (videos only)
    DateEquals(String),
    /// Analyzed text match on `location`, allows partial matching
    LocationMatches(String),
    /// Term-set membership on `tags`
    TagsIn(Vec<String>),
    /// Exact match on `vidID`; the only filter usable identically on both
    /// collections, since it scopes a video's own snippets
    VidIdEquals(String),
}

impl FilterClause {
    /// Serialize to the store's filter DSL.
    pub fn to_dsl(&self) -> Value {
        match self {
            FilterClause::DateEquals(date) => json!({
                "term": { (fields::UPLOAD_DATE): date }
            }),
            FilterClause::LocationMatches(location) => json!({
                "match": { (fields::LOCATION): location }
            }),
            FilterClause::TagsIn(tags) => json!({
                "terms": { (fields::TAGS): tags }
            }),
            FilterClause::VidIdEquals(vid_id) => json!({
                "term": { (fields::VID_ID): vid_id }
            }),
        }
    }
}

/// Serialize a clause list into the `filter` array of a bool query.
pub fn clauses_to_dsl(clauses: &[FilterClause]) -> Vec<Value> {
    clauses.iter().map(FilterClause::to_dsl).collect()
}
