// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Edgecast Cloud LLC.

//! Stub Jira Insight server for testing
//!
//! This crate provides a Dropshot-based HTTP server that implements the
//! Insight object API trait with static test data. It can be used for:
//!
//! - Integration testing of insight-client without a real Jira instance
//! - Local development and demos
//!
//! The server loads object fixtures from JSON files at startup and serves
//! them via the standard Insight REST endpoints. Every request it handles is
//! also recorded (method, path, raw query string) so tests can assert on
//! exactly what reached the wire.

use anyhow::{Context, Result};
use dropshot::{HttpError, HttpResponseOk, Path, Query, RequestContext, TypedBody};
use insight_api::{
    FindObjectPayload, GetObjectQueryOptions, Object, ObjectIdPath, ObjectList,
    UpdateObjectPayload,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ============================================================================
// Server Context
// ============================================================================

/// One request as seen by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Raw query string, `None` when the request URL had none
    pub query: Option<String>,
}

/// Context for the stub Insight server containing all test data
#[derive(Debug)]
pub struct StubContext {
    /// Objects indexed by numeric id
    objects: Mutex<HashMap<i64, Object>>,
    /// Every request handled so far, in arrival order
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubContext {
    /// Create a stub context from in-memory objects
    pub fn from_objects(objects: Vec<Object>) -> Self {
        Self {
            objects: Mutex::new(objects.into_iter().map(|o| (o.id, o)).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a stub context by loading object fixtures from JSON files
    ///
    /// Each `*.json` file in the directory should hold a single object in
    /// raw Insight API response format.
    pub fn from_fixtures(fixtures_dir: &std::path::Path) -> Result<Self> {
        let mut objects: HashMap<i64, Object> = HashMap::new();

        for entry in std::fs::read_dir(fixtures_dir).with_context(|| {
            format!("Failed to read fixtures directory: {}", fixtures_dir.display())
        })? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("");

            let json_str = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match serde_json::from_str::<Object>(&json_str) {
                Ok(object) => {
                    tracing::info!("Loaded object {} from {}", object.object_key, filename);
                    objects.insert(object.id, object);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: not a valid object file ({})", filename, e);
                }
            }
        }

        Ok(Self {
            objects: Mutex::new(objects),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Get all object keys
    pub fn object_keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .values()
            .map(|o| o.object_key.clone())
            .collect()
    }

    /// Requests handled so far, in arrival order
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: &dropshot::RequestInfo) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method().as_str().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
        });
    }
}

// ============================================================================
// API Implementation
// ============================================================================

/// Marker type for the stub Insight API implementation
pub enum StubInsightApi {}

impl insight_api::InsightApi for StubInsightApi {
    type Context = Arc<StubContext>;

    async fn get_object(
        rqctx: RequestContext<Self::Context>,
        path: Path<ObjectIdPath>,
        query: Query<GetObjectQueryOptions>,
    ) -> Result<HttpResponseOk<Object>, HttpError> {
        let ctx = rqctx.context();
        ctx.record(&rqctx.request);
        let path = path.into_inner();
        let query = query.into_inner();

        // Look up by numeric id or by object key
        let id = path.object_id.parse::<i64>().ok();
        let mut object = {
            let objects = ctx.objects.lock().unwrap();
            objects
                .values()
                .find(|o| Some(o.id) == id || o.object_key == path.object_id)
                .cloned()
                .ok_or_else(|| {
                    HttpError::for_not_found(
                        None,
                        format!("Object not found: {}", path.object_id),
                    )
                })?
        };

        // Attributes ship by default; extended info only on request.
        if !query.include_attributes.unwrap_or(true) {
            object.attributes.clear();
        }
        if !query.include_extended_info.unwrap_or(false) {
            object.extended_info = None;
        }

        Ok(HttpResponseOk(object))
    }

    async fn update_object(
        rqctx: RequestContext<Self::Context>,
        path: Path<ObjectIdPath>,
        body: TypedBody<UpdateObjectPayload>,
    ) -> Result<HttpResponseOk<Object>, HttpError> {
        let ctx = rqctx.context();
        ctx.record(&rqctx.request);
        let path = path.into_inner();
        let payload = body.into_inner();

        let id = path.object_id.parse::<i64>().ok();
        let mut objects = ctx.objects.lock().unwrap();
        let object = objects
            .values_mut()
            .find(|o| Some(o.id) == id || o.object_key == path.object_id)
            .ok_or_else(|| {
                HttpError::for_not_found(None, format!("Object not found: {}", path.object_id))
            })?;

        if let Some(type_id) = &payload.object_type_id {
            let type_id = type_id.parse::<i64>().map_err(|_| {
                HttpError::for_bad_request(
                    None,
                    format!("objectTypeId must be numeric: {}", type_id),
                )
            })?;
            object.object_type.id = type_id;
        }

        if let Some(attributes) = payload.attributes {
            let object_id = object.id;
            object.attributes = attributes;
            for attribute in &mut object.attributes {
                attribute.object_id = object_id;
            }
        }

        Ok(HttpResponseOk(object.clone()))
    }

    async fn find_objects(
        rqctx: RequestContext<Self::Context>,
        body: TypedBody<FindObjectPayload>,
    ) -> Result<HttpResponseOk<ObjectList>, HttpError> {
        let ctx = rqctx.context();
        ctx.record(&rqctx.request);
        let payload = body.into_inner();

        let page = payload.page.unwrap_or(1);
        let results_per_page = payload.results_per_page.unwrap_or(25);
        if page == 0 || results_per_page == 0 {
            return Err(HttpError::for_bad_request(
                None,
                "page and resultsPerPage are 1-based".to_string(),
            ));
        }

        let type_name = payload.ql_query.as_deref().and_then(parse_iql_object_type);
        let type_id = payload
            .object_type_id
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok());

        let mut matching: Vec<Object> = {
            let objects = ctx.objects.lock().unwrap();
            objects
                .values()
                .filter(|o| {
                    type_name
                        .as_deref()
                        .is_none_or(|name| o.object_type.name.eq_ignore_ascii_case(name))
                })
                .filter(|o| type_id.is_none_or(|id| o.object_type.id == id))
                .filter(|o| {
                    payload
                        .object_schema_id
                        .is_none_or(|id| o.object_type.object_schema_id == id as i64)
                })
                .cloned()
                .collect()
        };

        // Sort by label; `asc: 0` flips to descending. A real server sorts
        // by the orderByTypeAttrId attribute, which the stub does not model.
        let descending = payload.asc == Some(0);
        matching.sort_by(|a, b| a.label.cmp(&b.label));
        if descending {
            matching.reverse();
        }

        let total = matching.len();
        let start = ((page - 1) as usize) * (results_per_page as usize);
        let end = std::cmp::min(start + results_per_page as usize, total);
        let mut entries: Vec<Object> = if start < total {
            matching[start..end].to_vec()
        } else {
            Vec::new()
        };

        // Search results omit attributes unless explicitly requested
        if payload.include_attributes != Some(true) {
            for object in &mut entries {
                object.attributes.clear();
            }
        } else if let Some(to_display) = &payload.attributes_to_display {
            for object in &mut entries {
                object
                    .attributes
                    .retain(|a| to_display.attributes_to_display_ids.contains(&a.object_type_attribute_id));
            }
        }

        let object_type_id = matching
            .first()
            .map(|o| o.object_type.id)
            .filter(|id| matching.iter().all(|o| o.object_type.id == *id))
            .unwrap_or(0);

        let ql_query = payload.ql_query.clone().unwrap_or_default();

        Ok(HttpResponseOk(ObjectList {
            object_entries: entries,
            object_type_attributes: Vec::new(),
            object_type_id,
            object_type_is_inherited: false,
            abstract_object_type: false,
            total_filter_count: total as i64,
            start_index: start as i64,
            to_index: end as i64,
            page_object_size: results_per_page as i64,
            page_number: page as i64,
            order_way: if descending { "DESC" } else { "ASC" }.to_string(),
            filters: Vec::new(),
            ql_query: ql_query.clone(),
            ql_query_search_result: payload.ql_query.is_some(),
            conversion_possible: false,
            matched_filter_values: Vec::new(),
            iql: ql_query,
            iql_search_result: payload.ql_query.is_some(),
            page_size: total.div_ceil(results_per_page as usize) as i64,
        }))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse the object type name from an IQL query string
/// Expected format: `objectType = Server` or `objectType = "Web Server"`
fn parse_iql_object_type(iql: &str) -> Option<String> {
    let lower = iql.to_lowercase();
    let start = lower.find("objecttype")?;
    let after = iql[start + "objecttype".len()..].trim_start();
    let after = after.strip_prefix('=')?.trim_start();

    let value = if let Some(quoted) = after.strip_prefix('"') {
        quoted.split('"').next().unwrap_or("")
    } else {
        after.split_whitespace().next().unwrap_or("")
    };

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Create the Dropshot API description for the stub server
pub fn api_description() -> Result<dropshot::ApiDescription<Arc<StubContext>>, String> {
    insight_api::insight_api_mod::api_description::<StubInsightApi>().map_err(|e| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iql_object_type_simple() {
        assert_eq!(
            parse_iql_object_type("objectType = Server"),
            Some("Server".to_string())
        );
    }

    #[test]
    fn test_parse_iql_object_type_no_spaces() {
        assert_eq!(
            parse_iql_object_type("objectType=Server"),
            Some("Server".to_string())
        );
    }

    #[test]
    fn test_parse_iql_object_type_quoted() {
        assert_eq!(
            parse_iql_object_type(r#"objectType = "Web Server" AND Name like S"#),
            Some("Web Server".to_string())
        );
    }

    #[test]
    fn test_parse_iql_object_type_none() {
        assert_eq!(parse_iql_object_type("Name like Server"), None);
        assert_eq!(parse_iql_object_type("objectType"), None);
    }

    #[test]
    fn test_from_objects_indexes_by_id() {
        let object = Object {
            id: 7,
            object_key: "X-7".to_string(),
            ..Default::default()
        };
        let ctx = StubContext::from_objects(vec![object]);
        assert_eq!(ctx.object_keys(), vec!["X-7".to_string()]);
        assert!(ctx.recorded_requests().is_empty());
    }

    #[test]
    fn test_load_fixtures() {
        let fixtures_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let ctx = StubContext::from_fixtures(&fixtures_dir).expect("Failed to load fixtures");

        let keys = ctx.object_keys();
        assert!(keys.iter().any(|k| k == "ITSM-1"));
        assert!(keys.iter().any(|k| k == "ITSM-3"));

        let objects = ctx.objects.lock().unwrap();
        let server_1 = objects.get(&1).unwrap();
        assert_eq!(server_1.label, "Server-1");
        assert_eq!(server_1.object_type.name, "Server");
        assert!(!server_1.attributes.is_empty());
        assert!(server_1.extended_info.is_some());
    }
}
