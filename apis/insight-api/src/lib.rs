// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Edgecast Cloud LLC.

//! Jira Insight (Assets) Object API Trait Definition
//!
//! **IMPORTANT**: This trait defines a *subset* of the Jira Insight REST API.
//! This is NOT a complete Insight API definition - it only includes the
//! object endpoints used by the asset tooling in this monorepo:
//! - Load a single object by id
//! - Update an object's type and attribute values
//! - Search objects with IQL (Insight Query Language)
//!
//! The actual Insight API is implemented by Atlassian's Jira servers. This
//! trait exists to:
//! 1. Document the exact Insight API surface we depend on
//! 2. Pin the wire-level JSON field names in one place
//! 3. Enable stub implementations for testing
//!
//! Reference: https://docs.atlassian.com/assets/REST/9.1.16/

use dropshot::{HttpError, HttpResponseOk, Path, Query, RequestContext, TypedBody};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Object Records
// ============================================================================
//
// These are passive records mirroring the remote JSON schema. Response
// entities carry a struct-level `#[serde(default)]` because Insight omits
// sections of the payload depending on the query flags sent with the
// request; a partial payload must still decode.

/// Avatar image URLs for an object, one per supported resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Avatar {
    pub url16: String,
    pub url48: String,
    pub url72: String,
    pub url144: String,
    pub url288: String,
    pub object_id: i64,
}

/// Icon metadata attached to object types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Icon {
    pub id: i64,
    pub name: String,
    pub url16: String,
    pub url48: String,
}

/// HAL-style links block on an object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_url: String,
}

/// Flags reported with `includeExtendedInfo=true`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtendedInfo {
    pub open_issues_exists: bool,
    pub attachments_exists: bool,
}

/// The default (primitive) type of an object type attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultType {
    pub id: i64,
    pub name: String,
}

/// Reference kind metadata for reference-typed attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceType {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
    pub url16: String,
    pub removable: bool,
}

/// The object type an object instances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectType {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: i64,
    pub description: String,
    pub icon: Icon,
    pub position: i64,
    pub created: String,
    pub updated: String,
    pub object_count: i64,
    pub parent_object_type_id: i64,
    pub object_schema_id: i64,
    pub inherited: bool,
    pub abstract_object_type: bool,
    pub parent_object_type_inherited: bool,
}

/// Object type metadata as reported for the target of a reference attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceObjectType {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: i64,
    pub description: String,
    pub icon: Icon,
    pub position: i64,
    pub created: String,
    pub updated: String,
    pub object_count: i64,
    pub parent_object_type_id: i64,
    pub object_schema_id: i64,
    pub inherited: bool,
    pub abstract_object_type: bool,
    pub parent_object_type_inherited: bool,
}

/// Schema metadata for one attribute slot of an object type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectTypeAttribute {
    pub id: i64,
    pub name: String,
    pub label: bool,
    #[serde(rename = "type")]
    pub type_: i64,
    pub default_type: DefaultType,
    pub editable: bool,
    pub system: bool,
    pub sortable: bool,
    pub summable: bool,
    pub indexed: bool,
    pub minimum_cardinality: i64,
    pub maximum_cardinality: i64,
    pub removable: bool,
    pub hidden: bool,
    pub include_child_object_types: bool,
    pub unique_attribute: bool,
    pub options: String,
    pub position: i64,
    /// Present only on reference-typed attributes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<ReferenceType>,
    /// Present only on reference-typed attributes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_object_type: Option<ReferenceObjectType>,
}

/// One value of a (possibly multi-valued) attribute, carrying the raw,
/// display, and search representations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectAttributeValue {
    pub value: String,
    pub display_value: String,
    pub search_value: String,
    pub referenced_type: bool,
}

/// A named value slot on an object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Attribute {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type_attribute: Option<ObjectTypeAttribute>,
    pub object_type_attribute_id: i64,
    pub object_attribute_values: Vec<ObjectAttributeValue>,
    pub object_id: i64,
}

/// A configuration-item record in the Insight asset database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Object {
    pub id: i64,
    pub label: String,
    pub object_key: String,
    pub avatar: Avatar,
    pub object_type: ObjectType,
    pub created: String,
    pub updated: String,
    pub has_avatar: bool,
    pub timestamp: i64,
    /// Omitted by the server unless `includeAttributes` is in effect
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Only reported with `includeExtendedInfo=true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_info: Option<ExtendedInfo>,
    #[serde(rename = "_links")]
    pub links: Links,
    pub name: String,
}

// ============================================================================
// Search Result Records
// ============================================================================

/// A filter the server applied while evaluating a search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Filters {
    pub object_type_attribute_id: i64,
    pub selected_values: Vec<String>,
}

/// An attribute match the server reports alongside filtered search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchedFilterValues {
    pub id: i64,
    pub object_type_attribute: ObjectTypeAttribute,
    pub object_type_attribute_id: i64,
    pub object_attribute_values: Vec<ObjectAttributeValue>,
    pub object_id: i64,
}

/// One page of IQL search results plus the pagination metadata the server
/// computed for it. Nothing in here is derived client-side; every cursor
/// field is echoed from the server.
///
/// The upstream payload also carries an `inheritanceTree` block for the
/// object-type tree display; inheritance display is out of scope here and
/// the field is intentionally not modeled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectList {
    pub object_entries: Vec<Object>,
    pub object_type_attributes: Vec<ObjectTypeAttribute>,
    pub object_type_id: i64,
    pub object_type_is_inherited: bool,
    pub abstract_object_type: bool,
    pub total_filter_count: i64,
    pub start_index: i64,
    pub to_index: i64,
    pub page_object_size: i64,
    pub page_number: i64,
    pub order_way: String,
    pub filters: Vec<Filters>,
    pub ql_query: String,
    pub ql_query_search_result: bool,
    pub conversion_possible: bool,
    pub matched_filter_values: Vec<MatchedFilterValues>,
    pub iql: String,
    pub iql_search_result: bool,
    /// Total number of pages, not entries per page (that is
    /// `pageObjectSize`); the naming is the vendor's.
    pub page_size: i64,
}

// ============================================================================
// Request Types
// ============================================================================
//
// Request fields use `Option<T>` present markers rather than zero-value
// omission: `None` never reaches the wire, so the server's defaults apply,
// while an explicit `Some(false)` / `Some(0)` is transmitted as-is.

/// Query flags for loading a single object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetObjectQueryOptions {
    /// Attach the object's attribute list (server default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_attributes: Option<bool>,
    /// Report open-issue / attachment existence flags (server default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_extended_info: Option<bool>,
}

/// Body of an object update. Which fields are patched versus replaced is
/// decided by the remote API, not by this definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateObjectPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
}

/// Attribute ids to attach to search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributesToDisplay {
    pub attributes_to_display_ids: Vec<i64>,
}

/// Body of an IQL object search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindObjectPayload {
    /// IQL query string, e.g. `objectType = Server`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ql_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type_id: Option<String>,
    /// 1-based page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by_type_attr_id: Option<u64>,
    /// 1 sorts ascending, 0 descending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asc: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_schema_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_attributes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_display: Option<AttributesToDisplay>,
}

/// Path parameter for the single-object endpoints
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ObjectIdPath {
    /// Object id (numeric, as a string in the path)
    pub object_id: String,
}

// ============================================================================
// API Trait
// ============================================================================

/// Jira Insight Object REST API (Subset)
///
/// **IMPORTANT**: This is a partial definition of Insight's API, containing
/// only the object-access endpoints. The actual implementation of these
/// endpoints is provided by Atlassian's Jira servers, not by us; the stub
/// server in this monorepo implements the trait for testing.
#[dropshot::api_description]
pub trait InsightApi {
    /// Context type for request handlers
    type Context: Send + Sync + 'static;

    /// Load a single object by id
    ///
    /// Query flags control whether the attribute list and the extended-info
    /// flags are attached to the response.
    ///
    /// **Insight API Reference**: GET /rest/insight/1.0/object/{id}
    #[endpoint {
        method = GET,
        path = "/rest/insight/1.0/object/{object_id}",
        tags = ["objects"],
    }]
    async fn get_object(
        rqctx: RequestContext<Self::Context>,
        path: Path<ObjectIdPath>,
        query: Query<GetObjectQueryOptions>,
    ) -> Result<HttpResponseOk<Object>, HttpError>;

    /// Update an object
    ///
    /// Replaces the supplied attribute values and/or the object type.
    /// The updated object is echoed back in full.
    ///
    /// **Insight API Reference**: PUT /rest/insight/1.0/object/{id}
    #[endpoint {
        method = PUT,
        path = "/rest/insight/1.0/object/{object_id}",
        tags = ["objects"],
    }]
    async fn update_object(
        rqctx: RequestContext<Self::Context>,
        path: Path<ObjectIdPath>,
        body: TypedBody<UpdateObjectPayload>,
    ) -> Result<HttpResponseOk<Object>, HttpError>;

    /// Search objects with IQL
    ///
    /// Evaluates an IQL query with optional type/schema filters, sorting,
    /// and pagination. Pagination metadata in the result is computed by the
    /// server and echoed verbatim to clients.
    ///
    /// **Insight API Reference**: POST /rest/insight/1.0/object/navlist/iql
    #[endpoint {
        method = POST,
        path = "/rest/insight/1.0/object/navlist/iql",
        tags = ["object-search"],
    }]
    async fn find_objects(
        rqctx: RequestContext<Self::Context>,
        body: TypedBody<FindObjectPayload>,
    ) -> Result<HttpResponseOk<ObjectList>, HttpError>;
}

// ============================================================================
// Tests
// ============================================================================
