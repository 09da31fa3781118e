// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Jira Insight Object API Client Library
//!
//! This client provides typed access to the object endpoints of a Jira
//! Insight (Assets) instance: loading a single object, updating it, and
//! searching with IQL. It is a thin binding over the REST surface defined
//! in apis/insight-api; auth, TLS, connection pooling, and timeouts belong
//! to the `reqwest::Client` handed in by the caller.
//!
//! Each operation issues exactly one request. There are no retries and no
//! client-side pagination; the pagination metadata in search results is
//! whatever the server echoed.
//!
//! ## Usage
//!
//! ```ignore
//! use insight_client::{FindObjectPayload, GetObjectQueryOptions, InsightClient};
//!
//! let client = InsightClient::new_with_basic_auth(
//!     "https://jira.example.com",
//!     "svc-assets",
//!     "hunter2",
//! )?;
//!
//! // Load one object, attributes included
//! let object = client
//!     .get_object(
//!         "111",
//!         Some(&GetObjectQueryOptions {
//!             include_attributes: Some(true),
//!             ..Default::default()
//!         }),
//!     )
//!     .await?;
//!
//! // IQL search, first page of 25
//! let page = client
//!     .find_objects(&FindObjectPayload {
//!         ql_query: Some("objectType = Server".to_string()),
//!         page: Some(1),
//!         results_per_page: Some(25),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```
//!
//! Every operation also has a `_with_deadline` variant taking a
//! `tokio::time::Instant`; the deadline is checked before the request is
//! sent and enforced around the whole exchange.

mod error;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::time::Instant;

pub use error::{ApiErrorBody, ErrorResponse, ObjectAccessError};

// Re-export the wire types from the API crate for convenience
pub use insight_api::{
    Attribute, AttributesToDisplay, Avatar, DefaultType, ExtendedInfo, FindObjectPayload,
    GetObjectQueryOptions, Icon, Links, MatchedFilterValues, Object, ObjectAttributeValue,
    ObjectList, ObjectType, ObjectTypeAttribute, ReferenceObjectType, ReferenceType,
    UpdateObjectPayload,
};

/// Typed client for the Insight object REST API
///
/// Holds no per-call state; a single instance can be shared and used
/// concurrently. Whatever concurrency or pooling happens is the business of
/// the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct InsightClient {
    http: reqwest::Client,
    base_url: String,
}

impl InsightClient {
    /// Create a client with a default transport
    ///
    /// The base URL is the root of the Jira instance, e.g.
    /// `https://jira.example.com`; the `rest/insight/1.0` prefix is appended
    /// per request.
    pub fn new(base_url: &str) -> Result<Self, ObjectAccessError> {
        Self::new_with_client(base_url, reqwest::Client::new())
    }

    /// Create a client over an externally configured transport
    ///
    /// Use this when auth headers, timeouts, or TLS settings are managed by
    /// the caller.
    pub fn new_with_client(
        base_url: &str,
        http: reqwest::Client,
    ) -> Result<Self, ObjectAccessError> {
        let parsed = url::Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client whose transport sends HTTP Basic credentials
    pub fn new_with_basic_auth(
        base_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, ObjectAccessError> {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;

        let mut headers = HeaderMap::new();
        let credentials = format!("{}:{}", username, password);
        let encoded = STANDARD.encode(credentials.as_bytes());
        let mut auth_value = HeaderValue::from_str(&format!("Basic {}", encoded))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(concat!("insight-client/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Self::new_with_client(base_url, http)
    }

    /// The base URL requests are issued against, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Load a single object by id
    ///
    /// When `options` is `None` no query string is sent and the server's
    /// defaults apply. Unset flags inside `options` are omitted entirely, so
    /// an explicit `Some(false)` is distinguishable from "not specified".
    pub async fn get_object(
        &self,
        object_id: &str,
        options: Option<&GetObjectQueryOptions>,
    ) -> Result<Object, ObjectAccessError> {
        let request = self.get_object_request(object_id, options)?;
        self.execute(request, None).await
    }

    /// Load a single object by id, giving up at `deadline`
    pub async fn get_object_with_deadline(
        &self,
        object_id: &str,
        options: Option<&GetObjectQueryOptions>,
        deadline: Instant,
    ) -> Result<Object, ObjectAccessError> {
        let request = self.get_object_request(object_id, options)?;
        self.execute(request, Some(deadline)).await
    }

    /// Update an object's type and/or attribute values
    ///
    /// Returns the updated object as echoed by the server. Whether the
    /// supplied fields patch or replace is the remote API's decision; this
    /// client only marshals the payload.
    pub async fn update_object(
        &self,
        object_id: &str,
        payload: &UpdateObjectPayload,
    ) -> Result<Object, ObjectAccessError> {
        let request = self.update_object_request(object_id, payload)?;
        self.execute(request, None).await
    }

    /// Update an object, giving up at `deadline`
    pub async fn update_object_with_deadline(
        &self,
        object_id: &str,
        payload: &UpdateObjectPayload,
        deadline: Instant,
    ) -> Result<Object, ObjectAccessError> {
        let request = self.update_object_request(object_id, payload)?;
        self.execute(request, Some(deadline)).await
    }

    /// Search objects with IQL
    ///
    /// Returns one page of results; the pagination cursors inside the
    /// returned list come from the server verbatim.
    pub async fn find_objects(
        &self,
        payload: &FindObjectPayload,
    ) -> Result<ObjectList, ObjectAccessError> {
        let request = self.find_objects_request(payload)?;
        self.execute(request, None).await
    }

    /// Search objects with IQL, giving up at `deadline`
    pub async fn find_objects_with_deadline(
        &self,
        payload: &FindObjectPayload,
        deadline: Instant,
    ) -> Result<ObjectList, ObjectAccessError> {
        let request = self.find_objects_request(payload)?;
        self.execute(request, Some(deadline)).await
    }

    // ========================================================================
    // Request Construction
    // ========================================================================

    fn object_endpoint(&self, object_id: &str) -> String {
        format!(
            "{}/rest/insight/1.0/object/{}",
            self.base_url,
            urlencoding::encode(object_id)
        )
    }

    fn get_object_request(
        &self,
        object_id: &str,
        options: Option<&GetObjectQueryOptions>,
    ) -> Result<reqwest::Request, ObjectAccessError> {
        let mut builder = self.http.get(self.object_endpoint(object_id));
        if let Some(options) = options {
            builder = builder.query(options);
        }
        Ok(builder.build()?)
    }

    fn update_object_request(
        &self,
        object_id: &str,
        payload: &UpdateObjectPayload,
    ) -> Result<reqwest::Request, ObjectAccessError> {
        Ok(self
            .http
            .put(self.object_endpoint(object_id))
            .json(payload)
            .build()?)
    }

    fn find_objects_request(
        &self,
        payload: &FindObjectPayload,
    ) -> Result<reqwest::Request, ObjectAccessError> {
        let url = format!("{}/rest/insight/1.0/object/navlist/iql", self.base_url);
        Ok(self.http.post(url).json(payload).build()?)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Run one request/response exchange, optionally bounded by a deadline.
    /// The deadline is checked before anything is sent.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::Request,
        deadline: Option<Instant>,
    ) -> Result<T, ObjectAccessError> {
        match deadline {
            None => self.dispatch(request).await,
            Some(deadline) => {
                if deadline <= Instant::now() {
                    return Err(ObjectAccessError::DeadlineExceeded);
                }
                match tokio::time::timeout_at(deadline, self.dispatch(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(ObjectAccessError::DeadlineExceeded),
                }
            }
        }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: reqwest::Request,
    ) -> Result<T, ObjectAccessError> {
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            "dispatching Insight request"
        );

        let response = self.http.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                "Insight request returned non-success status"
            );
            let headers = response.headers().clone();
            let body = response.text().await?;
            let error = serde_json::from_str(&body).ok();
            return Err(ObjectAccessError::Api(Box::new(ErrorResponse {
                status,
                headers,
                body,
                error,
            })));
        }

        Ok(response.json::<T>().await?)
    }
}

// ============================================================================
// Tests
// ============================================================================
