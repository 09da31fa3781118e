// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Error types for the Insight object client

use std::collections::HashMap;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use thiserror::Error;

/// Insight object client errors
///
/// Exactly one request is issued per operation; every failure propagates to
/// the caller unretried.
#[derive(Debug, Error)]
pub enum ObjectAccessError {
    /// The base URL handed to the constructor did not parse
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// Credentials could not be encoded into an Authorization header
    #[error("invalid authorization header: {0}")]
    InvalidAuthHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Request construction or the network exchange itself failed; no HTTP
    /// response was received
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The supplied deadline elapsed before a response was received
    #[error("deadline exceeded before a response was received")]
    DeadlineExceeded,

    /// The server answered with a non-success status
    #[error("Insight API returned {}", .0.status)]
    Api(Box<ErrorResponse>),
}

impl ObjectAccessError {
    /// The HTTP status of the failed exchange, when one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ObjectAccessError::Api(response) => Some(response.status),
            ObjectAccessError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// A non-2xx HTTP response, preserved in full so callers can branch on the
/// status code or inspect the server-supplied error body.
#[derive(Debug)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Raw response body text
    pub body: String,
    /// The body decoded as a Jira-style error payload, when it is one
    pub error: Option<ApiErrorBody>,
}

/// Jira-style error body: a list of general messages plus per-field errors
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub error_messages: Vec<String>,
    pub errors: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_body_decodes_jira_shape() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"errorMessages":["Object with id 999 does not exist"],"errors":{}}"#,
        )
        .unwrap();
        assert_eq!(body.error_messages.len(), 1);
        assert!(body.errors.is_empty());
    }

    #[test]
    fn test_api_error_display_carries_status() {
        let err = ObjectAccessError::Api(Box::new(ErrorResponse {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: String::new(),
            error: None,
        }));
        assert!(err.to_string().contains("404"));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }
}
