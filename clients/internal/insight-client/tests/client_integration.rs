// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Integration tests for insight-client using insight-stub-server
//!
//! These tests spin up the Insight stub server in-process and drive the
//! typed client against it, verifying on-the-wire request shape (via the
//! stub's request recording) as well as response decoding and error
//! mapping.

use std::sync::Arc;
use std::time::Duration;

use insight_client::{
    Attribute, FindObjectPayload, GetObjectQueryOptions, InsightClient, ObjectAccessError,
    ObjectAttributeValue, UpdateObjectPayload,
};
use insight_stub_server::StubContext;

/// Install a rustls crypto provider for the test process. Idempotent across
/// the many tests that call it; only the first call wins.
fn install_crypto_provider() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Start the stub Insight server on an ephemeral port and return the
/// running server, its context (for request-recording assertions), and a
/// client pointed at it.
async fn start_stub() -> (
    dropshot::HttpServer<Arc<StubContext>>,
    Arc<StubContext>,
    InsightClient,
) {
    // reqwest is built with `rustls-no-provider`; install a provider for the
    // test process before any Client is constructed.
    install_crypto_provider();

    let fixtures_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../services/insight-stub-server/fixtures");

    let context = Arc::new(StubContext::from_fixtures(&fixtures_dir).unwrap());

    let api = insight_stub_server::api_description().expect("insight api description");

    let config = dropshot::ConfigDropshot {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        default_request_body_max_bytes: 1024 * 1024,
        default_handler_task_mode: dropshot::HandlerTaskMode::Detached,
        ..Default::default()
    };

    let log = dropshot::ConfigLogging::StderrTerminal {
        level: dropshot::ConfigLoggingLevel::Warn,
    }
    .to_logger("insight-stub-test")
    .expect("stub logger");

    let server = dropshot::HttpServerStarter::new(&config, api, context.clone(), &log)
        .expect("start insight stub")
        .start();

    let base_url = format!("http://{}", server.local_addr());

    // Give server a moment to be ready
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = InsightClient::new(&base_url).expect("client for stub");
    (server, context, client)
}

#[tokio::test]
async fn test_get_object_round_trip() {
    let (server, context, client) = start_stub().await;

    let object = client
        .get_object(
            "1",
            Some(&GetObjectQueryOptions {
                include_attributes: Some(true),
                include_extended_info: Some(true),
            }),
        )
        .await
        .expect("get object 1");

    assert_eq!(object.id, 1);
    assert_eq!(object.label, "Server-1");
    assert_eq!(object.object_key, "ITSM-1");
    assert_eq!(object.object_type.name, "Server");
    assert_eq!(object.attributes.len(), 2);
    assert!(object.extended_info.expect("extended info").open_issues_exists);

    // The wire request carried exactly the two set flags, once each
    let requests = context.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/rest/insight/1.0/object/1");
    let query = requests[0].query.as_deref().expect("query string");
    assert_eq!(query.matches("includeAttributes=true").count(), 1);
    assert_eq!(query.matches("includeExtendedInfo=true").count(), 1);
    assert_eq!(query.matches('&').count(), 1);

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_get_object_without_options_sends_no_query() {
    let (server, context, client) = start_stub().await;

    let object = client.get_object("1", None).await.expect("get object 1");

    // Server defaults: attributes included, extended info not
    assert!(!object.attributes.is_empty());
    assert!(object.extended_info.is_none());

    let requests = context.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query, None);

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_get_object_can_opt_out_of_attributes() {
    let (server, _context, client) = start_stub().await;

    let object = client
        .get_object(
            "1",
            Some(&GetObjectQueryOptions {
                include_attributes: Some(false),
                include_extended_info: None,
            }),
        )
        .await
        .expect("get object 1");

    assert!(object.attributes.is_empty());

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_get_object_by_key() {
    let (server, _context, client) = start_stub().await;

    let object = client.get_object("ITSM-3", None).await.expect("get by key");
    assert_eq!(object.id, 3);
    assert_eq!(object.label, "Laptop-7");

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_get_object_not_found_maps_to_api_error() {
    let (server, _context, client) = start_stub().await;

    let err = client.get_object("999", None).await.expect_err("missing object");
    match &err {
        ObjectAccessError::Api(response) => {
            assert_eq!(response.status.as_u16(), 404);
            assert!(!response.body.is_empty());
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_update_object_replaces_attributes() {
    let (server, _context, client) = start_stub().await;

    let payload = UpdateObjectPayload {
        object_type_id: None,
        attributes: Some(vec![Attribute {
            object_type_attribute_id: 135,
            object_attribute_values: vec![ObjectAttributeValue {
                value: "Server-2b".to_string(),
                display_value: "Server-2b".to_string(),
                search_value: "server-2b".to_string(),
                referenced_type: false,
            }],
            ..Default::default()
        }]),
    };

    let updated = client.update_object("2", &payload).await.expect("update object 2");
    assert_eq!(updated.id, 2);
    assert_eq!(updated.attributes.len(), 1);
    assert_eq!(updated.attributes[0].object_type_attribute_id, 135);
    assert_eq!(updated.attributes[0].object_attribute_values[0].value, "Server-2b");
    // The stub re-parents the attribute onto the updated object
    assert_eq!(updated.attributes[0].object_id, 2);

    // The change sticks across a subsequent read
    let reread = client.get_object("2", None).await.expect("reread object 2");
    assert_eq!(reread.attributes.len(), 1);
    assert_eq!(reread.attributes[0].object_attribute_values[0].value, "Server-2b");

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_update_object_not_found_maps_to_api_error() {
    let (server, _context, client) = start_stub().await;

    let err = client
        .update_object("999", &UpdateObjectPayload::default())
        .await
        .expect_err("missing object");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_update_object_rejects_non_numeric_type_id() {
    let (server, _context, client) = start_stub().await;

    let payload = UpdateObjectPayload {
        object_type_id: Some("not-a-number".to_string()),
        attributes: None,
    };
    let err = client.update_object("1", &payload).await.expect_err("bad type id");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_find_objects_by_type() {
    let (server, context, client) = start_stub().await;

    let list = client
        .find_objects(&FindObjectPayload {
            ql_query: Some("objectType = Server".to_string()),
            page: Some(1),
            results_per_page: Some(25),
            ..Default::default()
        })
        .await
        .expect("find servers");

    assert_eq!(list.page_number, 1);
    assert_eq!(list.page_object_size, 25);
    assert_eq!(list.total_filter_count, 2);
    assert_eq!(list.page_size, 1);
    assert_eq!(list.object_type_id, 23);
    assert_eq!(list.ql_query, "objectType = Server");
    assert!(list.ql_query_search_result);

    let labels: Vec<&str> = list.object_entries.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Server-1", "Server-2"]);
    // Search results omit attributes unless asked for
    assert!(list.object_entries.iter().all(|o| o.attributes.is_empty()));

    let requests = context.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/rest/insight/1.0/object/navlist/iql");

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_find_objects_pagination_is_echoed() {
    let (server, _context, client) = start_stub().await;

    let list = client
        .find_objects(&FindObjectPayload {
            ql_query: Some("objectType = Server".to_string()),
            page: Some(2),
            results_per_page: Some(1),
            ..Default::default()
        })
        .await
        .expect("find page 2");

    assert_eq!(list.page_number, 2);
    assert_eq!(list.page_size, 2);
    assert_eq!(list.start_index, 1);
    assert_eq!(list.to_index, 2);
    assert_eq!(list.object_entries.len(), 1);
    assert_eq!(list.object_entries[0].label, "Server-2");

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_find_objects_descending_sort() {
    let (server, _context, client) = start_stub().await;

    let list = client
        .find_objects(&FindObjectPayload {
            ql_query: Some("objectType = Server".to_string()),
            asc: Some(0),
            ..Default::default()
        })
        .await
        .expect("find descending");

    assert_eq!(list.order_way, "DESC");
    let labels: Vec<&str> = list.object_entries.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Server-2", "Server-1"]);

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_find_objects_with_attribute_selection() {
    let (server, _context, client) = start_stub().await;

    let list = client
        .find_objects(&FindObjectPayload {
            ql_query: Some("objectType = Server".to_string()),
            include_attributes: Some(true),
            attributes_to_display: Some(insight_client::AttributesToDisplay {
                attributes_to_display_ids: vec![135],
            }),
            ..Default::default()
        })
        .await
        .expect("find with attributes");

    for object in &list.object_entries {
        assert_eq!(object.attributes.len(), 1);
        assert_eq!(object.attributes[0].object_type_attribute_id, 135);
    }

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_find_objects_schema_filter_excludes_everything() {
    let (server, _context, client) = start_stub().await;

    let list = client
        .find_objects(&FindObjectPayload {
            object_schema_id: Some(999),
            ..Default::default()
        })
        .await
        .expect("find in unknown schema");

    assert!(list.object_entries.is_empty());
    assert_eq!(list.total_filter_count, 0);

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_find_objects_rejects_page_zero() {
    let (server, _context, client) = start_stub().await;

    let err = client
        .find_objects(&FindObjectPayload {
            page: Some(0),
            ..Default::default()
        })
        .await
        .expect_err("page 0");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_elapsed_deadline_fails_before_sending() {
    let (server, context, client) = start_stub().await;

    let err = client
        .get_object_with_deadline("1", None, tokio::time::Instant::now())
        .await
        .expect_err("elapsed deadline");
    assert!(matches!(err, ObjectAccessError::DeadlineExceeded));

    // The deadline check fires before the request is dispatched; the stub
    // must never have seen anything.
    assert!(context.recorded_requests().is_empty());

    server.close().await.expect("shutdown stub");
}

#[tokio::test]
async fn test_future_deadline_lets_the_call_through() {
    let (server, _context, client) = start_stub().await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let object = client
        .get_object_with_deadline("1", None, deadline)
        .await
        .expect("get with generous deadline");
    assert_eq!(object.id, 1);

    let list = client
        .find_objects_with_deadline(&FindObjectPayload::default(), deadline)
        .await
        .expect("find with generous deadline");
    assert_eq!(list.total_filter_count, 3);

    server.close().await.expect("shutdown stub");
}
