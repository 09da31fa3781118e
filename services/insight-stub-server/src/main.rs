// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Edgecast Cloud LLC.

//! Standalone stub Insight server for testing and development
//!
//! Run with:
//! ```bash
//! cargo run -p insight-stub-server
//! ```
//!
//! Then point a client at it:
//! ```bash
//! INSIGHT_BASE_URL=http://localhost:9191 ...
//! ```

use anyhow::Result;
use dropshot::{ConfigDropshot, ConfigLogging, ConfigLoggingLevel, HttpServerStarter};
use std::path::PathBuf;
use std::sync::Arc;

use insight_stub_server::{StubContext, api_description};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "insight_stub_server=info,dropshot=info".to_string()),
        ))
        .init();

    // Load fixture data
    let fixtures_dir = std::env::var("INSIGHT_STUB_FIXTURES")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
        });
    let context = Arc::new(StubContext::from_fixtures(&fixtures_dir)?);

    tracing::info!("Loaded {} objects from fixtures", context.object_keys().len());

    // Configure the server
    let bind_address = std::env::var("INSIGHT_STUB_BIND")
        .unwrap_or_else(|_| "127.0.0.1:9191".to_string())
        .parse()?;

    let config = ConfigDropshot {
        bind_address,
        default_request_body_max_bytes: 1024 * 1024,
        default_handler_task_mode: dropshot::HandlerTaskMode::Detached,
        ..Default::default()
    };

    // Create and start the server
    let log = ConfigLogging::StderrTerminal {
        level: ConfigLoggingLevel::Info,
    }
    .to_logger("insight-stub-server")?;

    let api = api_description().map_err(|e| anyhow::anyhow!(e))?;
    let server = HttpServerStarter::new(&config, api, context, &log)
        .map_err(|e| anyhow::anyhow!("Failed to create server: {}", e))?
        .start();

    tracing::info!("Stub Insight server listening on http://{}", bind_address);
    tracing::info!("Available endpoints:");
    tracing::info!("  GET  /rest/insight/1.0/object/{{id}}?includeAttributes=...&includeExtendedInfo=...");
    tracing::info!("  PUT  /rest/insight/1.0/object/{{id}}");
    tracing::info!("  POST /rest/insight/1.0/object/navlist/iql");

    server
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
