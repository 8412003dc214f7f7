//! Example consumer: declares a `Widget`, then creates, updates and deletes one remotely.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Point it at a backend with `WIDGETS_URL` (default `http://127.0.0.1:8000/widgets/`);
//! other settings come from `ROA_SETTINGS_PATH`, `ROA_FORMAT` and `ROA_SSL_CA`.

use roa_sdk::{
    load_settings, set_headers, with_request_context, EntityDeclaration, EntityInstance, FieldDescriptor,
    PersistenceService, ReqwestTransport, RoaState, SaveOptions, Session,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("roa_sdk=debug,example_consumer=info")),
        )
        .init();

    let settings = load_settings().await?;
    let state = RoaState::new(Arc::new(ReqwestTransport::new()?), settings);

    let widgets_url =
        std::env::var("WIDGETS_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/widgets/".into());
    let widget = state
        .build(
            &EntityDeclaration::new("app", "Widget")
                .field(FieldDescriptor::text("name"))
                .list_url(widgets_url),
        )?
        .entity()
        .ok_or("Widget did not build as an entity")?;
    tracing::info!("declared {}", widget.description());

    with_request_context(async {
        let mut session = Session::new();
        if let Ok(token) = std::env::var("ROA_TOKEN") {
            set_headers(
                &mut session,
                Some(HashMap::from([("Authorization".to_string(), format!("Token {}", token))])),
            )?;
        }

        let mut w = EntityInstance::new(&widget)?.with("name", json!("a"));
        PersistenceService::save(&state, &mut w, SaveOptions::default()).await?;
        tracing::info!("created {}", w);

        w.set("name", json!("b"));
        PersistenceService::save(&state, &mut w, SaveOptions::force_update()).await?;
        tracing::info!("updated {}", w);

        PersistenceService::delete(&state, &mut w).await?;
        tracing::info!("after delete: {}", w);
        Ok::<_, roa_sdk::RoaError>(())
    })
    .await?;
    Ok(())
}
