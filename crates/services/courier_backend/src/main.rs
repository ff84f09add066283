use axum::{routing::get, Router};
use courier_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod app_state;
use app_state::AppState;

#[tokio::main]
async fn main() {
    courier_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let state = AppState::build(config.clone())
        .await
        .expect("Failed to build application state");

    let messages_router = courier_messages::routes(state.messages.clone());
    let push_router = courier_push::routes(
        state.subscriptions.clone(),
        state.auth.clone(),
        state.vapid_public_key.clone(),
    );
    let realtime_router = courier_realtime::routes(
        state.registry.clone(),
        state.relay.clone(),
        state.auth.clone(),
    );

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Courier API!" }))
        .merge(messages_router)
        .merge(push_router)
        .merge(realtime_router);

    #[allow(unused_mut)] // for the openapi feature it needs to be mutable
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use courier_messages::doc::MessagesApiDoc;
        use courier_push::doc::PushApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        // Define the merged OpenAPI documentation struct
        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Courier API",
                version = "0.1.0",
                description = "Direct-messaging service API docs",
            ),
            components(),
            tags( (name = "Courier", description = "Direct-messaging endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(MessagesApiDoc::openapi());
        openapi_doc.merge(PushApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
