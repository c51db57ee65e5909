use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rand::rngs::StdRng;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::{status_for, ApiRunRequest, ApiRunResponse};
use engagement_sim::{store::JsonStore, EngagementEngine};

#[derive(Clone)]
struct AppState {
    engine: Arc<EngagementEngine<JsonStore>>,
    // One run at a time; also keeps draws from the seeded stream in order.
    rng: Arc<Mutex<StdRng>>,
}

pub async fn serve(
    args: crate::ServeArgs,
    engine: EngagementEngine<JsonStore>,
) -> Result<(), String> {
    let rng = engine.make_rng();
    let state = AppState {
        engine: Arc::new(engine),
        rng: Arc::new(Mutex::new(rng)),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/engagement/run", post(run_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!(%addr, "engagement server listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn run_handler(
    State(state): State<AppState>,
    payload: Result<Json<ApiRunRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiRunResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiRunResponse::failure(rejection.body_text())),
            )
        }
    };
    let verbose = request.verbose.unwrap_or(false);
    let request = match request.into_request() {
        Ok(request) => request,
        Err(err) => return (StatusCode::BAD_REQUEST, Json(ApiRunResponse::failure(err))),
    };

    let mut rng = state.rng.lock().await;
    match state.engine.run(&request, Utc::now(), &mut *rng).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ApiRunResponse::from_report(report, verbose)),
        ),
        Err(err) => {
            error!(error = %err, "engagement run failed");
            (status_for(&err), Json(ApiRunResponse::failure(err.to_string())))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
