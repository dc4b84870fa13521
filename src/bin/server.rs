use std::collections::HashMap;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use cutplan::error::{Error, Result};
use cutplan::orchestrator::{AvailabilityChecker, FabricationPolicy, Orchestrator, RollInventory};
use cutplan::types::{
    FabricKey, InventoryRequirement, ItemAvailability, OptimizationResult, OrderLine,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    lines: Vec<OrderLine>,
    #[serde(default)]
    policy: FabricationPolicy,
    /// Roll length on hand per fabric key ("material/type/colour"), mm.
    #[serde(default)]
    roll_lengths: HashMap<String, u32>,
    /// Stock on hand per requirement key: mm for fabric, pieces for bars.
    #[serde(default)]
    stock_levels: HashMap<String, u64>,
}

/// Roll lookup backed by the lengths supplied in the request body.
struct RequestRolls(HashMap<String, u32>);

impl RollInventory for RequestRolls {
    async fn roll_length(&self, fabric: &FabricKey) -> Result<u32> {
        self.0
            .get(&fabric.to_string())
            .copied()
            .ok_or_else(|| Error::MissingRoll(fabric.to_string()))
    }
}

/// Availability check against the stock levels supplied in the request body.
struct RequestStock(HashMap<String, u64>);

impl AvailabilityChecker for RequestStock {
    async fn check(&self, requirements: &[InventoryRequirement]) -> Vec<ItemAvailability> {
        requirements
            .iter()
            .map(|r| ItemAvailability {
                category: r.category,
                item_key: r.item_key.clone(),
                quantity_needed: r.quantity_needed,
                sufficient: self.0.get(&r.item_key).copied().unwrap_or(0) >= r.quantity_needed,
            })
            .collect()
    }
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> std::result::Result<Json<OptimizationResult>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    if req.lines.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "order has no line items".to_string(),
        ));
    }
    for (i, line) in req.lines.iter().enumerate() {
        if line.width == 0 || line.drop == 0 {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("line {i}: width and drop must be non-zero"),
            ));
        }
        if line.quantity == 0 {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("line {i}: quantity must be non-zero"),
            ));
        }
    }

    let orchestrator = Orchestrator::new(
        RequestRolls(req.roll_lengths),
        RequestStock(req.stock_levels),
        req.policy,
    );
    let result = orchestrator.optimize(&req.lines).await.map_err(|e| match e {
        Error::MissingRoll(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        _ => (StatusCode::BAD_REQUEST, e.to_string()),
    })?;

    Ok(Json(result))
}

#[tokio::main]
async fn main() {
    let _sentry = sentry::init(sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
