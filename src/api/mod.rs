use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::{info, warn};
use serde::Serialize;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::key_resolver::Registry;
use crate::models::{ChargeTransparencyRecord, ChargingSession};
use crate::session::SessionAggregator;

/// Shared, read only state of all workers
pub struct AppState {
    pub registry: Registry,
    pub started: Instant,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        return AppState {
            registry: Registry::from_config(config),
            started: Instant::now(),
        };
    }

    fn aggregator(&self) -> SessionAggregator<'_> {
        return SessionAggregator::new(&self.registry);
    }
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub meters: usize,
    pub evses: usize,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

#[derive(Serialize, ToSchema)]
pub struct MeterSummary {
    pub id: String,
    pub vendor: Option<String>,
    pub model: Option<String>,
    /// Curve names of the registered keys, empty when the key carries its own OID
    pub key_algorithms: Vec<String>,
}

#[utoipa::path(get,
    path = "/health",
    summary = "Health check endpoint for container monitoring",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
)]
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        meters: state.registry.meters().len(),
        evses: state.registry.evses().len(),
        uptime_seconds: state.started.elapsed().as_secs(),
        timestamp,
    })
}

#[utoipa::path(get,
    path = "/api/v1/meters",
    summary = "List the energy meters known to the key registry",
    responses(
        (status = 200, description = "All registered meters", body = [MeterSummary])
    ),
)]
async fn get_meters(state: web::Data<AppState>) -> impl Responder {
    let meters: Vec<MeterSummary> = state.registry.meters().iter().map(|m| MeterSummary {
        id: m.id.clone(),
        vendor: m.vendor.clone(),
        model: m.model.clone(),
        key_algorithms: m.public_keys.iter().map(|k| k.algorithm.clone()).collect(),
    }).collect();
    HttpResponse::Ok().content_type("application/json").json(meters)
}

#[utoipa::path(post,
    path = "/api/v1/verify/session",
    summary = "Verify all signatures of a single charging session",
    responses(
        (status = 200, description = "Verification result, the status tells whether the session is valid"),
        (status = 400, description = "The body is not a charging session")
    ),
)]
async fn verify_session(state: web::Data<AppState>, session: web::Json<ChargingSession>) -> impl Responder {
    info!("Verifying session {:?}", session.id);
    let result = state.aggregator().verify_charging_session(&session);
    HttpResponse::Ok().json(result)
}

#[utoipa::path(post,
    path = "/api/v1/verify/ctr",
    summary = "Verify all charging sessions of a charge transparency record",
    responses(
        (status = 200, description = "Verification result per session and overall"),
        (status = 400, description = "The body is not a charge transparency record")
    ),
)]
async fn verify_ctr(state: web::Data<AppState>, ctr: web::Json<ChargeTransparencyRecord>) -> impl Responder {
    info!("Verifying CTR with {} sessions", ctr.charging_sessions.len());
    let result = state.aggregator().verify_ctr(&ctr);
    HttpResponse::Ok().json(result)
}

#[derive(OpenApi)]
#[openapi(
    info(description = "chargecheck API description"),
    paths(
            health_check,
            get_meters,
            verify_session,
            verify_ctr,
    )
)]
struct ApiDoc;

/// Register all routes, used by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/api/v1/meters", web::get().to(get_meters))
        .route("/api/v1/verify/session", web::post().to(verify_session))
        .route("/api/v1/verify/ctr", web::post().to(verify_ctr));
}

pub struct ApiManager {
    state: web::Data<AppState>,
    port: u16,
    enabled: bool,
}

impl ApiManager {
    pub fn new(config: &Config) -> Self {
        return ApiManager {
            state: web::Data::new(AppState::from_config(config)),
            port: config.httpd.port,
            enabled: config.httpd.enabled,
        };
    }

    pub async fn start_thread(&self) -> std::io::Result<()> {
        if !self.enabled {
            warn!("Webserver is disabled in the config, nothing to serve");
            return Ok(());
        }

        let state = self.state.clone();
        info!("Serving API on port {}", self.port);
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .configure(configure)
                .service(
                    SwaggerUi::new("/swagger-ui/{_:.*}")
                        .url("/api/v1/openapi.json", ApiDoc::openapi()),
                )
        })
        .bind(format!("0.0.0.0:{}", self.port))?
        .run()
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::Value;

    use crate::crypto_methods::tests::{emh_session, registry};
    use crate::models::CTR_CONTEXT;

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState { registry: registry(), started: Instant::now() })
    }

    #[actix_rt::test]
    async fn test_health_and_meters() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["meters"], 2);
        assert_eq!(body["evses"], 3);

        let req = test::TestRequest::get().uri("/api/v1/meters").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["id"], "0901454D4800007F9F3E");
        assert_eq!(body[0]["key_algorithms"][0], "secp192r1");
    }

    #[actix_rt::test]
    async fn test_verify_session() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post().uri("/api/v1/verify/session").set_json(emh_session()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ValidSignature");
        assert_eq!(body["measurements"][0][2]["status"], "ValidStopValue");

        let req = test::TestRequest::post().uri("/api/v1/verify/session")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"measurements\": 5}")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }

    #[actix_rt::test]
    async fn test_verify_ctr() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let ctr = ChargeTransparencyRecord { context: CTR_CONTEXT.to_string(), charging_sessions: vec![emh_session()] };
        let req = test::TestRequest::post().uri("/api/v1/verify/ctr").set_json(&ctr).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ValidSignature");
        assert_eq!(body["sessions"].as_array().map(|s| s.len()), Some(1));

        let ctr = ChargeTransparencyRecord { context: "urn:unknown".to_string(), charging_sessions: vec![] };
        let req = test::TestRequest::post().uri("/api/v1/verify/ctr").set_json(&ctr).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "UnknownCTRFormat");
    }
}
