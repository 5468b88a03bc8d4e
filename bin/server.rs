// Dispensary Finder - Web Server
// REST API with Axum over the read-only reference data

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use dispensary_finder::{
    company_message, dispensary_message, logging, CompanyRecord, DataArgs, DataSummary, Finder,
    LocationRecord, LocationSelection, LookupError, ReferenceData,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "finder-server", version, about = "Dispensary Finder web server")]
struct ServerArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: String,
}

/// Shared application state (read-only, no locking)
#[derive(Clone)]
struct AppState {
    finder: Finder,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ApiError>,
}

/// Error payload: the condition plus the user-facing message
#[derive(Serialize)]
struct ApiError {
    condition: &'static str,
    message: String,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        let body = Self {
            success: true,
            data: Some(data),
            error: None,
        };
        (StatusCode::OK, Json(body)).into_response()
    }

    fn failed(error: &LookupError, message: String) -> Response {
        let status = match error {
            LookupError::NotFound { .. }
            | LookupError::EmptyResult
            | LookupError::AbbreviationNotFound { .. } => StatusCode::NOT_FOUND,
            LookupError::UnsupportedSchema { .. } => StatusCode::BAD_REQUEST,
            LookupError::InvalidPattern { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Self {
            success: false,
            data: None,
            error: Some(ApiError {
                condition: error.code(),
                message,
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Health response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    data: DataSummary,
}

/// Dispensary query string: exactly one of city / state, optional name
#[derive(Debug, Default, Deserialize)]
struct DispensaryQuery {
    city: Option<String>,
    state: Option<String>,
    name: Option<String>,
}

impl DispensaryQuery {
    fn selection(&self) -> Option<LocationSelection> {
        match (&self.city, &self.state) {
            (Some(city), _) => Some(LocationSelection::City(city.clone())),
            (None, Some(state)) => Some(LocationSelection::State(state.clone())),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CompanyQuery {
    state: Option<String>,
    #[serde(default)]
    name: String,
}

/// Dispensary row (simplified for API)
#[derive(Serialize)]
struct DispensaryResponse {
    name: String,
    address: String,
    phone_number: String,
}

/// Company row (the columns the company page shows)
#[derive(Serialize)]
struct CompanyResponse {
    legal_name: Option<String>,
    emails: String,
    phone: String,
}

impl From<LocationRecord> for DispensaryResponse {
    fn from(record: LocationRecord) -> Self {
        Self {
            name: record.name,
            address: record.address,
            phone_number: record.phone_number,
        }
    }
}

impl From<CompanyRecord> for CompanyResponse {
    fn from(record: CompanyRecord) -> Self {
        Self {
            legal_name: record.legal_name,
            emails: record.emails,
            phone: record.phone,
        }
    }
}

fn missing_selection() -> Response {
    let error = LookupError::unsupported("Location", "city or state query parameter required");
    ApiResponse::<()>::failed(&error, "No valid filter criteria found.".to_string())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "OK",
        version: dispensary_finder::VERSION,
        data: state.finder.data().summary(),
    })
}

/// GET /api/cities - City selector options
async fn get_cities(State(state): State<AppState>) -> Response {
    ApiResponse::ok(state.finder.cities())
}

/// GET /api/states - State selector labels
async fn get_states(State(state): State<AppState>) -> Response {
    ApiResponse::ok(state.finder.state_labels())
}

/// GET /api/dispensaries?city=|state= - Matching dispensaries sorted by name
async fn get_dispensaries(
    State(state): State<AppState>,
    Query(query): Query<DispensaryQuery>,
) -> Response {
    let Some(selection) = query.selection() else {
        return missing_selection();
    };

    match state.finder.find_dispensaries(&selection) {
        Ok(records) => {
            let response: Vec<DispensaryResponse> = records.into_iter().map(Into::into).collect();
            ApiResponse::ok(response)
        }
        Err(e) => {
            warn!(selection = %selection, condition = e.code(), "dispensary lookup failed");
            ApiResponse::<()>::failed(&e, dispensary_message(&selection, &e))
        }
    }
}

/// GET /api/dispensaries/detail?city=|state=&name= - One dispensary with map link
async fn get_dispensary_detail(
    State(state): State<AppState>,
    Query(query): Query<DispensaryQuery>,
) -> Response {
    let Some(selection) = query.selection() else {
        return missing_selection();
    };
    let name = query.name.clone().unwrap_or_default();

    match state.finder.dispensary_detail(&selection, &name) {
        Ok(detail) => ApiResponse::ok(detail),
        Err(e) => {
            warn!(selection = %selection, name = %name, condition = e.code(), "detail lookup failed");
            ApiResponse::<()>::failed(&e, dispensary_message(&selection, &e))
        }
    }
}

/// GET /api/companies?state=&name= - Company search
async fn get_companies(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Response {
    let state_label = query.state.as_deref().filter(|s| !s.trim().is_empty());

    match state.finder.find_companies(state_label, &query.name) {
        Ok(records) => {
            let response: Vec<CompanyResponse> = records.into_iter().map(Into::into).collect();
            ApiResponse::ok(response)
        }
        Err(e) => ApiResponse::<()>::failed(&e, company_message(state_label, &query.name, &e)),
    }
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn router(state: AppState) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/cities", get(get_cities))
        .route("/states", get(get_states))
        .route("/dispensaries", get(get_dispensaries))
        .route("/dispensaries/detail", get(get_dispensary_detail))
        .route("/companies", get(get_companies))
        .with_state(state);

    // Build main router
    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    logging::init(args.data.verbose);

    let config = args.data.to_config();
    let data = ReferenceData::load(&config)?;
    let state = AppState {
        finder: Finder::new(Arc::new(data)),
    };

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", args.addr))?;

    info!(addr = %args.addr, "server listening");
    println!("🚀 Server running on http://{}", args.addr);
    println!("   API: http://{}/api/dispensaries?state=OH", args.addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use dispensary_finder::LocationReference;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let dispensaries = vec![
            LocationRecord::new("Green Leaf", "1554 N High St, Columbus, OH 43201", "555-0142"),
            LocationRecord::new("Buckeye Relief", "400 Main St, Man, OH 44444", "555-0117"),
            LocationRecord::new("Empire Cannabis", "1 Broadway, Manhattan, NY 10004", "555-0109"),
        ];
        let companies = vec![
            CompanyRecord::new("Acme Corp", "info@acme.com", "555-0201", "1 Main St, Columbus, OH"),
            CompanyRecord::new("ACME INC", "sales@acme.io", "555-0202", "2 Pike St, Seattle, WA"),
        ];
        let data = ReferenceData::new(dispensaries, companies, LocationReference::default());

        router(AppState {
            finder: Finder::new(Arc::new(data)),
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = test_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["data"]["dispensaries"], 3);
    }

    #[tokio::test]
    async fn test_states_labels() {
        let (status, body) = get_json("/api/states").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0], "AB - Alberta");
    }

    #[tokio::test]
    async fn test_dispensaries_by_city_whole_word() {
        let (status, body) = get_json("/api/dispensaries?city=Man").await;
        assert_eq!(status, StatusCode::OK);

        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Buckeye Relief");
    }

    #[tokio::test]
    async fn test_dispensaries_by_state_label_sorted() {
        let (status, body) = get_json("/api/dispensaries?state=OH%20-%20Ohio").await;
        assert_eq!(status, StatusCode::OK);

        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Buckeye Relief", "Green Leaf"]);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_found_with_message() {
        let (status, body) = get_json("/api/dispensaries?city=Springfield").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["condition"], "empty_result");
        assert_eq!(body["error"]["message"], "No dispensaries found in Springfield.");
    }

    #[tokio::test]
    async fn test_missing_selection_is_bad_request() {
        let (status, body) = get_json("/api/dispensaries").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["condition"], "unsupported_schema");
    }

    #[tokio::test]
    async fn test_detail_with_map_link() {
        let (status, body) =
            get_json("/api/dispensaries/detail?state=OH&name=Green%20Leaf").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["map_link"],
            "https://www.google.com/maps?q=1554 N High St, Columbus, OH 43201&output=embed"
        );

        let (status, body) =
            get_json("/api/dispensaries/detail?state=OH&name=Empire%20Cannabis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["condition"], "not_found");
    }

    #[tokio::test]
    async fn test_unknown_state() {
        let (status, body) = get_json("/api/dispensaries?state=ZZ").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["condition"], "abbreviation_not_found");
    }

    #[tokio::test]
    async fn test_companies_search() {
        let (status, body) = get_json("/api/companies?state=OH&name=acme").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["legal_name"], "Acme Corp");

        let (status, body) = get_json("/api/companies?name=acme").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, body) = get_json("/api/companies?state=WA&name=zzz").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["error"]["message"],
            "No companies found in WA - Washington matching 'zzz'."
        );
    }
}
