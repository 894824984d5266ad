//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::server::AppState;
use crate::cli::{build_selection, resolve_today};
use crate::core::charts::ChartId;
use crate::core::dashboard::{Dashboard, FleetView};
use crate::core::selection::{self, Selection};
use crate::core::sheets::FleetWorkbook;
use crate::error::{FleetError, FleetResult};
use crate::excel::ReportExporter;
use crate::render::{render_svg, ChartStyle};
use crate::types::SheetStats;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// HTTP status for a failed request
pub fn status_for(error: &FleetError) -> StatusCode {
    match error {
        FleetError::UnknownFile(_) | FleetError::UnknownVehicle(_) | FleetError::UnknownChart(_) => {
            StatusCode::NOT_FOUND
        }
        FleetError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        FleetError::Workbook(_)
        | FleetError::MissingSheet(_)
        | FleetError::NoVehicles
        | FleetError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FleetError::Io(_)
        | FleetError::Export(_)
        | FleetError::Chart(_)
        | FleetError::Task(_)
        | FleetError::Json(_)
        | FleetError::Yaml(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(error: FleetError) -> Response {
    tracing::warn!(%error, "request failed");
    (
        status_for(&error),
        Json(ApiResponse::<()>::err(error.to_string())),
    )
        .into_response()
}

/// Parsing, export and rendering run on the blocking pool
async fn blocking<T, F>(work: F) -> FleetResult<T>
where
    F: FnOnce() -> FleetResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| FleetError::Task(e.to_string()))?
}

fn respond<T: Serialize>(result: FleetResult<T>) -> Response {
    match result {
        Ok(data) => Json(ApiResponse::ok(data)).into_response(),
        Err(e) => failure(e),
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(method: &str, path: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Fleet Dashboard API Server".to_string(),
        version: state.version.clone(),
        description: "Vehicle fleet costs, alerts and reports from an Excel workbook".to_string(),
        endpoints: vec![
            endpoint("GET", "/health", "Health check endpoint"),
            endpoint("GET", "/version", "Get server version"),
            endpoint("POST", "/api/v1/upload", "Upload a fleet workbook (.xlsx body)"),
            endpoint("POST", "/api/v1/sheets", "Sheet row counts of a workbook"),
            endpoint("POST", "/api/v1/vehicles", "Directions and vehicle choices"),
            endpoint("POST", "/api/v1/dashboard", "KPIs, alerts and tabs of one vehicle"),
            endpoint("POST", "/api/v1/report", "Excel report of one vehicle"),
            endpoint("POST", "/api/v1/chart", "One dashboard chart as SVG"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cached_workbooks: usize,
}

/// GET /health - Health check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        cached_workbooks: state.cached_count(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: ["upload", "sheets", "vehicles", "dashboard", "report", "chart"]
            .iter()
            .map(|f| f.to_string())
            .collect(),
    }))
}

/// Which workbook and which slice of it a request is about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetRequest {
    /// Workbook on the server's filesystem
    pub file_path: Option<String>,
    /// Hash returned by `/api/v1/upload`
    pub file_id: Option<String>,
    pub vehicle: Option<String>,
    #[serde(default)]
    pub directions: Vec<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub today: Option<NaiveDate>,
}

impl FleetRequest {
    fn workbook(&self, state: &AppState) -> FleetResult<Arc<FleetWorkbook>> {
        match (&self.file_id, &self.file_path) {
            (Some(id), _) => state.cached(id),
            (None, Some(path)) => state.load_path(&PathBuf::from(path)),
            (None, None) => Err(FleetError::Validation(
                "either file_id or file_path is required".to_string(),
            )),
        }
    }

    fn selection(&self) -> FleetResult<Selection> {
        build_selection(
            self.vehicle.clone(),
            self.directions.clone(),
            self.from,
            self.to,
        )
    }

    fn today(&self) -> NaiveDate {
        resolve_today(self.today)
    }
}

/// Upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub sheets: Vec<SheetStats>,
}

/// POST /api/v1/upload - Parse and cache a workbook
pub async fn upload(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let result = blocking(move || {
        state.load_bytes(&body).map(|workbook| UploadResponse {
            file_id: workbook.hash().to_string(),
            sheets: workbook.stats(),
        })
    })
    .await;
    respond(result)
}

/// Sheets response
#[derive(Serialize)]
pub struct SheetsResponse {
    pub file_id: String,
    pub sheets: Vec<SheetStats>,
}

/// POST /api/v1/sheets - Sheet row counts
pub async fn sheets(State(state): State<Arc<AppState>>, Json(req): Json<FleetRequest>) -> Response {
    let result = blocking(move || {
        req.workbook(&state).map(|workbook| SheetsResponse {
            file_id: workbook.hash().to_string(),
            sheets: workbook.stats(),
        })
    })
    .await;
    respond(result)
}

/// Vehicles response
#[derive(Serialize)]
pub struct VehiclesResponse {
    pub directions: Vec<String>,
    pub vehicles: Vec<String>,
}

/// POST /api/v1/vehicles - Directions and vehicle choices
pub async fn vehicles(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FleetRequest>,
) -> Response {
    respond(blocking(move || list_vehicles(&state, &req)).await)
}

fn list_vehicles(state: &AppState, req: &FleetRequest) -> FleetResult<VehiclesResponse> {
    let workbook = req.workbook(state)?;
    let filtered = selection::filtered_vehicles(&workbook, &req.selection()?)?;
    Ok(VehiclesResponse {
        directions: selection::directions(&workbook),
        vehicles: selection::vehicle_choices(&filtered),
    })
}

/// POST /api/v1/dashboard - The whole dashboard of one vehicle
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FleetRequest>,
) -> Response {
    respond(blocking(move || build_dashboard(&state, &req)).await)
}

fn build_dashboard(state: &AppState, req: &FleetRequest) -> FleetResult<Dashboard> {
    let workbook = req.workbook(state)?;
    Dashboard::build(&workbook, &req.selection()?, req.today())
}

/// Report request
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(flatten)]
    pub fleet: FleetRequest,
    /// Write the report here instead of returning it
    pub output_path: Option<String>,
}

/// Report response, when written to disk
#[derive(Serialize)]
pub struct ReportResponse {
    pub vehicle: String,
    pub file_name: String,
    pub output_path: String,
}

/// POST /api/v1/report - Excel report download
pub async fn report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> Response {
    blocking(move || write_report(&state, &req))
        .await
        .unwrap_or_else(failure)
}

fn write_report(state: &AppState, req: &ReportRequest) -> FleetResult<Response> {
    let workbook = req.fleet.workbook(state)?;
    let view = FleetView::new(&workbook, req.fleet.selection()?, req.fleet.today())?;
    let exporter = ReportExporter::new(&view);
    let file_name = exporter.file_name()?;

    match &req.output_path {
        Some(path) => {
            exporter.export(&PathBuf::from(path))?;
            Ok(Json(ApiResponse::ok(ReportResponse {
                vehicle: view.scope.plate.clone(),
                file_name,
                output_path: path.clone(),
            }))
            .into_response())
        }
        None => {
            let bytes = exporter.to_buffer()?;
            let headers = [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file_name),
                ),
            ];
            Ok((headers, bytes).into_response())
        }
    }
}

/// Chart request
#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    #[serde(flatten)]
    pub fleet: FleetRequest,
    pub chart: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default = "default_labels")]
    pub labels: bool,
}

fn default_labels() -> bool {
    true
}

/// POST /api/v1/chart - One chart as SVG
pub async fn chart(State(state): State<Arc<AppState>>, Json(req): Json<ChartRequest>) -> Response {
    match blocking(move || render_chart(&state, &req)).await {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => failure(e),
    }
}

fn render_chart(state: &AppState, req: &ChartRequest) -> FleetResult<String> {
    let id: ChartId = req.chart.parse()?;
    let workbook = req.fleet.workbook(state)?;
    let view = FleetView::new(&workbook, req.fleet.selection()?, req.fleet.today())?;
    let spec = view.require_chart(id)?;
    let defaults = ChartStyle::default();
    render_svg(
        &spec,
        &ChartStyle {
            width: req.width.unwrap_or(defaults.width),
            height: req.height.unwrap_or(defaults.height),
            labels: req.labels,
        },
    )
}
