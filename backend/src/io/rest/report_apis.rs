//! # REST API for Reports

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};
use serde::Deserialize;

use crate::domain::commands::reports::{ExportReportCommand, ReportQuery};
use crate::io::rest::mappers::report_mapper::ReportMapper;
use crate::io::rest::month_ref_from_params;
use crate::AppState;
use shared::{ExportReportRequest, ExportReportResponse, ReportResponse};

// Query parameters for report generation. kind defaults to the full report.
#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub group_id: String,
    pub kind: Option<String>,
    pub month: u32,
    pub year: i32,
}

/// Generate a plain-text report for one month of a group's records
pub async fn get_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> impl IntoResponse {
    info!("GET /api/reports - params: {:?}", params);

    let kind = match ReportMapper::parse_kind(params.kind.as_deref().unwrap_or("full")) {
        Ok(kind) => kind,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let month = match month_ref_from_params(params.month, params.year) {
        Ok(month_ref) => month_ref,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let query = ReportQuery { group_id: params.group_id, kind, month };

    match state
        .report_service
        .generate_report(query, &state.summary_service)
        .await
    {
        Ok(result) => {
            let response = ReportResponse {
                report_text: result.report_text,
                filename: result.filename,
                kind: ReportMapper::kind_to_dto(result.kind),
                month: result.month.month,
                year: result.month.year,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to generate report: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error generating report").into_response()
        }
    }
}

/// Generate a report and write it to disk
pub async fn export_report(
    State(state): State<AppState>,
    Json(request): Json<ExportReportRequest>,
) -> impl IntoResponse {
    info!("POST /api/reports/export - request: {:?}", request);

    let month = match month_ref_from_params(request.month, request.year) {
        Ok(month_ref) => month_ref,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let command = ExportReportCommand {
        group_id: request.group_id,
        kind: ReportMapper::kind_to_domain(request.kind),
        month,
        custom_path: request.custom_path,
    };

    match state
        .report_service
        .export_to_path(command, &state.summary_service)
        .await
    {
        Ok(result) => {
            let response = ExportReportResponse {
                success: result.success,
                message: result.message,
                file_path: result.file_path,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to export report: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error exporting report").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;

    #[tokio::test]
    async fn test_get_report_defaults_to_full() {
        let (state, _dir) = test_state();
        let response = get_report(
            State(state),
            Query(ReportParams {
                group_id: "group-1".to_string(),
                kind: None,
                month: 6,
                year: 2025,
            }),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_report_rejects_unknown_kind() {
        let (state, _dir) = test_state();
        let response = get_report(
            State(state),
            Query(ReportParams {
                group_id: "group-1".to_string(),
                kind: Some("weekly".to_string()),
                month: 6,
                year: 2025,
            }),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
