//! # REST API for the Monthly Summary

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{Datelike, Local};
use log::{error, info};
use serde::Deserialize;

use crate::domain::commands::summary::MonthlySummaryQuery;
use crate::io::rest::mappers::summary_mapper::SummaryMapper;
use crate::io::rest::month_ref_from_params;
use crate::AppState;

// Query parameters for the monthly summary API. The month defaults to the
// current one; the aggregation itself always receives it explicitly.
#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub group_id: String,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Compute the financial summary for one month of a group's records
pub async fn get_monthly_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> impl IntoResponse {
    info!("GET /api/summary/month - params: {:?}", params);

    let now = Local::now();
    let month = params.month.unwrap_or(now.month());
    let year = params.year.unwrap_or(now.year());
    let month = match month_ref_from_params(month, year) {
        Ok(month_ref) => month_ref,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let query = MonthlySummaryQuery { group_id: params.group_id, month };

    match state.summary_service.monthly_summary(query).await {
        Ok(summary) => (StatusCode::OK, Json(SummaryMapper::to_dto(&summary))).into_response(),
        Err(e) => {
            error!("Failed to compute monthly summary: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error computing summary").into_response()
        }
    }
}
