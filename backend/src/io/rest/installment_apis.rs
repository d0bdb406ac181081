//! # REST API for Installments
//!
//! Endpoints for listing installment records and marking them paid.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};
use serde::Deserialize;

use crate::domain::commands::installments::{InstallmentListQuery, MarkInstallmentPaidCommand};
use crate::io::rest::mappers::installment_mapper::InstallmentMapper;
use crate::io::rest::month_ref_from_params;
use crate::AppState;
use shared::{InstallmentListResponse, MarkInstallmentPaidRequest, MarkInstallmentPaidResponse};

// Query parameters for the installment listing API. month and year must be
// provided together to filter by due month.
#[derive(Debug, Deserialize)]
pub struct InstallmentListParams {
    pub group_id: String,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// List a group's installment records, optionally only those due in a month
pub async fn list_installments(
    State(state): State<AppState>,
    Query(params): Query<InstallmentListParams>,
) -> impl IntoResponse {
    info!("GET /api/installments - params: {:?}", params);

    let due = match (params.month, params.year) {
        (Some(month), Some(year)) => match month_ref_from_params(month, year) {
            Ok(month_ref) => Some(month_ref),
            Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
        },
        (None, None) => None,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                "month and year must be provided together".to_string(),
            )
                .into_response()
        }
    };

    let query = InstallmentListQuery { group_id: params.group_id, due };

    match state.installment_service.list_installments(query).await {
        Ok(installments) => {
            let response = InstallmentListResponse {
                installments: installments.into_iter().map(InstallmentMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list installments: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing installments").into_response()
        }
    }
}

/// Mark one installment as paid
pub async fn mark_installment_paid(
    State(state): State<AppState>,
    Json(request): Json<MarkInstallmentPaidRequest>,
) -> impl IntoResponse {
    info!("POST /api/installments/pay - request: {:?}", request);

    let command = MarkInstallmentPaidCommand {
        group_id: request.group_id,
        installment_id: request.installment_id,
    };

    match state.installment_service.mark_paid(command).await {
        Ok(installment) => {
            let response = MarkInstallmentPaidResponse {
                success_message: format!(
                    "Installment {}/{} marked as paid",
                    installment.installment_number, installment.total_installments
                ),
                installment: InstallmentMapper::to_dto(installment),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to mark installment paid: {}", e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;

    #[tokio::test]
    async fn test_list_installments_empty_group() {
        let (state, _dir) = test_state();
        let response = list_installments(
            State(state),
            Query(InstallmentListParams {
                group_id: "group-1".to_string(),
                month: None,
                year: None,
            }),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_installments_rejects_half_filter() {
        let (state, _dir) = test_state();
        let response = list_installments(
            State(state),
            Query(InstallmentListParams {
                group_id: "group-1".to_string(),
                month: Some(6),
                year: None,
            }),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_mark_paid_unknown_installment_is_not_found() {
        let (state, _dir) = test_state();
        let response = mark_installment_paid(
            State(state),
            Json(MarkInstallmentPaidRequest {
                group_id: "group-1".to_string(),
                installment_id: "inst-9-9".to_string(),
            }),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }
}
