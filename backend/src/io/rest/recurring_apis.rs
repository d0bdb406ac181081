//! # REST API for Recurring Expenses

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use crate::domain::commands::recurring::MaterializeRecurringCommand;
use crate::io::rest::month_ref_from_params;
use crate::AppState;
use shared::{MaterializeRecurringRequest, MaterializeRecurringResponse};

/// Issue the month's pending recurring expenses
pub async fn materialize_recurring(
    State(state): State<AppState>,
    Json(request): Json<MaterializeRecurringRequest>,
) -> impl IntoResponse {
    info!("POST /api/recurring/materialize - request: {:?}", request);

    let month = match month_ref_from_params(request.month, request.year) {
        Ok(month_ref) => month_ref,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let command = MaterializeRecurringCommand { group_id: request.group_id, month };

    match state
        .recurring_service
        .materialize_recurring(command, &state.transaction_service)
        .await
    {
        Ok(result) => {
            let response = MaterializeRecurringResponse {
                created_count: result.created_count,
                success_message: result.success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to materialize recurring expenses: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error materializing recurring expenses")
                .into_response()
        }
    }
}
