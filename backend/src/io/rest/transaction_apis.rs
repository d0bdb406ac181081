//! # REST API for Transactions
//!
//! Endpoints for listing, creating and deleting expenses.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};
use serde::Deserialize;

use crate::domain::commands::transactions::{DeleteTransactionsCommand, TransactionListQuery};
use crate::io::rest::mappers::installment_mapper::InstallmentMapper;
use crate::io::rest::mappers::transaction_mapper::TransactionMapper;
use crate::AppState;
use shared::{
    CreateTransactionRequest, CreateTransactionResponse, DeleteTransactionsRequest,
    DeleteTransactionsResponse, PaginationInfo, TransactionListResponse,
};

// Query parameters for the transaction listing API
#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    pub group_id: String,
    pub after: Option<String>,
    pub limit: Option<u32>,
}

/// List a group's transactions with cursor pagination
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<TransactionListParams>,
) -> impl IntoResponse {
    info!("GET /api/transactions - params: {:?}", params);

    let query = TransactionListQuery {
        group_id: params.group_id,
        after: params.after,
        limit: params.limit,
    };

    match state.transaction_service.list_transactions(query).await {
        Ok(result) => {
            let response = TransactionListResponse {
                transactions: result
                    .transactions
                    .into_iter()
                    .map(TransactionMapper::to_dto)
                    .collect(),
                pagination: PaginationInfo {
                    has_more: result.pagination.has_more,
                    next_cursor: result.pagination.next_cursor,
                },
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list transactions: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing transactions").into_response()
        }
    }
}

/// Record a new expense; a split credit purchase also returns its
/// installment plan
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    info!("POST /api/transactions - request: {:?}", request);

    let command = match TransactionMapper::create_command(request) {
        Ok(command) => command,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state.transaction_service.create_transaction(command).await {
        Ok(result) => {
            let response = CreateTransactionResponse {
                transaction: TransactionMapper::to_dto(result.transaction),
                installments: result
                    .installments
                    .into_iter()
                    .map(InstallmentMapper::to_dto)
                    .collect(),
                success_message: "Transaction recorded successfully".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create transaction: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Delete transactions (and, by cascade, their installment plans)
pub async fn delete_transactions(
    State(state): State<AppState>,
    Json(request): Json<DeleteTransactionsRequest>,
) -> impl IntoResponse {
    info!("DELETE /api/transactions - request: {:?}", request);

    let command = DeleteTransactionsCommand {
        group_id: request.group_id,
        transaction_ids: request.transaction_ids,
    };

    match state.transaction_service.delete_transactions(command).await {
        Ok(result) => {
            let response = DeleteTransactionsResponse {
                deleted_count: result.deleted_count,
                success_message: result.success_message,
                not_found_ids: result.not_found_ids,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to delete transactions: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error deleting transactions").into_response()
        }
    }
}
