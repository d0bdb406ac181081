//! # REST API for Member Profiles

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};
use serde::Deserialize;

use crate::io::rest::mappers::member_mapper::MemberMapper;
use crate::AppState;
use shared::{MemberListResponse, UpsertMemberRequest};

#[derive(Debug, Deserialize)]
pub struct MemberListParams {
    pub group_id: String,
}

/// List a group's member profiles
pub async fn list_members(
    State(state): State<AppState>,
    Query(params): Query<MemberListParams>,
) -> impl IntoResponse {
    info!("GET /api/members - params: {:?}", params);

    match state.member_service.list_members(&params.group_id).await {
        Ok(members) => {
            let response = MemberListResponse {
                members: members.into_iter().map(MemberMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list members: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing members").into_response()
        }
    }
}

/// Create or update a member profile
pub async fn upsert_member(
    State(state): State<AppState>,
    Json(request): Json<UpsertMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/members - request: {:?}", request);

    let member = MemberMapper::to_domain(request.member);
    match state.member_service.upsert_member(&request.group_id, member).await {
        Ok(member) => (StatusCode::CREATED, Json(MemberMapper::to_dto(member))).into_response(),
        Err(e) => {
            error!("Failed to upsert member: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error storing member").into_response()
        }
    }
}
