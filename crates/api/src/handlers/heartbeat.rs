use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use heartbeat_core::{
    models::parse_beat_time, DeviceRecord, HeartbeatChanges, HeartbeatError, HeartbeatRecord,
    HeartbeatSubmission,
};

use crate::{error::ApiResult, routes::AppState};

/// 心跳上报请求
#[derive(Debug, Deserialize)]
pub struct SubmitHeartbeatRequest {
    pub ip_address: String,
    pub mac_address: String,
    pub sn: String,
    /// ISO-8601时间字符串，接受尾部Z
    pub beat_time: String,
}

/// 心跳上报响应：已注册设备返回投影，未注册设备返回确认
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SubmitHeartbeatResponse {
    Device(DeviceRecord),
    Unregistered { message: String, mac_address: String },
}

/// 心跳记录更新请求，所有字段可选
#[derive(Debug, Deserialize)]
pub struct UpdateHeartbeatRequest {
    pub ip_address: Option<String>,
    pub sn: Option<String>,
    pub beat_time: Option<String>,
}

/// 更新响应，列出实际被更新的字段
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub updated_fields: Vec<String>,
    pub message: String,
}

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListQueryParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// 创建或更新心跳记录
///
/// 按MAC地址判断记录是否存在：不存在则创建，存在则只刷新
/// beat_time。心跳先于设备注册到达时仍然记录，响应为未注册确认。
pub async fn submit_heartbeat(
    State(state): State<AppState>,
    Json(request): Json<SubmitHeartbeatRequest>,
) -> ApiResult<Json<SubmitHeartbeatResponse>> {
    let beat_time = parse_beat_time(&request.beat_time)?;

    let submission = HeartbeatSubmission {
        ip_address: request.ip_address,
        mac_address: request.mac_address,
        sn: request.sn,
        beat_time,
    };

    let outcome = state.heartbeat_repo.record_beat(&submission).await?;

    let response = match outcome.device {
        Some(device) => SubmitHeartbeatResponse::Device(device),
        None => SubmitHeartbeatResponse::Unregistered {
            message: "Heart beat recorded, but device not found in device_map".to_string(),
            mac_address: submission.mac_address,
        },
    };

    Ok(Json(response))
}

/// 根据MAC地址查询心跳记录
pub async fn get_heartbeat(
    State(state): State<AppState>,
    Path(mac_address): Path<String>,
) -> ApiResult<Json<HeartbeatRecord>> {
    let record = state
        .heartbeat_repo
        .get_by_mac(&mac_address)
        .await?
        .ok_or_else(|| HeartbeatError::heartbeat_not_found(&mac_address))?;

    Ok(Json(record))
}

/// 分页列出心跳记录，beat_time倒序
pub async fn list_heartbeats(
    State(state): State<AppState>,
    Query(params): Query<ListQueryParams>,
) -> ApiResult<Json<Vec<HeartbeatRecord>>> {
    let limit = params.limit.unwrap_or(100);
    let offset = params.offset.unwrap_or(0);

    let records = state.heartbeat_repo.list(limit, offset).await?;
    Ok(Json(records))
}

/// 更新心跳记录的部分字段
pub async fn update_heartbeat(
    State(state): State<AppState>,
    Path(mac_address): Path<String>,
    Json(request): Json<UpdateHeartbeatRequest>,
) -> ApiResult<Json<UpdateResponse>> {
    let beat_time = match &request.beat_time {
        Some(value) => Some(parse_beat_time(value)?),
        None => None,
    };

    let changes = HeartbeatChanges {
        ip_address: request.ip_address,
        sn: request.sn,
        beat_time,
    };

    let updated_fields = state
        .heartbeat_repo
        .update_fields(&mac_address, &changes)
        .await?;

    let message = format!("Successfully updated {} field(s)", updated_fields.len());
    Ok(Json(UpdateResponse {
        updated_fields,
        message,
    }))
}

/// 删除心跳记录
pub async fn delete_heartbeat(
    State(state): State<AppState>,
    Path(mac_address): Path<String>,
) -> ApiResult<Json<Value>> {
    state.heartbeat_repo.delete(&mac_address).await?;

    Ok(Json(json!({
        "message": format!("Heart beat record for MAC {mac_address} deleted successfully")
    })))
}
