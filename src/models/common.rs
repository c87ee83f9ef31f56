use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 失败响应体中的 error 字段
/// `{"success": false, "error": {"code": "...", "message": "..."}}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    pub message: String,
}
