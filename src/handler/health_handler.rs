use crate::response::api_response::ApiSuccessResponse;
use axum::Json;

pub async fn health() -> Json<ApiSuccessResponse<()>> {
    Json(ApiSuccessResponse::from_with_nodata())
}
