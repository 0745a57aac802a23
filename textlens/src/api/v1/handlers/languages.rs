use axum::extract::State;

use crate::api::state::AppState;
use crate::api::v1::dto::LanguagesResponse;
use crate::api::v1::response::ApiResponse;

/// `GET /api/v1/languages`
#[utoipa::path(
    get,
    path = "/api/v1/languages",
    tag = "languages",
    operation_id = "languages.list",
    responses(
        (status = 200, description = "Supported OCR and translation languages", body = LanguagesResponse),
    )
)]
pub async fn list_languages(State(state): State<AppState>) -> ApiResponse<LanguagesResponse> {
    ApiResponse::success(LanguagesResponse::new(state.default_language()))
}
