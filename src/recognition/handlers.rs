use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    repo::{self, HistoryEntry},
    services::{estimate_nutrition, image_kind, recognize, NutritionEstimate, RecognizedFood},
};
use crate::{
    analytics,
    auth::{current_user, AuthUser},
    error::{AppError, AppResult},
    nutrition::MealSlot,
    state::AppState,
};

/// Room for multipart framing and the `meal_type` field on top of the image.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
const PRESIGN_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Serialize)]
pub struct RecognitionResponse {
    pub success: bool,
    pub log_id: Option<Uuid>,
    pub foods: Vec<RecognizedFood>,
    pub nutrition: NutritionEstimate,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Request body cap for an upload of at most `max_image_size_mb`; the exact
/// image limit is checked per upload.
pub fn body_limit(max_image_size_mb: usize) -> usize {
    max_image_size_mb
        .saturating_mul(1024 * 1024)
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

pub fn routes(max_image_size_mb: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/recognition",
            post(recognize_photo).layer(DefaultBodyLimit::max(body_limit(max_image_size_mb))),
        )
        .route("/recognition/history", get(recognition_history))
}

struct Upload {
    body: Bytes,
    ext: &'static str,
    content_type: &'static str,
}

/// POST /recognition (multipart): `image` file, optional `meal_type`.
#[instrument(skip(state, mp))]
pub async fn recognize_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> AppResult<Json<RecognitionResponse>> {
    current_user(&state, user_id).await?;

    let mut upload: Option<Upload> = None;
    let mut meal_type: Option<MealSlot> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let Some((ext, content_type)) = image_kind(field.content_type(), field.file_name())
                else {
                    warn!(content_type = ?field.content_type(), "unsupported image type");
                    return Err(AppError::bad_request("Only PNG and JPEG images are accepted"));
                };
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(format!("unreadable image: {e}")))?;
                upload = Some(Upload {
                    body,
                    ext,
                    content_type,
                });
            }
            Some("meal_type") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(e.to_string()))?;
                if !text.trim().is_empty() {
                    let slot = text
                        .parse::<MealSlot>()
                        .map_err(|e| AppError::bad_request(e.to_string()))?;
                    meal_type = Some(slot);
                }
            }
            _ => {}
        }
    }

    let Some(upload) = upload else {
        return Err(AppError::bad_request("image is required"));
    };
    let limit = state.config.limits.max_image_size_mb.saturating_mul(1024 * 1024);
    if upload.body.is_empty() || upload.body.len() > limit {
        warn!(size = upload.body.len(), limit, "image size rejected");
        return Err(AppError::bad_request(format!(
            "Image must be between 1 byte and {} MB",
            state.config.limits.max_image_size_mb
        )));
    }

    let result = recognize(state.ai.as_ref(), &upload.body, upload.content_type).await;
    let nutrition = estimate_nutrition(&result.foods);
    if !result.success {
        return Ok(Json(RecognitionResponse {
            success: false,
            log_id: None,
            foods: Vec::new(),
            nutrition,
        }));
    }

    let mut image_key = None;
    if let Some(storage) = &state.storage {
        let key = format!("food/{}/{}.{}", user_id, Uuid::new_v4(), upload.ext);
        match storage
            .put_object(&key, upload.body.clone(), upload.content_type)
            .await
        {
            Ok(()) => image_key = Some(key),
            Err(e) => error!(error = %e, %key, "photo upload failed"),
        }
    }

    let names: Vec<String> = result.foods.iter().map(|f| f.name.clone()).collect();
    let confidences: Vec<f64> = result.foods.iter().map(|f| f.confidence).collect();
    let log_id = repo::insert_log(
        &state.db,
        user_id,
        image_key.as_deref(),
        &names,
        &confidences,
        meal_type,
    )
    .await?;
    info!(%user_id, %log_id, foods = names.len(), "food recognized");
    analytics::record(
        &state.db,
        Some(user_id),
        "food_recognition",
        json!({
            "recognized_foods": names,
            "confidence_scores": confidences,
        }),
    )
    .await;

    Ok(Json(RecognitionResponse {
        success: true,
        log_id: Some(log_id),
        foods: result.foods,
        nutrition,
    }))
}

#[instrument(skip(state))]
pub async fn recognition_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let limit = q.limit.unwrap_or(20).clamp(1, 100);
    let logs = repo::history(&state.db, user_id, limit).await?;

    let mut out = Vec::with_capacity(logs.len());
    for log in logs {
        let image_url = match (&state.storage, &log.image_key) {
            (Some(storage), Some(key)) => match storage.presign_get(key, PRESIGN_TTL_SECS).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(error = %e, %key, "presign failed");
                    None
                }
            },
            _ => None,
        };
        out.push(HistoryEntry {
            id: log.id,
            foods: log.recognized_foods.0,
            confidence_scores: log.confidence_scores.0,
            meal_type: log.meal_type,
            image_url,
            created_at: log.created_at,
        });
    }
    Ok(Json(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_limit_follows_image_limit() {
        assert_eq!(body_limit(1), 2 * 1024 * 1024);
        assert_eq!(body_limit(40), 41 * 1024 * 1024);
        assert_eq!(body_limit(usize::MAX), usize::MAX);
    }
}
