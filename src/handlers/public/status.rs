use axum::extract::State;

use crate::db::AppState;
use crate::entitlements;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::models::EntitlementStatus;

/// `GET /user_status/{user_id}`: polled by the front-end before it releases
/// the paid report. Unknown users are simply not premium.
pub async fn user_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<EntitlementStatus>> {
    let conn = state.db.get()?;
    Ok(Json(entitlements::premium_status(&conn, &user_id)?))
}
