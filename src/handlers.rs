use crate::analytics::analyze;
use crate::errors::AppError;
use crate::models::{
    sort_newest_first, ActiveProfile, CreateProfileRequest, DashboardResponse, Entry,
    EntryRequest, Profile, StatusResponse, SwitchProfileRequest, UpdateProfileRequest,
};
use crate::profiles::{ensure_unique, find_by_name};
use crate::state::AppState;
use crate::ui::render_index;
use crate::validation::{validate_count, validate_date, validate_goal, validate_name};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::Datelike;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let profile = state.active_profile().await;
    Html(render_index(&profile, state.today(), state.config_error.as_deref()))
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        configured: state.store.is_some(),
        config_error: state.config_error.clone(),
        active_profile: state.active_profile().await,
    })
}

pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, AppError> {
    Ok(Json(state.store()?.list_profiles().await))
}

pub async fn create_profile(
    State(state): State<AppState>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let store = state.store()?;
    let name = validate_name(payload.name.as_deref())?;
    let goal = validate_goal(payload.goal.as_ref())?;
    ensure_unique(&store.list_profiles().await, &name)?;

    let profile = store.add_profile(&name, goal).await?;
    info!("created profile {:?} with goal {goal}", profile.name);
    state.refresh_active(Some(profile.id.as_str())).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let store = state.store()?;
    let goal = validate_goal(payload.goal.as_ref())?;
    let profile = store
        .update_profile_goal(&id, goal)
        .await?
        .ok_or_else(|| AppError::not_found("no profile with that id"))?;

    if state.active_profile().await.id.as_deref() == Some(id.as_str()) {
        state.refresh_active(Some(id.as_str())).await?;
    }

    Ok(Json(profile))
}

pub async fn get_active_profile(State(state): State<AppState>) -> Json<ActiveProfile> {
    Json(state.active_profile().await)
}

pub async fn switch_profile(
    State(state): State<AppState>,
    Json(payload): Json<SwitchProfileRequest>,
) -> Result<Json<ActiveProfile>, AppError> {
    let store = state.store()?;
    let name = validate_name(payload.name.as_deref())?;
    let profiles = store.list_profiles().await;
    let profile = find_by_name(&profiles, &name)
        .cloned()
        .ok_or_else(|| AppError::not_found("no profile with that name, create one in settings"))?;

    Ok(Json(state.set_active(profile.into()).await))
}

pub async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<Entry>>, AppError> {
    let profile = state.active_profile().await;
    let mut entries = entries_for(&state, &profile).await?;
    sort_newest_first(&mut entries);
    Ok(Json(entries))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<EntryRequest>,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    let store = state.store()?;
    let count = validate_count(payload.count.as_ref())?;
    let date = validate_date(payload.date.as_deref())?;
    let user = state.active_profile().await.name;
    if user.is_empty() {
        return Err(AppError::bad_request(
            "create or select a profile before logging pushups",
        ));
    }

    let entry = store.add_entry(&user, date, count).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EntryRequest>,
) -> Result<Json<Entry>, AppError> {
    let store = state.store()?;
    let count = validate_count(payload.count.as_ref())?;
    let date = validate_date(payload.date.as_deref())?;

    store
        .update_entry(&id, date, count)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("no entry with that id"))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.store()?.delete_entry(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("no entry with that id"))
    }
}

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, AppError> {
    let profile = state.active_profile().await;
    let entries = entries_for(&state, &profile).await?;
    let today = state.today();
    let year = today.year();

    Ok(Json(DashboardResponse {
        analytics: analyze(&entries, today, year, profile.goal),
        profile,
        year,
        today,
    }))
}

async fn entries_for(state: &AppState, profile: &ActiveProfile) -> Result<Vec<Entry>, AppError> {
    let store = state.store()?;
    if profile.name.is_empty() {
        return Ok(Vec::new());
    }
    Ok(store.query_entries(&profile.name).await)
}
