use crate::errors::AppError;
use crate::models::{ActiveProfile, Profile, ProfileHint};

pub fn find_by_name<'a>(profiles: &'a [Profile], name: &str) -> Option<&'a Profile> {
    let wanted = name.trim().to_lowercase();
    profiles
        .iter()
        .find(|profile| profile.name.to_lowercase() == wanted)
}

/// Names are unique ignoring case.
pub fn ensure_unique(profiles: &[Profile], name: &str) -> Result<(), AppError> {
    match find_by_name(profiles, name) {
        Some(existing) => Err(AppError::conflict(format!(
            "a profile named {} already exists",
            existing.name
        ))),
        None => Ok(()),
    }
}

/// Picks the active profile from the authoritative list. The hint is only a
/// suggestion: an id or name that no longer exists is skipped.
pub fn resolve_active(
    profiles: &[Profile],
    preferred_id: Option<&str>,
    hint: &ProfileHint,
    default: &ActiveProfile,
) -> ActiveProfile {
    let by_id = |id: &str| profiles.iter().find(|profile| profile.id == id);

    preferred_id
        .and_then(by_id)
        .or_else(|| hint.id.as_deref().and_then(by_id))
        .or_else(|| {
            hint.name
                .as_deref()
                .and_then(|name| find_by_name(profiles, name))
        })
        .or_else(|| find_by_name(profiles, &default.name).filter(|_| !default.name.is_empty()))
        .or_else(|| profiles.first())
        .cloned()
        .map(ActiveProfile::from)
        .unwrap_or_else(|| default.clone())
}
