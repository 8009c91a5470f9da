use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A pushup document as it sits in the store. No schema is enforced, so every
/// field stays untyped until it is coerced into an [`Entry`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PushupDoc {
    #[serde(default)]
    pub user: Value,
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub count: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileDoc {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub goal: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    #[serde(default)]
    pub pushups: BTreeMap<String, PushupDoc>,
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: String,
    pub user: String,
    /// Stored date string, kept verbatim for display even when malformed.
    #[serde(rename = "date")]
    pub raw_date: String,
    #[serde(skip)]
    pub date: Option<NaiveDate>,
    pub count: u64,
}

impl Entry {
    pub fn from_doc(id: &str, doc: &PushupDoc) -> Self {
        let raw_date = match &doc.date {
            Value::String(value) => value.clone(),
            _ => String::new(),
        };
        Self {
            id: id.to_string(),
            user: doc.user.as_str().unwrap_or_default().to_string(),
            date: parse_day(&raw_date),
            raw_date,
            count: coerce_count(&doc.count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub goal: u64,
}

impl Profile {
    pub fn from_doc(id: &str, doc: &ProfileDoc) -> Self {
        Self {
            id: id.to_string(),
            name: doc.name.as_str().unwrap_or_default().trim().to_string(),
            goal: coerce_goal(&doc.goal),
        }
    }
}

/// The profile currently driving the dashboard. `id` is `None` for the
/// built-in default profile until one with that name has been saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveProfile {
    pub id: Option<String>,
    pub name: String,
    pub goal: u64,
}

impl From<Profile> for ActiveProfile {
    fn from(profile: Profile) -> Self {
        Self {
            id: Some(profile.id),
            name: profile.name,
            goal: profile.goal,
        }
    }
}

/// Last active profile, remembered across restarts. Only ever a hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProfileHint {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<&ActiveProfile> for ProfileHint {
    fn from(profile: &ActiveProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: Some(profile.name.clone()).filter(|name| !name.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub count: Option<Value>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub name: Option<String>,
    pub goal: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub goal: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SwitchProfileRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub configured: bool,
    pub config_error: Option<String>,
    pub active_profile: ActiveProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub average_per_day: f64,
    pub days_active: i64,
    pub days_remaining: u64,
    pub estimated_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub total: u64,
    pub average: f64,
    pub forecast: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub total: u64,
    pub goal: u64,
    pub remaining: u64,
    pub progress_percent: f64,
    pub today_total: u64,
    pub first_day: Option<NaiveDate>,
    pub daily_totals: Vec<DailyTotal>,
    pub zero_days: Vec<NaiveDate>,
    pub streak: Streak,
    pub projection: Option<Projection>,
    pub rolling: Vec<RollingPoint>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub profile: ActiveProfile,
    pub year: i32,
    pub today: NaiveDate,
    pub analytics: Analytics,
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Loose numeric coercion for stored counts: anything that is not a finite,
/// non-negative number (or a string holding one) counts as 0. Fractions
/// truncate, so 7.9 stored pushups count as 7.
pub fn coerce_count(value: &Value) -> u64 {
    match stored_number(value) {
        Some(number) if number >= 0.0 => number as u64,
        _ => 0,
    }
}

/// Like [`coerce_count`], but a positive fraction rounds up: a stored goal
/// of 0.5 is still a goal (1), never "no goal".
pub fn coerce_goal(value: &Value) -> u64 {
    match stored_number(value) {
        Some(number) if number > 0.0 => number.ceil() as u64,
        _ => 0,
    }
}

fn stored_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// Newest first, larger counts first within a day, malformed dates last.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| match (a.date, b.date) {
        (Some(left), Some(right)) => right.cmp(&left).then(b.count.cmp(&a.count)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.count.cmp(&a.count),
    });
}
