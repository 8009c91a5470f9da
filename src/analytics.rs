use crate::models::{Analytics, DailyTotal, Entry, Projection, RollingPoint, Streak};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

const ROLLING_WINDOW: usize = 7;

/// Derives every dashboard figure for one profile and one calendar year.
///
/// Pure: the same entries, `today`, `year` and `goal` always give the same
/// result. Entries outside `year` or without a valid date are ignored.
pub fn analyze(entries: &[Entry], today: NaiveDate, year: i32, goal: u64) -> Analytics {
    let (total, daily_totals) = aggregate(entries, year);
    let first_day = daily_totals.keys().next().copied();

    let zero_days = first_day
        .map(|first| zero_days(first, &daily_totals, today, year))
        .unwrap_or_default();
    let streak = streak(&daily_totals, today, year);
    let projection = first_day.and_then(|first| project(total, goal, first, today));
    let rolling = rolling_series(&daily_totals, &zero_days, today);

    Analytics {
        total,
        goal,
        remaining: goal.saturating_sub(total),
        progress_percent: progress_percent(total, goal),
        today_total: daily_totals.get(&today).copied().unwrap_or(0),
        first_day,
        daily_totals: daily_totals
            .iter()
            .map(|(date, total)| DailyTotal {
                date: *date,
                total: *total,
            })
            .collect(),
        zero_days,
        streak,
        projection,
        rolling,
    }
}

fn aggregate(entries: &[Entry], year: i32) -> (u64, BTreeMap<NaiveDate, u64>) {
    let mut total = 0u64;
    let mut daily_totals = BTreeMap::new();

    for entry in entries {
        let Some(date) = entry.date.filter(|date| date.year() == year) else {
            continue;
        };
        total = total.saturating_add(entry.count);
        let day = daily_totals.entry(date).or_insert(0u64);
        *day = day.saturating_add(entry.count);
    }

    (total, daily_totals)
}

/// Days between the first logged day and yesterday with nothing logged.
/// Today is never reported; it is not over yet.
fn zero_days(
    first: NaiveDate,
    daily_totals: &BTreeMap<NaiveDate, u64>,
    today: NaiveDate,
    year: i32,
) -> Vec<NaiveDate> {
    let yesterday = today - Duration::days(1);
    let last = match NaiveDate::from_ymd_opt(year, 12, 31) {
        Some(year_end) => yesterday.min(year_end),
        None => yesterday,
    };

    let mut missed = Vec::new();
    let mut day = first;
    while day <= last {
        if day.year() == year && day != today && !daily_totals.contains_key(&day) {
            missed.push(day);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    missed
}

fn streak(daily_totals: &BTreeMap<NaiveDate, u64>, today: NaiveDate, year: i32) -> Streak {
    let active: BTreeSet<NaiveDate> = daily_totals
        .iter()
        .filter(|(_, total)| **total > 0)
        .map(|(date, _)| *date)
        .collect();

    let mut best = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for date in &active {
        run = match previous {
            Some(prev) if (*date - prev).num_days() == 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(*date);
    }

    let is_active = |date: NaiveDate| date.year() == year && active.contains(&date);
    let yesterday = today - Duration::days(1);
    let start = if is_active(today) {
        Some(today)
    } else if is_active(yesterday) {
        Some(yesterday)
    } else {
        None
    };

    let mut current = 0u32;
    let mut cursor = start;
    while let Some(day) = cursor.filter(|day| is_active(*day)) {
        current += 1;
        cursor = day.pred_opt();
    }

    Streak {
        current,
        best: best.max(current),
    }
}

fn project(total: u64, goal: u64, first: NaiveDate, today: NaiveDate) -> Option<Projection> {
    if goal == 0 {
        return None;
    }

    let days_active = ((today - first).num_days() + 1).max(1);
    let average_per_day = total as f64 / days_active as f64;
    if average_per_day <= 0.0 {
        return None;
    }

    if total >= goal {
        return Some(Projection {
            average_per_day,
            days_active,
            days_remaining: 0,
            estimated_date: today,
        });
    }

    let days_remaining = ((goal - total) as f64 / average_per_day).ceil() as u64;
    let estimated_date = i64::try_from(days_remaining)
        .ok()
        .and_then(|days| today.checked_add_signed(Duration::try_days(days)?))
        .unwrap_or(NaiveDate::MAX);

    Some(Projection {
        average_per_day,
        days_active,
        days_remaining,
        estimated_date,
    })
}

/// Trailing average over logged days and zero days, plus one forecast point
/// extrapolated from the last week before today.
fn rolling_series(
    daily_totals: &BTreeMap<NaiveDate, u64>,
    zero_days: &[NaiveDate],
    today: NaiveDate,
) -> Vec<RollingPoint> {
    let timeline: Vec<NaiveDate> = daily_totals
        .keys()
        .chain(zero_days.iter())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let total_on = |date: &NaiveDate| daily_totals.get(date).copied().unwrap_or(0);

    let mut points: Vec<RollingPoint> = timeline
        .iter()
        .enumerate()
        .map(|(index, date)| {
            let window = &timeline[(index + 1).saturating_sub(ROLLING_WINDOW)..=index];
            RollingPoint {
                date: *date,
                total: total_on(date),
                average: mean(window.iter().map(total_on)),
                forecast: false,
            }
        })
        .collect();

    let past: Vec<&NaiveDate> = timeline.iter().filter(|date| **date < today).collect();
    let last_week = &past[past.len().saturating_sub(ROLLING_WINDOW)..];
    if last_week.is_empty() {
        return points;
    }
    if let Some(next) = timeline.last().and_then(|date| date.succ_opt()) {
        points.push(RollingPoint {
            date: next,
            total: 0,
            average: mean(last_week.iter().map(|date| total_on(*date))),
            forecast: true,
        });
    }

    points
}

fn mean(values: impl Iterator<Item = u64>) -> f64 {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), value| {
        (sum.saturating_add(value), count + 1)
    });
    if count == 0 {
        return 0.0;
    }
    round_tenth(sum as f64 / count as f64)
}

fn progress_percent(total: u64, goal: u64) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    round_tenth((total as f64 / goal as f64 * 100.0).min(100.0))
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
