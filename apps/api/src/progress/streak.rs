use std::collections::BTreeMap;

use chrono::NaiveDate;

/// Day keys in the activity map are UTC dates formatted like `2026-08-25`.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Length of the run of consecutive days with positive activity ending
/// today or yesterday. A day with no entry (or a zero count) breaks the run;
/// if neither today nor yesterday has activity the streak is zero no matter
/// how long older runs were.
pub fn current_streak(activity: &BTreeMap<String, u32>, today: NaiveDate) -> u32 {
    let has_activity = |d: NaiveDate| activity.get(&day_key(d)).copied().unwrap_or(0) > 0;

    let anchor = if has_activity(today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if has_activity(yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    let mut day = anchor;
    while has_activity(day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}
