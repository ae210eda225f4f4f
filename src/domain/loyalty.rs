//! Loyalty Programme
//!
//! Visit-based rewards shown on the guest home page: a half-price hookah
//! on the 5th visit and a free one on the 10th.

/// Visit count at which the free reward is granted
pub const FULL_REWARD_VISITS: u32 = 10;

/// Visit count at which the half-price reward is granted
pub const HALF_REWARD_VISITS: u32 = 5;

/// Next visit milestone for a guest
pub fn next_milestone(visits: u32) -> u32 {
    if visits < HALF_REWARD_VISITS {
        HALF_REWARD_VISITS
    } else {
        FULL_REWARD_VISITS
    }
}

/// Visits left until the next milestone (never negative)
pub fn visits_until_bonus(visits: u32) -> u32 {
    next_milestone(visits).saturating_sub(visits)
}

/// Progress towards the free reward in percent
pub fn progress_percent(visits: u32) -> u32 {
    (visits.saturating_mul(100) / FULL_REWARD_VISITS).min(100)
}

/// Personal discount stored by staff in the guest notes JSON
///
/// Notes are free-form; anything that is not a JSON object with a numeric
/// `personal_discount` yields zero.
pub fn personal_discount(notes: Option<&serde_json::Value>) -> i64 {
    let value = match notes {
        Some(serde_json::Value::String(raw)) => serde_json::from_str(raw).ok(),
        Some(other) => Some(other.clone()),
        None => None,
    };

    value
        .as_ref()
        .and_then(|v| v.get("personal_discount"))
        .and_then(|d| d.as_i64().or_else(|| d.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}
