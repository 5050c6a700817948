//! Reduce 3-hourly forecast slots to one entry per day.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::model::{Condition, DailyForecast};

pub const FORECAST_DAYS: usize = 5;

/// A single 3-hourly slot as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSlot {
    /// Provider-local timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub dt_txt: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: Condition,
    pub icon: String,
}

/// Keep the midday slot of each day, in order, up to five days.
///
/// Labels count from `today`: the first kept slot is labelled with today's weekday,
/// the next with tomorrow's, and so on.
pub fn daily_at_noon(slots: &[ForecastSlot], today: NaiveDate) -> Vec<DailyForecast> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();

    slots
        .iter()
        .filter_map(|slot| match NaiveDateTime::parse_from_str(&slot.dt_txt, "%Y-%m-%d %H:%M:%S") {
            Ok(ts) if ts.time() == noon => Some((ts.date(), slot)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Skipping forecast slot with bad timestamp {:?}: {}", slot.dt_txt, e);
                None
            }
        })
        .take(FORECAST_DAYS)
        .enumerate()
        .map(|(index, (date, slot))| DailyForecast {
            label: day_label(today, index).to_string(),
            date,
            temp_max: slot.temp_max,
            temp_min: slot.temp_min,
            condition: slot.condition,
            icon: slot.icon.clone(),
        })
        .collect()
}

/// Weekday name `offset` days after `today`.
pub fn day_label(today: NaiveDate, offset: usize) -> &'static str {
    let weekday = today
        .checked_add_days(Days::new(offset as u64))
        .map(|d| d.weekday())
        .unwrap_or_else(|| today.weekday());

    weekday_name(weekday)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
