use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use crate::domain::models::availability::{AvailabilitySlot, WeeklySchedule};
use crate::domain::models::session::{Session, STATUS_CANCELLED};

pub const MIN_DURATION_MINUTES: i64 = 15;
pub const MAX_DURATION_MINUTES: i64 = 480;

/// Candidate start times advance on a fixed grid inside each weekly slot.
const GRID_MINUTES: usize = 15;

const MINUTES_PER_DAY: usize = 1440;

/// Computes the open start times for one coach on one date.
///
/// A candidate survives iff it starts in the future, `[start, start+duration)`
/// stays inside the weekly slot, and it does not intersect any non-cancelled
/// session's blocked interval `[start, start + duration + buffer)`.
pub fn calculate_open_slots(
    schedule: &WeeklySchedule,
    slots: &[AvailabilitySlot],
    date: NaiveDate,
    duration_minutes: i64,
    existing_sessions: &[Session],
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let tz: Tz = schedule.timezone.parse().unwrap_or(chrono_tz::UTC);
    let weekday = date.weekday().num_days_from_monday() as i32;
    let buffer = Duration::minutes(schedule.buffer_minutes as i64);
    let duration = Duration::minutes(duration_minutes);

    if duration_minutes <= 0 {
        return Vec::new();
    }

    let blocked: Vec<(DateTime<Utc>, DateTime<Utc>)> = existing_sessions
        .iter()
        .filter(|s| s.status != STATUS_CANCELLED)
        .map(|s| (s.scheduled_at, s.end_time() + buffer))
        .collect();

    let mut open = Vec::new();
    let duration_min = duration_minutes as usize;

    for slot in slots.iter().filter(|s| s.day_of_week == weekday) {
        if let (Ok(start), Ok(end)) = (
            NaiveTime::parse_from_str(&slot.start_time, "%H:%M"),
            NaiveTime::parse_from_str(&slot.end_time, "%H:%M"),
        ) {
            let win_start_idx = (start.hour() * 60 + start.minute()) as usize;
            let mut win_end_idx = (end.hour() * 60 + end.minute()) as usize;
            // 23:59 means end of day
            if win_end_idx == MINUTES_PER_DAY - 1 {
                win_end_idx = MINUTES_PER_DAY;
            }

            let mut cursor = win_start_idx;
            while cursor + duration_min <= win_end_idx {
                let hour = (cursor / 60) as u32;
                let minute = (cursor % 60) as u32;

                if let Some(nt) = NaiveTime::from_hms_opt(hour, minute, 0)
                    && let Some(cand_tz) = tz.from_local_datetime(&date.and_time(nt)).single()
                {
                    let cand_utc = cand_tz.with_timezone(&Utc);
                    let cand_end_utc = cand_utc + duration;

                    let is_blocked = blocked
                        .iter()
                        .any(|(b_start, b_end)| cand_utc < *b_end && cand_end_utc > *b_start);

                    if cand_utc > now && !is_blocked {
                        open.push(cand_utc);
                    }
                }
                cursor += GRID_MINUTES;
            }
        }
    }

    open.sort();
    open.dedup();
    open
}

/// Whether a proposed (start, duration) fits an open slot for that coach.
pub fn is_start_available(
    schedule: &WeeklySchedule,
    slots: &[AvailabilitySlot],
    start: DateTime<Utc>,
    duration_minutes: i64,
    existing_sessions: &[Session],
    now: DateTime<Utc>,
) -> bool {
    let tz: Tz = schedule.timezone.parse().unwrap_or(chrono_tz::UTC);
    let local_date = start.with_timezone(&tz).date_naive();
    calculate_open_slots(schedule, slots, local_date, duration_minutes, existing_sessions, now)
        .contains(&start)
}

/// Validates a full weekly slot set before it replaces a coach's schedule.
/// Returns the first violation as a field-level message.
pub fn validate_weekly_slots(slots: &[(i32, String, String)]) -> Result<(), String> {
    let mut parsed: Vec<(i32, NaiveTime, NaiveTime)> = Vec::with_capacity(slots.len());

    for (day, start_str, end_str) in slots {
        if !(0..=6).contains(day) {
            return Err(format!("day_of_week must be between 0 and 6, got {}", day));
        }
        let start = NaiveTime::parse_from_str(start_str, "%H:%M")
            .map_err(|_| format!("Invalid start time '{}', expected HH:MM", start_str))?;
        let end = NaiveTime::parse_from_str(end_str, "%H:%M")
            .map_err(|_| format!("Invalid end time '{}', expected HH:MM", end_str))?;
        if start >= end {
            return Err(format!("Slot {}-{} must start before it ends", start_str, end_str));
        }
        parsed.push((*day, start, end));
    }

    for (i, a) in parsed.iter().enumerate() {
        for b in parsed.iter().skip(i + 1) {
            if a.0 == b.0 && a.1 < b.2 && b.1 < a.2 {
                return Err(format!("Overlapping slots on day {}", a.0));
            }
        }
    }

    Ok(())
}
