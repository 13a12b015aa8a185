// libs/scheduling-cell/src/services/slots.rs
//
// Slot arithmetic is pure: a schedule configuration in, `HH:MM` strings
// out. The store is someone else's problem.

use std::collections::HashSet;

use chrono::{NaiveTime, Timelike};

use crate::models::{ScheduleConfig, SchedulingError};

/// Minutes since midnight for an `HH:MM` slot.
pub fn slot_minutes(slot: &str) -> Result<i64, SchedulingError> {
    let time = NaiveTime::parse_from_str(slot, "%H:%M")
        .map_err(|_| SchedulingError::InvalidTime(slot.to_string()))?;
    Ok(time.num_seconds_from_midnight() as i64 / 60)
}

fn format_slot(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Generate the bookable slots for one day of a city's schedule: the
/// morning window first, then the afternoon window, each stepped by
/// `intervalo` minutes with the end bound excluded. A window whose start
/// is not before its end yields nothing.
pub fn generate_slots(config: &ScheduleConfig) -> Result<Vec<String>, SchedulingError> {
    if config.intervalo <= 0 {
        return Err(SchedulingError::InvalidInterval(config.intervalo));
    }

    let mut slots = Vec::new();

    if config.periodo_manha {
        push_window(
            &mut slots,
            &config.horarios.manha_inicio,
            &config.horarios.manha_fim,
            config.intervalo,
        )?;
    }

    if config.periodo_tarde {
        push_window(
            &mut slots,
            &config.horarios.tarde_inicio,
            &config.horarios.tarde_fim,
            config.intervalo,
        )?;
    }

    Ok(slots)
}

fn push_window(
    out: &mut Vec<String>,
    start: &str,
    end: &str,
    step: i64,
) -> Result<(), SchedulingError> {
    let end = slot_minutes(end)?;
    let mut current = slot_minutes(start)?;

    while current < end {
        out.push(format_slot(current));
        current += step;
    }

    Ok(())
}

/// Subtract booked times from the generated slots, preserving input order.
pub fn filter_available(slots: &[String], booked: &HashSet<String>) -> Vec<String> {
    slots.iter()
        .filter(|slot| !booked.contains(slot.as_str()))
        .cloned()
        .collect()
}

/// Full chronological order across both periods; call sites use this when
/// the concatenated blocks are not enough.
pub fn sort_chronological(slots: &mut [String]) {
    slots.sort_by_key(|slot| slot_minutes(slot).unwrap_or(i64::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleHours;

    fn config(manha: bool, tarde: bool, intervalo: i64) -> ScheduleConfig {
        ScheduleConfig {
            cidade_id: "mantena".to_string(),
            periodo_manha: manha,
            periodo_tarde: tarde,
            horarios: ScheduleHours {
                manha_inicio: "08:00".to_string(),
                manha_fim: "09:00".to_string(),
                tarde_inicio: "14:00".to_string(),
                tarde_fim: "15:00".to_string(),
            },
            intervalo,
        }
    }

    #[test]
    fn morning_window_excludes_end_bound() {
        let mut cfg = config(true, false, 10);
        cfg.horarios.manha_fim = "08:30".to_string();

        let slots = generate_slots(&cfg).unwrap();
        assert_eq!(slots, vec!["08:00", "08:10", "08:20"]);
    }

    #[test]
    fn both_periods_concatenate_morning_first() {
        let slots = generate_slots(&config(true, true, 30)).unwrap();
        assert_eq!(slots, vec!["08:00", "08:30", "14:00", "14:30"]);
    }

    #[test]
    fn disabled_period_emits_nothing() {
        let slots = generate_slots(&config(false, true, 30)).unwrap();
        assert_eq!(slots, vec!["14:00", "14:30"]);
    }

    #[test]
    fn degenerate_window_yields_zero_slots() {
        let mut cfg = config(true, true, 30);
        cfg.horarios.manha_inicio = "10:00".to_string();
        cfg.horarios.manha_fim = "08:00".to_string();

        let slots = generate_slots(&cfg).unwrap();
        assert_eq!(slots, vec!["14:00", "14:30"]);
    }

    #[test]
    fn non_positive_interval_is_rejected() {
        assert!(matches!(
            generate_slots(&config(true, false, 0)),
            Err(SchedulingError::InvalidInterval(0))
        ));
        assert!(matches!(
            generate_slots(&config(true, false, -15)),
            Err(SchedulingError::InvalidInterval(-15))
        ));
    }

    #[test]
    fn unparseable_bound_is_an_error() {
        let mut cfg = config(true, false, 30);
        cfg.horarios.manha_inicio = "8h00".to_string();

        assert!(matches!(
            generate_slots(&cfg),
            Err(SchedulingError::InvalidTime(_))
        ));
    }

    #[test]
    fn interval_overshooting_window_end_stops() {
        let mut cfg = config(true, false, 45);
        let slots = generate_slots(&cfg).unwrap();
        assert_eq!(slots, vec!["08:00", "08:45"]);
        cfg.intervalo = 90;
        assert_eq!(generate_slots(&cfg).unwrap(), vec!["08:00"]);
    }

    #[test]
    fn filter_preserves_order() {
        let slots: Vec<String> = ["08:00", "08:10", "08:20"]
            .iter().map(|s| s.to_string()).collect();
        let booked: HashSet<String> = ["08:10".to_string()].into_iter().collect();

        assert_eq!(filter_available(&slots, &booked), vec!["08:00", "08:20"]);
    }

    #[test]
    fn filter_with_empty_booked_set_is_identity() {
        let slots: Vec<String> = ["08:00", "14:00"].iter().map(|s| s.to_string()).collect();
        assert_eq!(filter_available(&slots, &HashSet::new()), slots);
    }

    #[test]
    fn chronological_sort_by_minutes() {
        let mut slots: Vec<String> = ["14:00", "08:30", "09:00"]
            .iter().map(|s| s.to_string()).collect();
        sort_chronological(&mut slots);
        assert_eq!(slots, vec!["08:30", "09:00", "14:00"]);
    }
}
