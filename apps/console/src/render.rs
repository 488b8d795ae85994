//! Terminal rendering and user-input parsing for device state.

use anyhow::{anyhow, Result};
use shared::domain::{DeviceState, Weekday, WeekdaySet};

/// Day labels as the control panel has always shown them.
pub fn day_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tues",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thurs",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

pub fn parse_day(token: &str) -> Result<Weekday> {
    match token.trim().to_ascii_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Monday),
        "tue" | "tues" | "tuesday" => Ok(Weekday::Tuesday),
        "wed" | "wednesday" => Ok(Weekday::Wednesday),
        "thu" | "thurs" | "thursday" => Ok(Weekday::Thursday),
        "fri" | "friday" => Ok(Weekday::Friday),
        "sat" | "saturday" => Ok(Weekday::Saturday),
        "sun" | "sunday" => Ok(Weekday::Sunday),
        other => Err(anyhow!("unknown day name '{other}'")),
    }
}

pub fn parse_days(csv: &str) -> Result<WeekdaySet> {
    let days = csv
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(parse_day)
        .collect::<Result<WeekdaySet>>()?;
    if days.is_empty() {
        return Err(anyhow!("select at least one day"));
    }
    Ok(days)
}

pub fn parse_time(value: &str) -> Result<(u8, u8)> {
    let invalid = || anyhow!("invalid time '{value}', expected HH:MM");
    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    Ok((
        hours.parse().map_err(|_| invalid())?,
        minutes.parse().map_err(|_| invalid())?,
    ))
}

pub fn render_state(state: &DeviceState) -> String {
    let days = if state.schedule.weekdays.is_empty() {
        "none".to_string()
    } else {
        state
            .schedule
            .weekdays
            .iter()
            .map(|day| day_label(*day))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut out = format!(
        "water level:    {:.2}\n\
         pump:           {}\n\
         device time:    {}\n\
         trigger level:  {:.2}\n\
         topup schedule: {} at {:02}:{:02}",
        state.water_level,
        if state.pump_on { "ON" } else { "OFF" },
        state.current_system_time,
        state.trigger_level,
        days,
        state.schedule.hours,
        state.schedule.minutes,
    );
    if !state.last_trigger.is_empty() {
        out.push_str(&format!(
            "\nlast topup:     {} ({})",
            state.last_trigger, state.last_reason
        ));
    }
    out
}
