use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Day of the week as the device counts them: Monday is 1, Sunday is 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Weekday> {
        Weekday::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }
}

pub type WeekdaySet = BTreeSet<Weekday>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("hours out of range (0-23): {0}")]
    HoursOutOfRange(u8),
    #[error("minutes out of range (0-59): {0}")]
    MinutesOutOfRange(u8),
}

/// Weekly topup schedule: the days it fires on and the shared time of day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub weekdays: WeekdaySet,
    pub hours: u8,
    pub minutes: u8,
}

impl Schedule {
    pub fn new(weekdays: WeekdaySet, hours: u8, minutes: u8) -> Result<Schedule, ScheduleError> {
        if hours > 23 {
            return Err(ScheduleError::HoursOutOfRange(hours));
        }
        if minutes > 59 {
            return Err(ScheduleError::MinutesOutOfRange(minutes));
        }
        Ok(Schedule {
            weekdays,
            hours,
            minutes,
        })
    }
}

/// Last-known device state. Replaced wholesale on every successful poll;
/// the default value stands in until the first poll lands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub water_level: f64,
    pub pump_on: bool,
    /// Display string straight from the device; never parsed client-side.
    pub current_system_time: String,
    pub trigger_level: f64,
    pub schedule: Schedule,
    pub last_trigger: String,
    pub last_reason: String,
}
