use serde::{Deserialize, Serialize};

use crate::{
    domain::{DeviceState, Schedule},
    schedule::decode_days,
};

/// `GET /stats` response body. Field names are the device's, verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub level: f64,
    /// "true"/"false" as text; older firmware shipped other casings.
    pub pump_state: String,
    pub current_system_time: String,
    pub trigger_level: f64,
    pub topup_dates: u8,
    pub topup_hour: u8,
    pub topup_minute: u8,
    #[serde(default)]
    pub last_trigger: String,
    #[serde(default)]
    pub last_reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUpTime {
    pub hours: u8,
    pub minutes: u8,
}

/// `POST /topup/schedule` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub time: TopUpTime,
    pub days: u8,
}

impl From<StatsResponse> for DeviceState {
    fn from(stats: StatsResponse) -> Self {
        DeviceState {
            water_level: stats.level,
            pump_on: stats.pump_state.eq_ignore_ascii_case("true"),
            current_system_time: stats.current_system_time,
            trigger_level: stats.trigger_level,
            schedule: Schedule {
                weekdays: decode_days(stats.topup_dates),
                hours: stats.topup_hour,
                minutes: stats.topup_minute,
            },
            last_trigger: stats.last_trigger,
            last_reason: stats.last_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Weekday;

    fn stats(pump_state: &str) -> StatsResponse {
        StatsResponse {
            level: 4.2,
            pump_state: pump_state.to_string(),
            current_system_time: "Mon Jan  6 14:30:00 2025".to_string(),
            trigger_level: 3.0,
            topup_dates: 0b100_0001,
            topup_hour: 14,
            topup_minute: 30,
            last_trigger: "Mon Jan  6 14:30:00 2025".to_string(),
            last_reason: "Scheduled".to_string(),
        }
    }

    #[test]
    fn pump_state_comparison_is_case_insensitive() {
        assert!(DeviceState::from(stats("TRUE")).pump_on);
        assert!(DeviceState::from(stats("true")).pump_on);
        assert!(DeviceState::from(stats("True")).pump_on);
        assert!(!DeviceState::from(stats("FALSE")).pump_on);
        assert!(!DeviceState::from(stats("off")).pump_on);
        assert!(!DeviceState::from(stats("")).pump_on);
    }

    #[test]
    fn stats_map_onto_a_full_snapshot() {
        let state = DeviceState::from(stats("true"));
        assert_eq!(state.water_level, 4.2);
        assert_eq!(state.trigger_level, 3.0);
        assert_eq!(state.schedule.hours, 14);
        assert_eq!(state.schedule.minutes, 30);
        assert_eq!(
            state.schedule.weekdays.iter().copied().collect::<Vec<_>>(),
            vec![Weekday::Monday, Weekday::Sunday]
        );
        assert_eq!(state.last_reason, "Scheduled");
    }

    #[test]
    fn stats_tolerate_firmware_without_trigger_history() {
        let parsed: StatsResponse = serde_json::from_str(
            r#"{"level":4.2,"pump_state":"false","current_system_time":"t",
                "trigger_level":3.0,"topup_dates":9,"topup_hour":14,"topup_minute":30}"#,
        )
        .expect("stats without last_trigger/last_reason");
        assert!(parsed.last_trigger.is_empty());
        assert!(parsed.last_reason.is_empty());
    }

    #[test]
    fn schedule_request_serializes_to_the_wire_shape() {
        let body = ScheduleRequest {
            time: TopUpTime {
                hours: 6,
                minutes: 30,
            },
            days: 21,
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            serde_json::json!({"time": {"hours": 6, "minutes": 30}, "days": 21})
        );
    }
}
