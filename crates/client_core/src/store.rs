use shared::domain::DeviceState;
use tokio::sync::RwLock;

/// Holds the last snapshot the device reported. Snapshots are replaced
/// wholesale; there is no field-level merging, so a producer must always
/// hand over a complete state.
#[derive(Default)]
pub struct StateStore {
    state: RwLock<DeviceState>,
}

impl StateStore {
    pub fn new() -> StateStore {
        StateStore::default()
    }

    /// Current snapshot; the zero-value state until the first poll succeeds.
    pub async fn get(&self) -> DeviceState {
        self.state.read().await.clone()
    }

    pub async fn replace(&self, next: DeviceState) {
        *self.state.write().await = next;
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::{Schedule, Weekday};

    use super::*;

    #[tokio::test]
    async fn starts_with_the_zero_state() {
        let store = StateStore::new();
        assert_eq!(store.get().await, DeviceState::default());
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_snapshot() {
        let store = StateStore::new();
        store
            .replace(DeviceState {
                water_level: 4.2,
                pump_on: true,
                schedule: Schedule {
                    weekdays: [Weekday::Monday].into_iter().collect(),
                    hours: 14,
                    minutes: 30,
                },
                ..DeviceState::default()
            })
            .await;

        store
            .replace(DeviceState {
                water_level: 3.9,
                ..DeviceState::default()
            })
            .await;

        let state = store.get().await;
        assert_eq!(state.water_level, 3.9);
        // No merging: fields absent from the second snapshot fall back to
        // that snapshot's values, not the first one's.
        assert!(!state.pump_on);
        assert!(state.schedule.weekdays.is_empty());
    }
}
