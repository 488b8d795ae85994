use std::{sync::Arc, time::Duration};

use reqwest::Client;
use shared::{
    domain::{DeviceState, Schedule},
    protocol::{ScheduleRequest, StatsResponse, TopUpTime},
    schedule::encode_days,
};
use tokio::{
    sync::{broadcast, Mutex, Notify},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{info, warn};

pub mod error;
mod store;

pub use store::StateStore;

use error::DeviceApiError;

pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(10);

/// Events for the rendering layer. Snapshots arrive here after every
/// successful poll; notices carry reply text the device wants shown to the
/// user.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    StateChanged(DeviceState),
    Notice(String),
}

/// Keeps the panel's [`StateStore`] in sync with the device and turns user
/// actions into device API calls.
///
/// All polls — periodic ticks and the forced refresh queued after each
/// command — funnel through one task, so at most one `/stats` request is in
/// flight at any time and overlapping triggers coalesce. Every command
/// issues its request first and queues the refresh after it completes, so
/// the UI always ends up showing the device's post-action state.
pub struct PanelClient {
    http: Client,
    device_url: String,
    store: Arc<StateStore>,
    events: broadcast::Sender<PanelEvent>,
    refresh: Notify,
    poll_period: Duration,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl PanelClient {
    pub fn new(device_url: impl Into<String>) -> Arc<Self> {
        Self::with_poll_period(device_url, DEFAULT_POLL_PERIOD)
    }

    pub fn with_poll_period(device_url: impl Into<String>, poll_period: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            http: Client::new(),
            device_url: device_url.into(),
            store: Arc::new(StateStore::new()),
            events,
            refresh: Notify::new(),
            poll_period,
            poll_task: Mutex::new(None),
        })
    }

    pub fn store(&self) -> Arc<StateStore> {
        Arc::clone(&self.store)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    /// Spawns the poll loop. The first poll fires immediately, then the loop
    /// wakes on the periodic tick or a forced refresh, whichever comes first.
    /// Calling this on a client that is already running does nothing.
    pub async fn start(self: &Arc<Self>) {
        let mut task = self.poll_task.lock().await;
        if task.is_some() {
            return;
        }
        let client = Arc::clone(self);
        *task = Some(tokio::spawn(async move { client.run_poll_loop().await }));
    }

    /// Cancels the poll loop. A request in flight at this point either dies
    /// with the task or completes against the still-referenced store.
    pub async fn stop(&self) {
        if let Some(task) = self.poll_task.lock().await.take() {
            task.abort();
        }
    }

    /// Queues a refresh poll outside the periodic cadence. While a poll is in
    /// flight, any number of triggers collapse into a single queued poll.
    pub fn poll_now(&self) {
        self.refresh.notify_one();
    }

    /// `POST /pump?state=on|off`. The device's reply text is surfaced to the
    /// user verbatim, not interpreted.
    pub async fn set_pump(&self, on: bool) {
        let state = if on { "on" } else { "off" };
        let request = self
            .http
            .post(format!("{}/pump", self.device_url))
            .query(&[("state", state)]);
        self.run_command("/pump", request).await;
        self.poll_now();
    }

    /// `POST /set-trigger?level=N`. The device is authoritative on the
    /// acceptable range and answers with its own text either way.
    pub async fn set_trigger_level(&self, level: i64) {
        let request = self
            .http
            .post(format!("{}/set-trigger", self.device_url))
            .query(&[("level", level)]);
        self.run_command("/set-trigger", request).await;
        self.poll_now();
    }

    /// `GET /topup`, fire and forget: the reply body is ignored and a
    /// transport failure is only logged.
    pub async fn manual_top_up(&self) {
        let request = self.http.get(format!("{}/topup", self.device_url));
        if let Err(err) = self.send_command("/topup", request).await {
            self.report_command_failure(err);
        }
        self.poll_now();
    }

    /// `POST /topup/schedule` with the bitmask-encoded weekly schedule.
    pub async fn set_schedule(&self, schedule: &Schedule) {
        let body = ScheduleRequest {
            time: TopUpTime {
                hours: schedule.hours,
                minutes: schedule.minutes,
            },
            days: encode_days(&schedule.weekdays),
        };
        let request = self
            .http
            .post(format!("{}/topup/schedule", self.device_url))
            .json(&body);
        if let Err(err) = self.send_command("/topup/schedule", request).await {
            self.report_command_failure(err);
        }
        self.poll_now();
    }

    async fn run_poll_loop(self: Arc<Self>) {
        info!(device_url = %self.device_url, "starting stats poll loop");
        let mut ticker = interval(self.poll_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.refresh.notified() => {}
            }
            if let Err(err) = self.poll_once().await {
                // Non-fatal: keep the previous snapshot and stay on cadence.
                warn!("stats poll failed: {err}");
            }
        }
    }

    async fn poll_once(&self) -> Result<(), DeviceApiError> {
        let stats = self.fetch_stats().await?;
        let state = DeviceState::from(stats);
        self.store.replace(state.clone()).await;
        let _ = self.events.send(PanelEvent::StateChanged(state));
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<StatsResponse, DeviceApiError> {
        let response = self
            .http
            .get(format!("{}/stats", self.device_url))
            .send()
            .await
            .map_err(DeviceApiError::Transport)?
            .error_for_status()
            .map_err(DeviceApiError::Transport)?;
        response.json().await.map_err(|err| {
            if err.is_decode() {
                DeviceApiError::Malformed(err)
            } else {
                DeviceApiError::Transport(err)
            }
        })
    }

    /// Issues a command whose reply text is user-facing.
    async fn run_command(&self, endpoint: &'static str, request: reqwest::RequestBuilder) {
        match self.send_command(endpoint, request).await {
            Ok(reply) => {
                if !reply.is_empty() {
                    let _ = self.events.send(PanelEvent::Notice(reply));
                }
            }
            Err(err) => self.report_command_failure(err),
        }
    }

    async fn send_command(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, DeviceApiError> {
        let response = request.send().await.map_err(DeviceApiError::Transport)?;
        let status = response.status();
        let reply = response.text().await.map_err(DeviceApiError::Transport)?;
        if !status.is_success() {
            return Err(DeviceApiError::Rejected {
                endpoint,
                status,
                reply,
            });
        }
        Ok(reply)
    }

    fn report_command_failure(&self, err: DeviceApiError) {
        warn!("device command failed: {err}");
        // A rejection usually carries the device's own explanation; show it.
        if let DeviceApiError::Rejected { reply, .. } = err {
            if !reply.is_empty() {
                let _ = self.events.send(PanelEvent::Notice(reply));
            }
        }
    }
}

#[cfg(test)]
mod tests;
