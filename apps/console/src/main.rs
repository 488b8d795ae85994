mod config;
mod render;

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{PanelClient, PanelEvent};
use shared::domain::{DeviceState, Schedule};
use tokio::sync::broadcast;
use tracing::warn;

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the topup device, e.g. http://192.168.1.50
    #[arg(long)]
    device_url: Option<String>,
    /// Seconds between stats polls
    #[arg(long)]
    poll_period: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every state change until interrupted
    Watch,
    /// Fetch and print one state snapshot
    Status,
    /// Turn the pump on or off
    Pump { state: PumpSwitch },
    /// Set the water level at which auto-topup fires
    SetTrigger { level: i64 },
    /// Fire a manual topup
    TopUp,
    /// Set the weekly topup schedule
    Schedule {
        /// Comma-separated day names, e.g. mon,wed,fri
        #[arg(long)]
        days: String,
        /// Time of day as HH:MM
        #[arg(long)]
        time: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PumpSwitch {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings(args.device_url, args.poll_period)?;

    let client = PanelClient::with_poll_period(
        settings.device_url,
        Duration::from_secs(settings.poll_period_seconds),
    );
    let mut events = client.subscribe_events();
    client.start().await;

    match args.command {
        Command::Watch => watch(&mut events).await,
        Command::Status => show_refreshed(&client, &mut events).await,
        Command::Pump { state } => {
            wait_first_poll(&mut events).await?;
            client.set_pump(matches!(state, PumpSwitch::On)).await;
            show_refreshed(&client, &mut events).await
        }
        Command::SetTrigger { level } => {
            wait_first_poll(&mut events).await?;
            client.set_trigger_level(level).await;
            show_refreshed(&client, &mut events).await
        }
        Command::TopUp => {
            wait_first_poll(&mut events).await?;
            client.manual_top_up().await;
            show_refreshed(&client, &mut events).await
        }
        Command::Schedule { days, time } => {
            let weekdays = render::parse_days(&days)?;
            let (hours, minutes) = render::parse_time(&time)?;
            let schedule = Schedule::new(weekdays, hours, minutes)?;
            wait_first_poll(&mut events).await?;
            client.set_schedule(&schedule).await;
            show_refreshed(&client, &mut events).await
        }
    }
}

async fn watch(events: &mut broadcast::Receiver<PanelEvent>) -> Result<()> {
    loop {
        match events.recv().await {
            Ok(PanelEvent::StateChanged(state)) => {
                println!("{}\n", render::render_state(&state));
            }
            Ok(PanelEvent::Notice(text)) => println!("device: {text}"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("dropped {skipped} panel events");
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}

/// Waits for the snapshot from the next completed poll, echoing any device
/// notices that arrive in the meantime.
async fn next_snapshot(events: &mut broadcast::Receiver<PanelEvent>) -> Result<DeviceState> {
    loop {
        match tokio::time::timeout(Duration::from_secs(15), events.recv()).await {
            Ok(Ok(PanelEvent::StateChanged(state))) => return Ok(state),
            Ok(Ok(PanelEvent::Notice(text))) => println!("device: {text}"),
            Ok(Err(err)) => return Err(anyhow!("event stream closed: {err}")),
            Err(_) => return Err(anyhow!("timed out waiting for a device snapshot")),
        }
    }
}

async fn wait_first_poll(events: &mut broadcast::Receiver<PanelEvent>) -> Result<()> {
    next_snapshot(events).await.map(|_| ())
}

async fn show_refreshed(
    client: &PanelClient,
    events: &mut broadcast::Receiver<PanelEvent>,
) -> Result<()> {
    let state = next_snapshot(events).await?;
    println!("{}", render::render_state(&state));
    client.stop().await;
    Ok(())
}
