//! Driver pump - the per-tick polling loop.
//!
//! Owns the poller, curve table and diff engine, and once per tick polls
//! every active slot, diffs the sample and delivers the resulting events
//! over an mpsc channel. A slot whose poll fails is skipped for that tick
//! and resumes on its next successful poll.

use std::time::{Duration, Instant};

use chrono::Local;
use statum::{machine, state};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::config::DriverConfig;
use crate::curve::CurveTable;
use crate::driver::diff::{ChangeEvent, DiffEngine};
use crate::driver::poller::{ControllerPoller, SLOT_COUNT};
use crate::driver::sample::SampleSource;

/// A change event tagged with the logical slot it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotEvent {
    pub slot: u8,
    pub event: ChangeEvent,
}

/// Pump errors.
#[derive(Debug, thiserror::Error)]
pub enum PumpError {
    #[error("failed to initialize pump: {0}")]
    InitializationError(String),

    #[error("event channel closed: {0}")]
    ChannelClosed(String),
}

/// Boxed backend so the pump machine stays non-generic.
pub type BoxedSource = Box<dyn SampleSource + Send>;

// Pump lifecycle states
#[state]
#[derive(Debug, Clone)]
pub enum PumpState {
    Initializing,
    Polling,
}

#[machine]
pub struct DriverPump<S: PumpState> {
    poller: ControllerPoller<BoxedSource>,
    table: CurveTable,
    diff: DiffEngine,
    event_sender: mpsc::Sender<SlotEvent>,
    tick_interval_ms: u64,
    active_slots: Vec<usize>,
    started: Instant,
}

impl DriverPump<Initializing> {
    pub fn create(
        source: BoxedSource,
        config: &DriverConfig,
        event_sender: mpsc::Sender<SlotEvent>,
    ) -> Result<Self, PumpError> {
        debug!("Creating driver pump with config: {:?}", config);

        let table = config.curve.table();
        let diff = DiffEngine::new(config.button_map.clone());
        let poller = ControllerPoller::new(source, config.port_map);

        Ok(Self::new(
            poller,
            table,
            diff,
            event_sender,
            config.tick_interval_ms,
            Vec::new(),
            Instant::now(),
        ))
    }

    /// Query the backend's pairing report once and decide which logical
    /// slots take part in the tick loop.
    ///
    /// Slot 0 is always active, even with nothing paired, so a pad paired
    /// after startup is controllable immediately through the fallback
    /// port. The remaining slots join only when their mapped port reports
    /// a paired pad.
    pub fn initialize(mut self) -> Result<DriverPump<Polling>, PumpError> {
        let pairing = self.poller.pairing();

        let mut active = vec![0usize];
        for slot in 1..SLOT_COUNT {
            let port = self
                .poller
                .port(slot)
                .map_err(|e| PumpError::InitializationError(e.to_string()))?;
            if pairing
                .paired
                .get(port as usize)
                .copied()
                .unwrap_or(false)
            {
                active.push(slot);
            }
        }

        info!(
            "Driver pump initialized, {} active slot(s): {:?}",
            active.len(),
            active
        );
        self.active_slots = active;
        self.started = Instant::now();
        Ok(self.transition())
    }
}

impl DriverPump<Polling> {
    /// Run the tick loop until the consumer goes away.
    pub async fn run(mut self) -> Result<(), PumpError> {
        info!(
            "Starting driver pump loop at {}ms per tick",
            self.tick_interval_ms
        );
        let mut ticker = interval(Duration::from_millis(self.tick_interval_ms.max(1)));

        // Throughput stats, logged every 10s
        let mut events_sent: u64 = 0;
        let mut last_log_time = Local::now();
        let log_interval = chrono::Duration::seconds(10);

        loop {
            ticker.tick().await;
            let timestamp = self.started.elapsed().as_nanos() as u64;

            for idx in 0..self.active_slots.len() {
                let slot = self.active_slots[idx];
                let raw = match self.poller.poll(slot) {
                    Ok(raw) => raw,
                    Err(e) => {
                        // Not fatal: the pad is simply unavailable this
                        // tick and will resume diffing once it answers.
                        debug!("slot {slot}: no sample this tick ({e})");
                        continue;
                    }
                };

                for event in self.diff.update(slot, raw, &self.table, timestamp) {
                    let tagged = SlotEvent {
                        slot: slot as u8,
                        event,
                    };
                    if self.event_sender.send(tagged).await.is_err() {
                        warn!("Event channel closed, stopping driver pump");
                        return Err(PumpError::ChannelClosed(
                            "consumer dropped the event receiver".to_string(),
                        ));
                    }
                    events_sent += 1;
                }
            }

            let now = Local::now();
            if now - last_log_time > log_interval {
                info!(
                    "Driver pump stats: {} events in last {} seconds",
                    events_sent,
                    log_interval.num_seconds()
                );
                events_sent = 0;
                last_log_time = now;
            }
        }
    }
}

/// Public handle for the running pump, in the spawn-and-forget style of
/// the rest of the driver.
pub struct PumpHandle {
    event_sender: mpsc::Sender<SlotEvent>,
}

impl PumpHandle {
    /// Create the pump and spawn its tick loop as a tokio task.
    pub fn spawn(
        source: BoxedSource,
        config: Option<DriverConfig>,
        event_sender: mpsc::Sender<SlotEvent>,
    ) -> Result<Self, PumpError> {
        let config = config.unwrap_or_default();
        info!("Spawning driver pump");

        let sender_clone = event_sender.clone();
        let pump = DriverPump::create(source, &config, event_sender)?;

        tokio::spawn(async move {
            match pump.initialize() {
                Ok(polling) => {
                    if let Err(e) = polling.run().await {
                        error!("Driver pump terminated: {e}");
                    }
                }
                Err(e) => error!("Failed to initialize driver pump: {e}"),
            }
        });

        Ok(Self {
            event_sender: sender_clone,
        })
    }

    /// Sender side of the event channel, for feeding synthetic events.
    pub fn event_sender(&self) -> mpsc::Sender<SlotEvent> {
        self.event_sender.clone()
    }
}
