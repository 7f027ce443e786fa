use color_eyre::eyre::eyre;
use color_eyre::Result;
use padstream::config::DriverConfig;
use padstream::driver::{ChangeEvent, GamepadSource, PumpHandle};
use tokio::sync::mpsc;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = DriverConfig::load_or_default();
    info!(
        "Starting driver pump ({} buttons mapped, tick every {}ms)",
        config.button_map.len(),
        config.tick_interval_ms
    );

    let source =
        GamepadSource::new().map_err(|e| eyre!("Failed to initialize gamepad backend: {e}"))?;

    let (event_tx, mut event_rx) = mpsc::channel(1000);
    let _pump = PumpHandle::spawn(Box::new(source), Some(config), event_tx)
        .map_err(|e| eyre!("Failed to spawn driver pump: {e}"))?;

    // Event sink: log everything the driver emits.
    while let Some(slot_event) = event_rx.recv().await {
        match slot_event.event {
            ChangeEvent::AxisChanged {
                axis,
                value,
                timestamp,
            } => {
                debug!(
                    "slot {} axis {} -> {} ({}ns)",
                    slot_event.slot, axis, value, timestamp
                );
            }
            ChangeEvent::ButtonChanged {
                button,
                pressed,
                timestamp,
            } => {
                info!(
                    "slot {} button {} {} ({}ns)",
                    slot_event.slot,
                    button,
                    if pressed { "pressed" } else { "released" },
                    timestamp
                );
            }
        }
    }

    info!("Event channel closed, shutting down");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
