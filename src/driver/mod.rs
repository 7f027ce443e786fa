//! Controller driver subsystem.
//!
//! Normalizes raw per-port samples into a platform-neutral change-event
//! stream:
//!
//! 1. [`sample`] - raw sample shape and the backend acquisition trait
//! 2. [`poller`] - per-slot acquisition with the primary-slot fallback
//! 3. [`diff`] - per-slot change detection through the response curve
//! 4. [`pump`] - the tick loop delivering events to the consumer
//!
//! # Architecture
//!
//! ```text
//! Backend ──► Poller ──► DiffEngine ──► SlotEvent channel
//!             (RawSample) (ChangeEvents)
//! ```
//!
//! The curve table and all slot state are owned by the pump instance;
//! nothing in here is process-global.

pub mod diff;
pub mod gamepad;
pub mod poller;
pub mod pump;
pub mod sample;

pub use diff::{ChangeEvent, DiffEngine};
pub use gamepad::GamepadSource;
pub use poller::{ControllerPoller, PortMap, SLOT_COUNT};
pub use pump::{BoxedSource, DriverPump, PumpError, PumpHandle, SlotEvent};
pub use sample::{button, ButtonMap, PollError, PortPairing, RawSample, SampleSource, AXIS_COUNT};
