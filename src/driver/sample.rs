//! Raw sample shape and the backend acquisition trait.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bitmask layout of the raw button word, one bit per physical button.
pub mod button {
    pub const SELECT: u32 = 0x0000_0001;
    pub const L3: u32 = 0x0000_0002;
    pub const R3: u32 = 0x0000_0004;
    pub const START: u32 = 0x0000_0008;
    pub const DPAD_UP: u32 = 0x0000_0010;
    pub const DPAD_RIGHT: u32 = 0x0000_0020;
    pub const DPAD_DOWN: u32 = 0x0000_0040;
    pub const DPAD_LEFT: u32 = 0x0000_0080;
    pub const L2: u32 = 0x0000_0100;
    pub const R2: u32 = 0x0000_0200;
    pub const L1: u32 = 0x0000_0400;
    pub const R1: u32 = 0x0000_0800;
    pub const NORTH: u32 = 0x0000_1000;
    pub const EAST: u32 = 0x0000_2000;
    pub const SOUTH: u32 = 0x0000_4000;
    pub const WEST: u32 = 0x0000_8000;
}

/// One snapshot of a controller port.
///
/// Ephemeral; overwritten on every poll. The all-zero default doubles as
/// the "never seen a sample" baseline the diff engine starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    pub lx: u8,
    pub ly: u8,
    pub rx: u8,
    pub ry: u8,
    pub lt: u8,
    pub rt: u8,
    pub buttons: u32,
}

/// Number of axis channels in a [`RawSample`], diffed in the fixed order
/// `lx, ly, rx, ry, lt, rt` (indices 0-5).
pub const AXIS_COUNT: usize = 6;

/// Ordered association of externally visible button indices with raw
/// bitmask bits. The position of an entry IS its reported button index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonMap {
    masks: Vec<u32>,
}

impl ButtonMap {
    pub fn new(masks: Vec<u32>) -> Self {
        Self { masks }
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// `(button_index, raw_bitmask)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.masks.iter().copied().enumerate()
    }
}

impl Default for ButtonMap {
    /// The standard 16-button pad layout.
    fn default() -> Self {
        Self::new(vec![
            button::NORTH,
            button::EAST,
            button::SOUTH,
            button::WEST,
            button::L1,
            button::R1,
            button::DPAD_DOWN,
            button::DPAD_LEFT,
            button::DPAD_UP,
            button::DPAD_RIGHT,
            button::SELECT,
            button::START,
            button::L2,
            button::R2,
            button::L3,
            button::R3,
        ])
    }
}

/// Pairing state of the physical ports, queried once at startup.
///
/// Index is the primitive port number (`0..=4`). Port 0 is the built-in
/// port and is treated as always addressable whether or not a pad is
/// reported paired on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PortPairing {
    pub paired: [bool; 5],
}

/// Acquisition failures reported by a [`SampleSource`].
#[derive(Debug, Error)]
pub enum PollError {
    /// The backend could not produce a sample for this port, typically
    /// because no pad is paired there.
    #[error("port {port} unavailable")]
    PortUnavailable { port: u8 },

    /// Logical slot outside the supported range.
    #[error("invalid slot index {slot}")]
    InvalidSlot { slot: usize },

    /// The backend does not implement this command at all.
    #[error("not supported by this backend")]
    Unsupported,

    /// Anything else the backend wants to surface.
    #[error("backend error: {0}")]
    Backend(String),
}

/// The platform acquisition primitive, one synchronous call per sample.
///
/// Implementations hold whatever backend handle they need; the poller and
/// pump only ever talk to ports through this trait, which keeps the
/// diffing pipeline testable with scripted sources.
pub trait SampleSource {
    /// Acquire the current sample for one physical port.
    fn sample(&mut self, port: u8) -> Result<RawSample, PollError>;

    /// Report which ports have paired pads. Called once at startup;
    /// backends without pairing metadata can leave the default.
    fn port_pairing(&mut self) -> PortPairing {
        PortPairing::default()
    }

    /// One-shot rumble command, 8-bit motor intensities.
    fn set_actuator(&mut self, _port: u8, _small: u8, _large: u8) -> Result<(), PollError> {
        Err(PollError::Unsupported)
    }

    /// One-shot light bar color command.
    fn set_light(&mut self, _port: u8, _r: u8, _g: u8, _b: u8) -> Result<(), PollError> {
        Err(PollError::Unsupported)
    }
}

impl<T: SampleSource + ?Sized> SampleSource for Box<T> {
    fn sample(&mut self, port: u8) -> Result<RawSample, PollError> {
        (**self).sample(port)
    }

    fn port_pairing(&mut self) -> PortPairing {
        (**self).port_pairing()
    }

    fn set_actuator(&mut self, port: u8, small: u8, large: u8) -> Result<(), PollError> {
        (**self).set_actuator(port, small, large)
    }

    fn set_light(&mut self, port: u8, r: u8, g: u8, b: u8) -> Result<(), PollError> {
        (**self).set_light(port, r, g, b)
    }
}
