//! Per-slot sample acquisition with the primary-slot fallback rule.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::sample::{PollError, PortPairing, RawSample, SampleSource};

/// Number of logical controller slots.
pub const SLOT_COUNT: usize = 4;

/// Fixed mapping from logical slot index to physical port number.
///
/// Set once at construction, read-only afterwards. The default maps the
/// four slots onto the extended ports `1..=4`; primitive port 0 is never
/// mapped directly, it only serves as the fallback target for slot 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortMap {
    pub ports: [u8; SLOT_COUNT],
}

impl Default for PortMap {
    fn default() -> Self {
        Self { ports: [1, 2, 3, 4] }
    }
}

/// Polls one raw sample per logical slot through a [`SampleSource`].
///
/// No caching, no buffering: every [`poll`](Self::poll) is one
/// synchronous acquisition, and a failed acquisition for slots 1-3 just
/// means "nothing available this tick" for the caller.
pub struct ControllerPoller<S> {
    source: S,
    port_map: PortMap,
}

impl<S: SampleSource> ControllerPoller<S> {
    pub fn new(source: S, port_map: PortMap) -> Self {
        Self { source, port_map }
    }

    /// Physical port mapped to a logical slot.
    pub fn port(&self, slot: usize) -> Result<u8, PollError> {
        self.port_map
            .ports
            .get(slot)
            .copied()
            .ok_or(PollError::InvalidSlot { slot })
    }

    /// Acquire the current sample for one logical slot.
    ///
    /// Slot 0 applies the primary-slot fallback rule: when the mapped
    /// port fails (nothing paired there yet), the same acquisition is
    /// retried on primitive port 0, so the first slot stays usable before
    /// any explicit pairing has happened. Slots 1-3 use their mapped port
    /// directly and surface the failure.
    pub fn poll(&mut self, slot: usize) -> Result<RawSample, PollError> {
        let port = self.port(slot)?;
        if slot == 0 {
            match self.source.sample(port) {
                Ok(sample) => Ok(sample),
                Err(e) => {
                    debug!("slot 0 port {port} failed ({e}), falling back to port 0");
                    self.source.sample(0)
                }
            }
        } else {
            self.source.sample(port)
        }
    }

    /// Startup pairing report from the backend.
    pub fn pairing(&mut self) -> PortPairing {
        self.source.port_pairing()
    }

    /// Rumble pass-through. Intensities are the usual 16-bit host range
    /// and get scaled down to the backend's 8-bit motors.
    pub fn rumble(&mut self, slot: usize, low_frequency: u16, high_frequency: u16) -> Result<(), PollError> {
        let port = self.port(slot)?;
        let small = (high_frequency / 256) as u8;
        let large = (low_frequency / 256) as u8;
        self.source.set_actuator(port, small, large)
    }

    /// Light bar pass-through.
    pub fn set_light(&mut self, slot: usize, r: u8, g: u8, b: u8) -> Result<(), PollError> {
        let port = self.port(slot)?;
        self.source.set_light(port, r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Backend scripted per test: per-port samples, ports that fail, and
    /// a log of every call made.
    #[derive(Default)]
    struct ScriptedSource {
        samples: HashMap<u8, RawSample>,
        sampled_ports: Vec<u8>,
        actuator_calls: Vec<(u8, u8, u8)>,
        light_calls: Vec<(u8, u8, u8, u8)>,
    }

    impl ScriptedSource {
        fn with_sample(mut self, port: u8, sample: RawSample) -> Self {
            self.samples.insert(port, sample);
            self
        }
    }

    impl SampleSource for ScriptedSource {
        fn sample(&mut self, port: u8) -> Result<RawSample, PollError> {
            self.sampled_ports.push(port);
            self.samples
                .get(&port)
                .copied()
                .ok_or(PollError::PortUnavailable { port })
        }

        fn set_actuator(&mut self, port: u8, small: u8, large: u8) -> Result<(), PollError> {
            self.actuator_calls.push((port, small, large));
            Ok(())
        }

        fn set_light(&mut self, port: u8, r: u8, g: u8, b: u8) -> Result<(), PollError> {
            self.light_calls.push((port, r, g, b));
            Ok(())
        }
    }

    fn sample_with_lx(lx: u8) -> RawSample {
        RawSample { lx, ..RawSample::default() }
    }

    #[test]
    fn slot0_uses_mapped_port_when_available() {
        let source = ScriptedSource::default().with_sample(1, sample_with_lx(10));
        let mut poller = ControllerPoller::new(source, PortMap::default());

        let sample = poller.poll(0).expect("mapped port was scripted");
        assert_eq!(sample.lx, 10);
        assert_eq!(poller.source.sampled_ports, vec![1]);
    }

    #[test]
    fn slot0_falls_back_to_primitive_port() {
        // Nothing paired on port 1, but the built-in port answers.
        let source = ScriptedSource::default().with_sample(0, sample_with_lx(42));
        let mut poller = ControllerPoller::new(source, PortMap::default());

        let sample = poller.poll(0).expect("fallback port was scripted");
        assert_eq!(sample.lx, 42);
        assert_eq!(poller.source.sampled_ports, vec![1, 0]);
    }

    #[test]
    fn secondary_slots_surface_failure_without_fallback() {
        let source = ScriptedSource::default().with_sample(0, sample_with_lx(42));
        let mut poller = ControllerPoller::new(source, PortMap::default());

        let err = poller.poll(1).expect_err("port 2 is not scripted");
        assert!(matches!(err, PollError::PortUnavailable { port: 2 }));
        // Exactly one acquisition, no retry on port 0.
        assert_eq!(poller.source.sampled_ports, vec![2]);
    }

    #[test]
    fn custom_port_map_is_respected() {
        let source = ScriptedSource::default().with_sample(7, sample_with_lx(3));
        let map = PortMap { ports: [1, 7, 3, 4] };
        let mut poller = ControllerPoller::new(source, map);

        let sample = poller.poll(1).expect("remapped port was scripted");
        assert_eq!(sample.lx, 3);
        assert_eq!(poller.source.sampled_ports, vec![7]);
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let mut poller = ControllerPoller::new(ScriptedSource::default(), PortMap::default());
        assert!(matches!(poller.poll(4), Err(PollError::InvalidSlot { slot: 4 })));
        assert!(poller.source.sampled_ports.is_empty());
    }

    #[test]
    fn rumble_scales_to_backend_range() {
        let mut poller = ControllerPoller::new(ScriptedSource::default(), PortMap::default());
        poller.rumble(2, 0x1234, 0xFF00).expect("scripted actuator accepts");
        assert_eq!(poller.source.actuator_calls, vec![(3, 0xFF, 0x12)]);
    }

    #[test]
    fn light_routes_through_port_map() {
        let mut poller = ControllerPoller::new(ScriptedSource::default(), PortMap::default());
        poller.set_light(0, 1, 2, 3).expect("scripted light accepts");
        assert_eq!(poller.source.light_calls, vec![(1, 1, 2, 3)]);
    }
}
