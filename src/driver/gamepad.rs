//! Desktop gamepad backend.
//!
//! Adapts pads reachable through gilrs to the fixed raw-sample shape, so
//! the same pump and diff pipeline runs against ordinary USB/Bluetooth
//! controllers. Physical port `n` is the `n`-th connected pad, with port
//! 0 doubling as the first pad the way the built-in port does on the
//! handheld this layout comes from.

use gilrs::{Axis, Button, Gamepad, Gilrs};
use tracing::{debug, info};

use crate::driver::sample::{button, PollError, PortPairing, RawSample, SampleSource};

pub struct GamepadSource {
    gilrs: Gilrs,
}

impl GamepadSource {
    pub fn new() -> Result<Self, PollError> {
        info!("Initializing gilrs gamepad backend");
        let gilrs = Gilrs::new().map_err(|e| PollError::Backend(e.to_string()))?;
        for (id, pad) in gilrs.gamepads() {
            info!("Found gamepad {id}: {}", pad.name());
        }
        Ok(Self { gilrs })
    }

    // Ports 0 and 1 are both the first pad.
    fn pad_index(port: u8) -> usize {
        port.saturating_sub(1) as usize
    }
}

// Stick value in [-1, 1] to a raw byte, 128 at rest.
fn stick_byte(value: f32) -> u8 {
    (value.clamp(-1.0, 1.0) * 127.5 + 127.5) as u8
}

// Trigger value in [0, 1] to a raw byte.
fn trigger_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

fn trigger_value(pad: &Gamepad<'_>, btn: Button) -> f32 {
    pad.button_data(btn).map(|d| d.value()).unwrap_or(0.0)
}

fn button_word(pad: &Gamepad<'_>) -> u32 {
    const MAP: [(Button, u32); 16] = [
        (Button::North, button::NORTH),
        (Button::East, button::EAST),
        (Button::South, button::SOUTH),
        (Button::West, button::WEST),
        (Button::LeftTrigger, button::L1),
        (Button::RightTrigger, button::R1),
        (Button::LeftTrigger2, button::L2),
        (Button::RightTrigger2, button::R2),
        (Button::DPadUp, button::DPAD_UP),
        (Button::DPadDown, button::DPAD_DOWN),
        (Button::DPadLeft, button::DPAD_LEFT),
        (Button::DPadRight, button::DPAD_RIGHT),
        (Button::Select, button::SELECT),
        (Button::Start, button::START),
        (Button::LeftThumb, button::L3),
        (Button::RightThumb, button::R3),
    ];

    let mut word = 0;
    for (btn, mask) in MAP {
        if pad.is_pressed(btn) {
            word |= mask;
        }
    }
    word
}

impl SampleSource for GamepadSource {
    fn sample(&mut self, port: u8) -> Result<RawSample, PollError> {
        // Drain pending events so the cached gamepad state is current.
        while self.gilrs.next_event().is_some() {}

        let index = Self::pad_index(port);
        let (_, pad) = self
            .gilrs
            .gamepads()
            .nth(index)
            .ok_or(PollError::PortUnavailable { port })?;

        Ok(RawSample {
            lx: stick_byte(pad.value(Axis::LeftStickX)),
            // Raw pad convention has +y pointing down.
            ly: stick_byte(-pad.value(Axis::LeftStickY)),
            rx: stick_byte(pad.value(Axis::RightStickX)),
            ry: stick_byte(-pad.value(Axis::RightStickY)),
            lt: trigger_byte(trigger_value(&pad, Button::LeftTrigger2)),
            rt: trigger_byte(trigger_value(&pad, Button::RightTrigger2)),
            buttons: button_word(&pad),
        })
    }

    fn port_pairing(&mut self) -> PortPairing {
        let mut pairing = PortPairing::default();
        for (i, _) in self.gilrs.gamepads().enumerate().take(4) {
            pairing.paired[i + 1] = true;
        }
        pairing.paired[0] = pairing.paired[1];
        debug!("Gamepad pairing report: {:?}", pairing.paired);
        pairing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stick_bytes_cover_full_range() {
        assert_eq!(stick_byte(-1.0), 0);
        assert_eq!(stick_byte(1.0), 255);
        assert_eq!(stick_byte(0.0), 127);
        // Out-of-range backend values clamp instead of wrapping.
        assert_eq!(stick_byte(-2.0), 0);
        assert_eq!(stick_byte(2.0), 255);
    }

    #[test]
    fn trigger_bytes_cover_full_range() {
        assert_eq!(trigger_byte(0.0), 0);
        assert_eq!(trigger_byte(1.0), 255);
        assert_eq!(trigger_byte(0.5), 127);
    }

    #[test]
    fn port_zero_and_one_share_the_first_pad() {
        assert_eq!(GamepadSource::pad_index(0), 0);
        assert_eq!(GamepadSource::pad_index(1), 0);
        assert_eq!(GamepadSource::pad_index(2), 1);
        assert_eq!(GamepadSource::pad_index(4), 3);
    }
}
