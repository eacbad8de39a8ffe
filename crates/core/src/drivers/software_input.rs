//! Input state fed by the host UI
//!
//! Buttons and axes are plain atomics so the host can update them from its
//! own thread while the Core polls on the worker.

use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use retrorunner_sdk::{
    RETRO_DEVICE_ANALOG, RETRO_DEVICE_ID_JOYPAD_MASK, RETRO_DEVICE_JOYPAD, RETRO_DEVICE_MASK,
};

use super::InputSink;

/// Ports with storage
pub const MAX_PORTS: usize = 8;

/// Joypad buttons per port
const BUTTONS: u32 = 16;

/// Analog sticks (left, right, buttons) times two axes
const AXES: usize = 6;

#[derive(Debug)]
struct PortState {
    buttons: AtomicU16,
    /// `f32` bit patterns
    axes: [AtomicU32; AXES],
}

impl Default for PortState {
    fn default() -> Self {
        Self {
            buttons: AtomicU16::new(0),
            axes: std::array::from_fn(|_| AtomicU32::new(0f32.to_bits())),
        }
    }
}

#[derive(Debug)]
pub struct SoftwareInput {
    ports: [PortState; MAX_PORTS],
    users: AtomicU32,
}

impl Default for SoftwareInput {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareInput {
    pub fn new() -> Self {
        Self {
            ports: std::array::from_fn(|_| PortState::default()),
            users: AtomicU32::new(MAX_PORTS as u32),
        }
    }

    fn port(&self, port: u32) -> Option<&PortState> {
        if port >= self.users.load(Ordering::Relaxed) {
            return None;
        }
        self.ports.get(port as usize)
    }
}

impl InputSink for SoftwareInput {
    fn init(&self, max_users: u32) {
        let users = max_users.min(MAX_PORTS as u32);
        for port in &self.ports {
            port.buttons.store(0, Ordering::Relaxed);
            for axis in &port.axes {
                axis.store(0f32.to_bits(), Ordering::Relaxed);
            }
        }
        self.users.store(users, Ordering::Relaxed);
        tracing::debug!("Software input ready for {} users", users);
    }

    fn state(&self, port: u32, device: u32, index: u32, id: u32) -> i16 {
        let Some(state) = self.port(port) else {
            return 0;
        };

        match device & RETRO_DEVICE_MASK {
            RETRO_DEVICE_JOYPAD => {
                let buttons = state.buttons.load(Ordering::Relaxed);
                if id == RETRO_DEVICE_ID_JOYPAD_MASK {
                    buttons as i16
                } else if id < BUTTONS {
                    ((buttons >> id) & 1) as i16
                } else {
                    0
                }
            }
            RETRO_DEVICE_ANALOG => {
                let slot = (index * 2 + id) as usize;
                if id > 1 || slot >= AXES {
                    return 0;
                }
                let value = f32::from_bits(state.axes[slot].load(Ordering::Relaxed));
                (value * i16::MAX as f32) as i16
            }
            _ => 0,
        }
    }

    fn update_button(&self, port: u32, button: u32, pressed: bool) -> bool {
        let Some(state) = self.port(port) else {
            return false;
        };
        if button >= BUTTONS {
            return false;
        }
        let bit = 1u16 << button;
        if pressed {
            state.buttons.fetch_or(bit, Ordering::Relaxed);
        } else {
            state.buttons.fetch_and(!bit, Ordering::Relaxed);
        }
        true
    }

    fn update_axis(&self, port: u32, index: u32, axis: u32, value: f32) -> bool {
        let Some(state) = self.port(port) else {
            return false;
        };
        let slot = (index * 2 + axis) as usize;
        if axis > 1 || slot >= AXES || value.is_nan() {
            return false;
        }
        state.axes[slot].store(value.clamp(-1.0, 1.0).to_bits(), Ordering::Relaxed);
        true
    }
}
