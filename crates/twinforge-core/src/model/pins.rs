// ── Pin / telemetry model ──
//
// The local digital twin of the device's 40 GPIO pins. Pin identities are
// fixed for the lifetime of the board; only `used`/`working` mutate, and
// only through wholesale snapshot application.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Number of pins on the board. Always exactly this many records.
pub const PIN_COUNT: u8 = 40;

/// State of a single pin as last reported by telemetry.
///
/// `working` is meaningful only while `used` is true; snapshot application
/// keeps it false otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinState {
    pub pin: u8,
    pub used: bool,
    pub working: bool,
}

impl PinState {
    pub fn display(&self) -> PinDisplay {
        PinDisplay::derive(self.used, self.working)
    }
}

/// Display tri-state for a pin. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinDisplay {
    Unused,
    Working,
    Error,
}

impl PinDisplay {
    /// The tri-state derivation rule. Total over both inputs; the legend
    /// aggregation below reuses it so the two can never diverge.
    pub fn derive(used: bool, working: bool) -> Self {
        if !used {
            Self::Unused
        } else if working {
            Self::Working
        } else {
            Self::Error
        }
    }
}

/// Aggregate pin counts for the display legend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PinLegend {
    pub unused: usize,
    pub working: usize,
    pub error: usize,
}

/// The full 40-pin board state.
#[derive(Debug, Clone, Serialize)]
pub struct PinBoard {
    pins: Vec<PinState>,
}

impl Default for PinBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PinBoard {
    /// A board with all pins unused.
    pub fn new() -> Self {
        Self {
            pins: (0..PIN_COUNT)
                .map(|pin| PinState {
                    pin,
                    used: false,
                    working: false,
                })
                .collect(),
        }
    }

    /// Recompute every pin from a telemetry snapshot of pin -> logic level.
    ///
    /// Pins absent from the snapshot become unused. A reported level of
    /// 0 or 1 is healthy; any other value marks the pin as faulted.
    pub fn apply_snapshot(&mut self, levels: &HashMap<u8, i64>) {
        for state in &mut self.pins {
            match levels.get(&state.pin) {
                None => {
                    state.used = false;
                    state.working = false;
                }
                Some(level) => {
                    state.used = true;
                    state.working = matches!(level, 0 | 1);
                }
            }
        }
    }

    pub fn pins(&self) -> &[PinState] {
        &self.pins
    }

    pub fn get(&self, pin: u8) -> Option<&PinState> {
        self.pins.get(usize::from(pin))
    }

    /// Legend counts derived from the same tri-state rule as the display.
    pub fn legend(&self) -> PinLegend {
        let mut legend = PinLegend::default();
        for state in &self.pins {
            match state.display() {
                PinDisplay::Unused => legend.unused += 1,
                PinDisplay::Working => legend.working += 1,
                PinDisplay::Error => legend.error += 1,
            }
        }
        legend
    }
}
