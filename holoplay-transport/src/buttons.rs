//! Front-panel buttons
//!
//! Every input report starts with the button mask, so polling is just a read
//! of the next report. Unlike flash reads there is nothing to correlate.

use std::fmt;

use tracing::trace;

use crate::error::{ProtocolError, ReadError};
use crate::protocol::{BUTTON_MASK, INPUT_REPORT_SIZE};
use crate::types::ReadTimeout;
use crate::Transport;

/// Physical buttons, in mask bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Square,
    Left,
    Right,
    Circle,
}

impl Button {
    pub const ALL: [Button; 4] = [Button::Square, Button::Left, Button::Right, Button::Circle];

    pub fn bit(self) -> u8 {
        match self {
            Button::Square => 0x01,
            Button::Left => 0x02,
            Button::Right => 0x04,
            Button::Circle => 0x08,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Button::Square => "square",
            Button::Left => "left",
            Button::Right => "right",
            Button::Circle => "circle",
        }
    }
}

/// Momentary 4-bit button mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState(u8);

impl ButtonState {
    /// Build from a raw mask; bits above the low nibble are dropped
    pub fn from_mask(mask: u8) -> Self {
        Self(mask & BUTTON_MASK)
    }

    pub fn mask(self) -> u8 {
        self.0
    }

    pub fn is_pressed(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn pressed(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |b| self.is_pressed(*b))
    }
}

impl fmt::Display for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

/// Block until the next input report and return its button mask.
///
/// A report that arrives split gets one non-blocking top-up read. Only the
/// first byte is needed, so a short report is still usable; an empty one is
/// an error.
pub fn poll_buttons(transport: &dyn Transport) -> Result<ButtonState, ReadError> {
    let mut report = transport.read(INPUT_REPORT_SIZE, ReadTimeout::Blocking)?;
    if report.len() < INPUT_REPORT_SIZE {
        let rest = transport.read(INPUT_REPORT_SIZE - report.len(), ReadTimeout::NON_BLOCKING)?;
        report.extend_from_slice(&rest);
    }

    let first = *report.first().ok_or(ProtocolError::EmptyReport)?;
    let state = ButtonState::from_mask(first);
    trace!("Buttons: {}", state);
    Ok(state)
}
