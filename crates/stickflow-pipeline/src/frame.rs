//! Input and output frame types.
//!
//! [`InputSnapshot`] is the raw controller state read once per tick;
//! [`OutputFrame`] is what the rule chain edits and the sink receives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Digital controller buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    /// Left bumper
    L1,
    /// Right bumper
    R1,
    /// Left stick click
    L3,
    /// Right stick click
    R3,
    /// Triangle / Y
    Triangle,
    /// Square / X
    Square,
    /// Cross / A
    Cross,
    /// Circle / B
    Circle,
    /// D-pad up
    DpadUp,
    /// D-pad down
    DpadDown,
    /// D-pad left
    DpadLeft,
    /// D-pad right
    DpadRight,
    /// Options / Start
    Options,
    /// Share / Back
    Share,
    /// Touchpad click
    TouchClick,
}

impl Button {
    /// Every button, in bit order.
    pub const ALL: [Button; 15] = [
        Button::L1,
        Button::R1,
        Button::L3,
        Button::R3,
        Button::Triangle,
        Button::Square,
        Button::Cross,
        Button::Circle,
        Button::DpadUp,
        Button::DpadDown,
        Button::DpadLeft,
        Button::DpadRight,
        Button::Options,
        Button::Share,
        Button::TouchClick,
    ];

    #[inline]
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            Button::L1 => "L1",
            Button::R1 => "R1",
            Button::L3 => "L3",
            Button::R3 => "R3",
            Button::Triangle => "TRIANGLE",
            Button::Square => "SQUARE",
            Button::Cross => "CROSS",
            Button::Circle => "CIRCLE",
            Button::DpadUp => "DPAD_UP",
            Button::DpadDown => "DPAD_DOWN",
            Button::DpadLeft => "DPAD_LEFT",
            Button::DpadRight => "DPAD_RIGHT",
            Button::Options => "OPTIONS",
            Button::Share => "SHARE",
            Button::TouchClick => "TOUCH",
        }
    }

    /// Look a button up by name.
    ///
    /// Case and underscores are ignored, and the short D-pad forms (`DUP`)
    /// and transport forms (`dpadup`, `touchclick`) are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut key = [0u8; 16];
        let mut len = 0usize;
        for b in name.bytes().filter(|b| *b != b'_' && !b.is_ascii_whitespace()) {
            let slot = key.get_mut(len)?;
            *slot = b.to_ascii_uppercase();
            len += 1;
        }
        let key = key.get(..len)?;
        let button = match key {
            b"L1" => Button::L1,
            b"R1" => Button::R1,
            b"L3" => Button::L3,
            b"R3" => Button::R3,
            b"TRIANGLE" => Button::Triangle,
            b"SQUARE" => Button::Square,
            b"CROSS" => Button::Cross,
            b"CIRCLE" => Button::Circle,
            b"DPADUP" | b"DUP" => Button::DpadUp,
            b"DPADDOWN" | b"DDOWN" => Button::DpadDown,
            b"DPADLEFT" | b"DLEFT" => Button::DpadLeft,
            b"DPADRIGHT" | b"DRIGHT" => Button::DpadRight,
            b"OPTIONS" => Button::Options,
            b"SHARE" => Button::Share,
            b"TOUCH" | b"TOUCHCLICK" | b"TOUCHPAD" => Button::TouchClick,
            _ => return None,
        };
        Some(button)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Button::from_name(s).ok_or_else(|| format!("unknown button '{s}'"))
    }
}

/// Analog triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Left trigger
    L2,
    /// Right trigger
    R2,
}

/// Analog sticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stick {
    /// Left stick (movement)
    Left,
    /// Right stick (aim)
    #[default]
    Right,
}

/// Pressed-button set packed into one word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Buttons(u16);

impl Buttons {
    /// No buttons pressed.
    pub const NONE: Buttons = Buttons(0);

    /// Whether `button` is pressed.
    #[inline]
    pub fn get(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    /// Press or release `button`.
    #[inline]
    pub fn set(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.0 |= button.bit();
        } else {
            self.0 &= !button.bit();
        }
    }

    /// Builder form of [`Buttons::set`] pressing `button`.
    #[inline]
    pub fn with(mut self, button: Button) -> Self {
        self.set(button, true);
        self
    }

    /// Whether nothing is pressed.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Pressed buttons in bit order.
    pub fn pressed(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |b| self.get(*b))
    }
}

impl fmt::Debug for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.pressed()).finish()
    }
}

/// Read access to buttons and triggers, shared by input and output frames so
/// one [`crate::Condition`] can be evaluated against either.
pub trait ButtonView {
    /// Whether `button` is pressed.
    fn button(&self, button: Button) -> bool;
    /// Raw trigger value.
    fn trigger(&self, trigger: Trigger) -> u8;
}

/// Raw controller state as last written by the transport.
///
/// Sticks are bytes with 128 at centre and Y growing downward; triggers are
/// 0 (released) to 255 (fully pressed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Left stick X
    pub left_x: u8,
    /// Left stick Y
    pub left_y: u8,
    /// Right stick X
    pub right_x: u8,
    /// Right stick Y
    pub right_y: u8,
    /// Left trigger
    pub l2: u8,
    /// Right trigger
    pub r2: u8,
    /// Pressed buttons
    pub buttons: Buttons,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            left_x: 128,
            left_y: 128,
            right_x: 128,
            right_y: 128,
            l2: 0,
            r2: 0,
            buttons: Buttons::NONE,
        }
    }
}

impl InputSnapshot {
    /// Builder helper pressing `button`.
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.set(button, true);
        self
    }

    /// Builder helper setting a trigger.
    pub fn with_trigger(mut self, trigger: Trigger, value: u8) -> Self {
        match trigger {
            Trigger::L2 => self.l2 = value,
            Trigger::R2 => self.r2 = value,
        }
        self
    }
}

impl ButtonView for InputSnapshot {
    #[inline]
    fn button(&self, button: Button) -> bool {
        self.buttons.get(button)
    }

    #[inline]
    fn trigger(&self, trigger: Trigger) -> u8 {
        match trigger {
            Trigger::L2 => self.l2,
            Trigger::R2 => self.r2,
        }
    }
}

/// Conditioned controller state edited by the rule chain.
///
/// Stick axes are in `[-1, 1]` with Y positive upward. The chain enforces
/// that range after every rule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutputFrame {
    /// Left stick X
    pub left_x: f64,
    /// Left stick Y
    pub left_y: f64,
    /// Right stick X
    pub right_x: f64,
    /// Right stick Y
    pub right_y: f64,
    /// Left trigger
    pub l2: u8,
    /// Right trigger
    pub r2: u8,
    /// Pressed buttons
    pub buttons: Buttons,
}

impl OutputFrame {
    /// One stick's `(x, y)`.
    #[inline]
    pub fn stick(&self, stick: Stick) -> (f64, f64) {
        match stick {
            Stick::Left => (self.left_x, self.left_y),
            Stick::Right => (self.right_x, self.right_y),
        }
    }

    /// Overwrite one stick, clamping each axis to `[-1, 1]`.
    #[inline]
    pub fn set_stick(&mut self, stick: Stick, x: f64, y: f64) {
        let (x, y) = (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
        match stick {
            Stick::Left => {
                self.left_x = x;
                self.left_y = y;
            }
            Stick::Right => {
                self.right_x = x;
                self.right_y = y;
            }
        }
    }

    /// Add an offset to one stick, clamping the result.
    #[inline]
    pub fn offset_stick(&mut self, stick: Stick, dx: f64, dy: f64) {
        let (x, y) = self.stick(stick);
        self.set_stick(stick, x + dx, y + dy);
    }

    /// Press or release a button.
    #[inline]
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.buttons.set(button, pressed);
    }

    /// Whether every stick axis is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.left_x.is_finite()
            && self.left_y.is_finite()
            && self.right_x.is_finite()
            && self.right_y.is_finite()
    }

    /// Clamp every stick axis to `[-1, 1]`.
    #[inline]
    pub fn clamp_axes(&mut self) {
        self.left_x = self.left_x.clamp(-1.0, 1.0);
        self.left_y = self.left_y.clamp(-1.0, 1.0);
        self.right_x = self.right_x.clamp(-1.0, 1.0);
        self.right_y = self.right_y.clamp(-1.0, 1.0);
    }
}

impl ButtonView for OutputFrame {
    #[inline]
    fn button(&self, button: Button) -> bool {
        self.buttons.get(button)
    }

    #[inline]
    fn trigger(&self, trigger: Trigger) -> u8 {
        match trigger {
            Trigger::L2 => self.l2,
            Trigger::R2 => self.r2,
        }
    }
}
