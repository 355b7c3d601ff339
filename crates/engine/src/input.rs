//! Shared input state written by the transport thread.
//!
//! The transport owns decoding; this module only holds the latest values. The
//! tick thread copies a snapshot once per tick and never waits on anything
//! but the short critical section below.

use parking_lot::Mutex;
use stickflow_pipeline::{Button, InputSnapshot};

/// One named value from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputUpdate {
    /// Left stick X byte
    LeftX(u8),
    /// Left stick Y byte
    LeftY(u8),
    /// Right stick X byte
    RightX(u8),
    /// Right stick Y byte
    RightY(u8),
    /// Left trigger byte
    L2(u8),
    /// Right trigger byte
    R2(u8),
    /// A digital button
    Button(Button, bool),
}

impl InputUpdate {
    /// Map a transport field name to an update.
    ///
    /// Names are matched case-insensitively. Axis and trigger values are
    /// clamped to `0..=255`; a button counts as pressed for any value above
    /// zero. Returns `None` for names the pipeline does not track.
    ///
    /// ```
    /// use stickflow_engine::InputUpdate;
    /// use stickflow_pipeline::Button;
    ///
    /// assert_eq!(InputUpdate::from_named("rx", 300), Some(InputUpdate::RightX(255)));
    /// assert_eq!(InputUpdate::from_named("R1", 1), Some(InputUpdate::Button(Button::R1, true)));
    /// assert_eq!(InputUpdate::from_named("gyro_x", 12), None);
    /// ```
    pub fn from_named(name: &str, value: i32) -> Option<Self> {
        let byte = u8::try_from(value.clamp(0, 255)).unwrap_or(u8::MAX);
        let pressed = value > 0;
        let update = match name.to_ascii_lowercase().as_str() {
            "lx" => InputUpdate::LeftX(byte),
            "ly" => InputUpdate::LeftY(byte),
            "rx" => InputUpdate::RightX(byte),
            "ry" => InputUpdate::RightY(byte),
            "l2" => InputUpdate::L2(byte),
            "r2" => InputUpdate::R2(byte),
            "l1" => InputUpdate::Button(Button::L1, pressed),
            "r1" => InputUpdate::Button(Button::R1, pressed),
            "l3" => InputUpdate::Button(Button::L3, pressed),
            "r3" => InputUpdate::Button(Button::R3, pressed),
            "triangle" => InputUpdate::Button(Button::Triangle, pressed),
            "square" => InputUpdate::Button(Button::Square, pressed),
            "cross" => InputUpdate::Button(Button::Cross, pressed),
            "circle" => InputUpdate::Button(Button::Circle, pressed),
            "dpadup" => InputUpdate::Button(Button::DpadUp, pressed),
            "dpaddown" => InputUpdate::Button(Button::DpadDown, pressed),
            "dpadleft" => InputUpdate::Button(Button::DpadLeft, pressed),
            "dpadright" => InputUpdate::Button(Button::DpadRight, pressed),
            "options" => InputUpdate::Button(Button::Options, pressed),
            "share" => InputUpdate::Button(Button::Share, pressed),
            "touchclick" => InputUpdate::Button(Button::TouchClick, pressed),
            _ => return None,
        };
        Some(update)
    }

    fn apply_to(self, snapshot: &mut InputSnapshot) {
        match self {
            InputUpdate::LeftX(v) => snapshot.left_x = v,
            InputUpdate::LeftY(v) => snapshot.left_y = v,
            InputUpdate::RightX(v) => snapshot.right_x = v,
            InputUpdate::RightY(v) => snapshot.right_y = v,
            InputUpdate::L2(v) => snapshot.l2 = v,
            InputUpdate::R2(v) => snapshot.r2 = v,
            InputUpdate::Button(button, pressed) => snapshot.buttons.set(button, pressed),
        }
    }
}

/// Latest controller state, shared between the transport and the tick thread.
///
/// # RT Safety
///
/// Both [`SharedInput::apply_batch`] and [`SharedInput::snapshot`] hold the
/// lock for O(fields) work and never allocate or perform I/O under it.
#[derive(Debug, Default)]
pub struct SharedInput {
    state: Mutex<InputSnapshot>,
}

impl SharedInput {
    /// Neutral sticks, released triggers, no buttons.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given state.
    pub fn with_snapshot(snapshot: InputSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    /// Apply every update under one lock, so a reader sees all of them or
    /// none of them.
    pub fn apply_batch(&self, updates: &[InputUpdate]) {
        let mut state = self.state.lock();
        for update in updates {
            update.apply_to(&mut state);
        }
    }

    /// Replace the whole state.
    pub fn replace(&self, snapshot: InputSnapshot) {
        *self.state.lock() = snapshot;
    }

    /// Copy of the current state.
    #[inline]
    pub fn snapshot(&self) -> InputSnapshot {
        *self.state.lock()
    }
}
