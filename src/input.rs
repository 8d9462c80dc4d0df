//! Input collected between frames.
//!
//! Pointer moves and control changes arrive as events while no frame is
//! running. They are queued in arrival order and drained by the simulation
//! at the start of the next tick, so callbacks never interleave with a
//! frame's update/display pass.

use std::collections::VecDeque;

use cgmath::{Vector2, Zero};

use crate::controls::ControlChange;
use crate::error::ControlError;

/// Pointer position in canvas coordinates plus the primary button state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Vector2<f32>,
    pub pressed: bool,
}

impl PointerState {
    pub fn new(position: Vector2<f32>, pressed: bool) -> Self {
        Self { position, pressed }
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: Vector2::zero(),
            pressed: false,
        }
    }
}

/// Ordered pointer and control queues.
#[derive(Debug, Default)]
pub struct InputQueue {
    pointer: PointerState,
    pointer_moves: VecDeque<Vector2<f32>>,
    controls: VecDeque<ControlChange>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest known pointer state.
    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    /// Records a pointer move and updates the pointer position.
    pub fn push_pointer_move(&mut self, position: Vector2<f32>) {
        self.pointer.position = position;
        self.pointer_moves.push_back(position);
    }

    pub fn push_control(&mut self, change: ControlChange) {
        self.controls.push_back(change);
    }

    /// Parses and queues a raw control value. Malformed values are logged and
    /// dropped, leaving the parameter untouched.
    pub fn push_raw_control(&mut self, id: &str, raw: &str) -> Result<(), ControlError> {
        match ControlChange::from_input(id, raw) {
            Ok(change) => {
                self.push_control(change);
                Ok(())
            }
            Err(err) => {
                log::warn!("ignoring control input: {err}");
                Err(err)
            }
        }
    }

    pub fn drain_controls(&mut self) -> impl Iterator<Item = ControlChange> + '_ {
        self.controls.drain(..)
    }

    pub fn drain_pointer_moves(&mut self) -> impl Iterator<Item = Vector2<f32>> + '_ {
        self.pointer_moves.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.pointer_moves.is_empty() && self.controls.is_empty()
    }
}
