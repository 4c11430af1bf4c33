//! Pointer-driven steering
//!
//! The snake turns toward wherever the pointer is, measured from the center
//! of the head tile. Pointer positions within one tile of the head are
//! ignored so the heading does not jitter while the pointer hovers there.

use super::action::Direction;
use super::state::Position;

/// Last known pointer location in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Center of a tile in surface coordinates
pub fn tile_center(pos: Position, cell_size: f32) -> (f32, f32) {
    (
        pos.x as f32 * cell_size + cell_size / 2.0,
        pos.y as f32 * cell_size + cell_size / 2.0,
    )
}

/// Pick the heading for the next tick.
///
/// Returns `current` when the pointer is inside the dead zone or when the
/// candidate heading would reverse the snake onto itself.
pub fn infer_direction(
    head: Position,
    current: Option<Direction>,
    pointer: PointerPosition,
    cell_size: f32,
) -> Option<Direction> {
    let (cx, cy) = tile_center(head, cell_size);
    let dx = pointer.x - cx;
    let dy = pointer.y - cy;

    if dx.hypot(dy) < cell_size {
        return current;
    }

    // Ties go to the vertical axis
    let candidate = if dx.abs() > dy.abs() {
        if dx > 0.0 { Direction::Right } else { Direction::Left }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    };

    match current {
        Some(heading) if heading.is_opposite(candidate) => current,
        _ => Some(candidate),
    }
}
