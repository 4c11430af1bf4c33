use std::time::Duration;

use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current heading; `None` until the game is started
    pub direction: Option<Direction>,
}

impl Snake {
    /// A one-cell snake that is not moving yet
    pub fn single(head: Position) -> Self {
        Self {
            body: vec![head],
            direction: None,
        }
    }

    /// Create a snake of `length` cells trailing behind `head`, heading in `direction`
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        let (dx, dy) = direction.delta();
        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_by(-dx, -dy));
        }

        Self {
            body,
            direction: Some(direction),
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if the head would hit the body when moving to `pos`.
    ///
    /// When `tail_vacates` is set the current tail cell is ignored, since it
    /// moves out of the way on a tick where the snake does not grow.
    pub fn collides_with_body(&self, pos: Position, tail_vacates: bool) -> bool {
        let segments = self.body_segments();
        let segments = if tail_vacates && !segments.is_empty() {
            &segments[..segments.len() - 1]
        } else {
            segments
        };
        segments.contains(&pos)
    }

    /// Put `new_head` at the front, dropping the tail unless the snake grows
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake left the grid
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake covers every cell; there is nowhere left to put food
    BoardFilled,
}

/// Coarse game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Over,
}

/// Title and message shown on top of the board outside of normal play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub message: String,
}

/// Read-only view of everything the renderer needs to draw the board
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene<'a> {
    pub snake: &'a [Position],
    pub food: Position,
    pub tile_count: usize,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub tile_count: usize,
    pub score: u32,
    pub high_score: u32,
    /// Current step interval
    pub speed: Duration,
    pub phase: Phase,
    /// Timestamp of the last executed tick
    pub last_tick: Option<Duration>,
    pub ticks: u32,
}

impl GameState {
    /// Create a new idle game state
    pub fn new(snake: Snake, food: Position, tile_count: usize, speed: Duration) -> Self {
        Self {
            snake,
            food,
            tile_count,
            score: 0,
            high_score: 0,
            speed,
            phase: Phase::Idle,
            last_tick: None,
            ticks: 0,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let size = self.tile_count as i32;
        pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.body.contains(&pos)
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            snake: &self.snake.body,
            food: self.food,
            tile_count: self.tile_count,
        }
    }

    /// Overlay for the current phase, if any
    pub fn overlay(&self) -> Option<Overlay> {
        let (title, message) = match self.phase {
            Phase::Running => return None,
            Phase::Idle => (
                "Start Game".to_string(),
                "Move the mouse to steer the snake".to_string(),
            ),
            Phase::Paused => ("Paused".to_string(), format!("Score: {}", self.score)),
            Phase::Over => ("Game Over".to_string(), format!("Final score: {}", self.score)),
        };
        Some(Overlay { title, message })
    }
}
