use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::game::PointerPosition;

/// Terminal columns used to draw one tile, keeping tiles roughly square
pub const TILE_COLUMNS: u16 = 2;

/// Where each part of the screen goes for a given terminal size.
///
/// The same layout drives drawing and mouse mapping, so a mouse event maps
/// to the tile that is actually under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub header: Rect,
    pub game_area: Rect,
    /// Board including its border
    pub board: Rect,
    pub footer: Rect,
    /// Whether the whole board fits in the terminal
    pub fits: bool,
}

impl GridLayout {
    pub fn compute(area: Rect, tile_count: usize) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(area);
        let game_area = chunks[1];

        let tiles = u16::try_from(tile_count).unwrap_or(u16::MAX);
        let width = tiles.saturating_mul(TILE_COLUMNS).saturating_add(2);
        let height = tiles.saturating_add(2);
        let fits = width <= game_area.width && height <= game_area.height;

        let board = Rect::new(
            game_area.x + game_area.width.saturating_sub(width) / 2,
            game_area.y + game_area.height.saturating_sub(height) / 2,
            width.min(game_area.width),
            height.min(game_area.height),
        );

        Self {
            header: chunks[0],
            game_area,
            board,
            footer: chunks[2],
            fits,
        }
    }

    /// Board area inside the border, where tile (0, 0) starts
    pub fn inner(&self) -> Rect {
        Rect::new(
            self.board.x + 1,
            self.board.y + 1,
            self.board.width.saturating_sub(2),
            self.board.height.saturating_sub(2),
        )
    }

    /// Convert a terminal cell under the mouse into surface coordinates.
    ///
    /// Cells outside the board still map to coordinates (possibly negative).
    pub fn surface_point(&self, column: u16, row: u16, cell_size: f32) -> PointerPosition {
        let inner = self.inner();
        let col = f32::from(column) - f32::from(inner.x);
        let row = f32::from(row) - f32::from(inner.y);

        PointerPosition::new(
            (col + 0.5) * cell_size / f32::from(TILE_COLUMNS),
            (row + 0.5) * cell_size,
        )
    }
}
