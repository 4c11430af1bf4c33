use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use super::layout::GridLayout;
use crate::game::{GameState, Overlay, Phase, Position, Scene};
use crate::metrics::GameMetrics;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw one frame and return the layout it used
    pub fn render(&self, frame: &mut Frame, state: &GameState, metrics: &GameMetrics) -> GridLayout {
        let layout = GridLayout::compute(frame.area(), state.tile_count);

        let stats = self.render_stats(state, metrics);
        frame.render_widget(stats, layout.header);

        if layout.fits {
            let grid = self.render_grid(state.scene());
            frame.render_widget(grid, layout.board);

            if let Some(overlay) = state.overlay() {
                let popup = popup_area(layout.board, 36, 7);
                frame.render_widget(Clear, popup);
                frame.render_widget(self.render_overlay(&overlay, state.phase), popup);
            }
        } else {
            frame.render_widget(self.render_too_small(state.tile_count), layout.game_area);
        }

        let controls = self.render_controls();
        frame.render_widget(controls, layout.footer);

        layout
    }

    fn render_grid(&self, scene: Scene<'_>) -> Paragraph<'static> {
        let size = scene.tile_count;

        // Segment index per tile, head is 0
        let mut segments: Vec<Option<usize>> = vec![None; size * size];
        for (index, pos) in scene.snake.iter().enumerate().rev() {
            if let Some(slot) = tile_index(*pos, size) {
                segments[slot] = Some(index);
            }
        }

        let mut lines = Vec::with_capacity(size);
        for y in 0..size {
            let mut spans = Vec::with_capacity(size);

            for x in 0..size {
                let pos = Position::new(x as i32, y as i32);

                let cell = match segments[y * size + x] {
                    Some(0) => Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Some(index) => Span::styled("□ ", Style::default().fg(segment_color(index))),
                    None if pos == scene.food => Span::styled(
                        "● ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    None => Span::styled("· ", Style::default().fg(Color::DarkGray)),
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled("Best: ", label),
            Span::styled(state.high_score.to_string(), value),
            Span::raw("   "),
            Span::styled("Speed: ", label),
            Span::styled(format!("{}ms", state.speed.as_millis()), value),
            Span::raw("   "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("   "),
            Span::styled("Food: ", label),
            Span::styled(metrics.foods_eaten.to_string(), value),
            Span::raw("   "),
            Span::styled("Session: ", label),
            Span::styled(metrics.session_best.to_string(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_overlay(&self, overlay: &Overlay, phase: Phase) -> Paragraph<'static> {
        let accent = if phase == Phase::Over {
            Color::Red
        } else {
            Color::Yellow
        };

        let hint = match phase {
            Phase::Over => "Space or R to play again",
            Phase::Paused => "Space to resume",
            _ => "Press Space to start",
        };

        let text = vec![
            Line::from(vec![Span::styled(
                overlay.title.clone(),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(overlay.message.clone()),
            Line::from(""),
            Line::from(vec![Span::styled(hint, Style::default().fg(Color::Gray))]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent)),
        )
    }

    fn render_too_small(&self, tile_count: usize) -> Paragraph<'static> {
        let text = vec![
            Line::from(vec![Span::styled(
                "Terminal too small",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(format!(
                "Need at least {}x{} for a {}x{} board",
                tile_count * 2 + 2,
                tile_count + 8,
                tile_count,
                tile_count
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_controls(&self) -> Paragraph<'static> {
        let text = vec![Line::from(vec![
            Span::styled("Mouse", Style::default().fg(Color::Cyan)),
            Span::raw(" to steer | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" start/pause | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn tile_index(pos: Position, size: usize) -> Option<usize> {
    let x = usize::try_from(pos.x).ok()?;
    let y = usize::try_from(pos.y).ok()?;
    (x < size && y < size).then_some(y * size + x)
}

/// Body segments fade toward the tail
fn segment_color(index: usize) -> Color {
    let fade = (1.0 - index as f32 * 0.1).max(0.3);
    Color::Rgb(0, (90.0 + 140.0 * fade) as u8, (40.0 * fade) as u8)
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
