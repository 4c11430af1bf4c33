use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{info, warn};

use crate::game::{Control, GameConfig, GameEngine, GameState, Phase, StepResult};
use crate::input::{InputAction, InputHandler, PointerReader, PointerSlot, pointer_channel};
use crate::metrics::GameMetrics;
use crate::render::{GridLayout, Renderer};
use crate::storage::HighScoreStore;

/// Roughly one display refresh; each frame runs at most one game tick
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct HumanMode {
    engine: GameEngine,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    store: Box<dyn HighScoreStore>,
    pointer_slot: PointerSlot,
    pointer: PointerReader,
    /// Layout of the last drawn frame, used to place mouse events on the board
    layout: Option<GridLayout>,
    clock: Instant,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        let mut engine = GameEngine::new(config);
        let state = engine.new_game(store.load());
        let (pointer_slot, pointer) = pointer_channel();

        Self {
            engine,
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            store,
            pointer_slot,
            pointer,
            layout: None,
            clock: Instant::now(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        info!(high_score = self.state.high_score, "session started");

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut frame_timer = interval(FRAME_INTERVAL);

        // Draw once before the first frame so the board and prompt show up
        self.draw(terminal)?;

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Simulation step and redraw
                _ = frame_timer.tick() => {
                    self.on_frame();
                    self.draw(terminal)?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        info!(
            games_played = self.metrics.games_played,
            session_best = self.metrics.session_best,
            "session ended"
        );
        Ok(())
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let Self {
            renderer,
            state,
            metrics,
            layout,
            ..
        } = self;

        terminal
            .draw(|frame| {
                *layout = Some(renderer.render(frame, state, metrics));
            })
            .context("Failed to draw frame")?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match self.input_handler.handle_event(&event) {
            InputAction::Control(control) => self.apply_control(control),
            InputAction::Pointer { column, row } => {
                // No visible board means there is nothing to aim at
                if let Some(layout) = self.layout.filter(|layout| layout.fits) {
                    let cell_size = self.engine.config().cell_size;
                    self.pointer_slot
                        .publish(layout.surface_point(column, row, cell_size));
                }
            }
            InputAction::None => {}
        }
    }

    fn apply_control(&mut self, control: Control) {
        match control {
            Control::StartOrPause => match self.state.phase {
                Phase::Idle => self.start_game(),
                Phase::Running | Phase::Paused => {
                    self.engine.toggle_pause(&mut self.state);
                }
                Phase::Over => self.restart_game(),
            },
            Control::Restart => self.restart_game(),
            Control::Quit => self.should_quit = true,
        }
    }

    fn on_frame(&mut self) {
        // Hold the game while the board does not fit on screen
        let hidden = self.layout.is_some_and(|layout| !layout.fits);
        if hidden && self.state.is_running() {
            self.engine.toggle_pause(&mut self.state);
            info!("paused, terminal too small for the board");
        }

        let now = self.clock.elapsed();
        let result = self
            .engine
            .step(&mut self.state, now, self.pointer.latest());
        self.record_step(&result);
        self.metrics.update(self.state.is_running());
    }

    fn record_step(&mut self, result: &StepResult) {
        if !result.ticked {
            return;
        }

        if result.info.ate_food {
            self.metrics.on_food_eaten();
        }

        if result.terminated {
            self.metrics.on_game_over(self.state.score);
            info!(
                score = self.state.score,
                foods_eaten = self.metrics.foods_eaten,
                play_time = %self.metrics.format_time(),
                session_best = self.metrics.session_best,
                "game finished"
            );
        }

        if result.new_high_score {
            match self.store.save(self.state.high_score) {
                Ok(()) => info!(high_score = self.state.high_score, "new high score"),
                Err(err) => warn!(error = %err, "failed to save high score"),
            }
        }
    }

    fn start_game(&mut self) {
        if self.engine.start(&mut self.state) {
            self.metrics.on_game_start();
        }
    }

    fn restart_game(&mut self) {
        self.engine.reset(&mut self.state);
        self.start_game();
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
