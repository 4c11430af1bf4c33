use std::time::{Duration, Instant};

/// Per-session statistics shown next to the board
pub struct GameMetrics {
    /// Play time of the current game; only advances while running
    pub elapsed_time: Duration,
    pub games_played: u32,
    pub foods_eaten: u32,
    /// Best score reached since the program started
    pub session_best: u32,
    last_update: Option<Instant>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            elapsed_time: Duration::ZERO,
            games_played: 0,
            foods_eaten: 0,
            session_best: 0,
            last_update: None,
        }
    }

    /// Accumulate play time. Call every frame; `running` is false while idle or paused.
    pub fn update(&mut self, running: bool) {
        let now = Instant::now();
        if running {
            if let Some(last) = self.last_update {
                self.elapsed_time += now.duration_since(last);
            }
            self.last_update = Some(now);
        } else {
            self.last_update = None;
        }
    }

    pub fn on_game_start(&mut self) {
        self.elapsed_time = Duration::ZERO;
        self.foods_eaten = 0;
        self.last_update = None;
    }

    pub fn on_food_eaten(&mut self) {
        self.foods_eaten += 1;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.games_played += 1;
        self.last_update = None;
        if final_score > self.session_best {
            self.session_best = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
