use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use super::{
    action::Direction,
    config::GameConfig,
    state::{CollisionType, GameState, Phase, Position, Snake},
    steering::{PointerPosition, infer_direction},
};

/// Rejection-sampling attempts before falling back to scanning free cells
const FOOD_SAMPLE_ATTEMPTS: usize = 64;

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Whether the step interval shrank this step
    pub sped_up: bool,
    /// Why the game ended, if it did
    pub collision_type: Option<CollisionType>,
}

/// Result of a call to [`GameEngine::step`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// Whether a tick actually ran
    pub ticked: bool,
    /// Whether the game is over
    pub terminated: bool,
    /// Whether this step ended the game with a new best score
    pub new_high_score: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Engine with deterministic food placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fresh idle game carrying over a previously stored best score.
    ///
    /// Expects a config that passed [`GameConfig::validate`]: with fewer than
    /// two tiles per side the only cell is the head and the food lands on it.
    pub fn new_game(&mut self, high_score: u32) -> GameState {
        let head = self.center();
        let snake = Snake::single(head);
        let food = self.spawn_food_avoid_snake(&snake).unwrap_or(head);

        let mut state = GameState::new(
            snake,
            food,
            self.config.tile_count,
            self.config.initial_speed(),
        );
        state.high_score = high_score;
        state
    }

    /// Return to idle with a one-cell snake at the center
    pub fn reset(&mut self, state: &mut GameState) {
        let high_score = state.high_score;
        *state = self.new_game(high_score);
        debug!("game reset");
    }

    /// Start from idle. Returns false when the game is not idle.
    pub fn start(&mut self, state: &mut GameState) -> bool {
        if state.phase != Phase::Idle {
            return false;
        }

        if state.snake.direction.is_none() {
            state.snake.direction = Some(Direction::Right);
        }
        state.phase = Phase::Running;
        info!(high_score = state.high_score, "game started");
        true
    }

    /// Switch between running and paused. Returns false in any other phase.
    pub fn toggle_pause(&mut self, state: &mut GameState) -> bool {
        state.phase = match state.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            Phase::Idle | Phase::Over => return false,
        };
        debug!(phase = ?state.phase, "pause toggled");
        true
    }

    /// Advance the game if a tick is due at `now`.
    ///
    /// `now` is any monotonic timestamp; only differences between calls
    /// matter. At most one tick runs per call.
    pub fn step(
        &mut self,
        state: &mut GameState,
        now: Duration,
        pointer: Option<PointerPosition>,
    ) -> StepResult {
        if state.phase != Phase::Running {
            return StepResult {
                terminated: state.phase == Phase::Over,
                ..Default::default()
            };
        }

        if let Some(last) = state.last_tick {
            if now.saturating_sub(last) < state.speed {
                return StepResult::default();
            }
        }

        let result = self.tick(state, pointer);
        state.last_tick = Some(now);
        state.ticks += 1;
        result
    }

    fn tick(&mut self, state: &mut GameState, pointer: Option<PointerPosition>) -> StepResult {
        if let Some(pointer) = pointer {
            state.snake.direction = infer_direction(
                state.snake.head(),
                state.snake.direction,
                pointer,
                self.config.cell_size,
            );
        }

        let Some(direction) = state.snake.direction else {
            return StepResult {
                ticked: true,
                ..Default::default()
            };
        };

        let new_head = state.snake.head().moved_in_direction(direction);

        if let Some(collision_type) = self.check_collision(state, new_head) {
            return self.end_game(state, collision_type, StepInfo::default());
        }

        let ate_food = new_head == state.food;
        state.snake.advance(new_head, ate_food);

        let mut info = StepInfo {
            ate_food,
            ..Default::default()
        };

        if ate_food {
            state.score = state.score.saturating_add(self.config.food_score);
            info.sped_up = self.maybe_speed_up(state);

            match self.spawn_food_avoid_snake(&state.snake) {
                Some(food) => state.food = food,
                None => return self.end_game(state, CollisionType::BoardFilled, info),
            }
        }

        StepResult {
            ticked: true,
            terminated: false,
            new_high_score: false,
            info,
        }
    }

    /// Shrink the step interval when the score lands on a threshold
    fn maybe_speed_up(&self, state: &mut GameState) -> bool {
        let min_speed = self.config.min_speed();
        if state.score == 0
            || state.score % self.config.speed_up_every != 0
            || state.speed <= min_speed
        {
            return false;
        }

        state.speed = state
            .speed
            .saturating_sub(self.config.speed_step())
            .max(min_speed);
        info!(score = state.score, speed_ms = state.speed.as_millis() as u64, "speed up");
        true
    }

    fn end_game(
        &mut self,
        state: &mut GameState,
        collision_type: CollisionType,
        mut info: StepInfo,
    ) -> StepResult {
        state.phase = Phase::Over;
        info.collision_type = Some(collision_type);

        let new_high_score = state.score > state.high_score;
        if new_high_score {
            state.high_score = state.score;
        }

        info!(
            score = state.score,
            high_score = state.high_score,
            cause = ?collision_type,
            "game over"
        );

        StepResult {
            ticked: true,
            terminated: true,
            new_high_score,
            info,
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionType> {
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if state.snake.collides_with_body(pos, self.config.tail_vacates) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    fn center(&self) -> Position {
        let mid = (self.config.tile_count / 2) as i32;
        Position::new(mid, mid)
    }

    /// Spawn food at a uniformly random empty cell, `None` if the grid is full
    fn spawn_food_avoid_snake(&mut self, snake: &Snake) -> Option<Position> {
        let size = self.config.tile_count;

        for _ in 0..FOOD_SAMPLE_ATTEMPTS {
            let x = self.rng.gen_range(0..size) as i32;
            let y = self.rng.gen_range(0..size) as i32;
            let pos = Position::new(x, y);

            if !snake.body.contains(&pos) {
                return Some(pos);
            }
        }

        // Crowded board: pick directly among the free cells
        let free: Vec<Position> = (0..size as i32)
            .flat_map(|y| (0..size as i32).map(move |x| Position::new(x, y)))
            .filter(|pos| !snake.body.contains(pos))
            .collect();

        if free.is_empty() {
            None
        } else {
            Some(free[self.rng.gen_range(0..free.len())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn engine() -> GameEngine {
        GameEngine::with_seed(GameConfig::default(), 7)
    }

    fn running_state(engine: &mut GameEngine, snake: Snake, food: Position) -> GameState {
        let mut state = engine.new_game(0);
        state.snake = snake;
        state.food = food;
        state.phase = Phase::Running;
        state
    }

    #[test]
    fn test_new_game() {
        let mut engine = engine();
        let state = engine.new_game(40);

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.snake.body, vec![Position::new(10, 10)]);
        assert_eq!(state.snake.direction, None);
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 40);
        assert_eq!(state.speed, ms(150));
        assert!(!state.is_occupied_by_snake(state.food));
        assert!(state.is_in_bounds(state.food));
    }

    #[test]
    fn test_start_sets_rightward_heading() {
        let mut engine = engine();
        let mut state = engine.new_game(0);

        assert!(engine.start(&mut state));
        assert_eq!(state.snake.direction, Some(Direction::Right));
        assert_eq!(state.snake.direction.unwrap().delta(), (1, 0));
        assert_eq!(state.phase, Phase::Running);

        // Already running
        assert!(!engine.start(&mut state));
    }

    #[test]
    fn test_start_keeps_chosen_heading() {
        let mut engine = engine();
        let mut state = engine.new_game(0);
        state.snake.direction = Some(Direction::Up);

        engine.start(&mut state);
        assert_eq!(state.snake.direction, Some(Direction::Up));
    }

    #[test]
    fn test_start_from_over_requires_reset() {
        let mut engine = engine();
        let mut state = engine.new_game(0);
        state.phase = Phase::Over;

        assert!(!engine.start(&mut state));
        assert_eq!(state.phase, Phase::Over);

        engine.reset(&mut state);
        assert!(engine.start(&mut state));
        assert_eq!(state.phase, Phase::Running);
    }

    #[test]
    fn test_toggle_pause() {
        let mut engine = engine();
        let mut state = engine.new_game(0);

        assert!(!engine.toggle_pause(&mut state));
        assert_eq!(state.phase, Phase::Idle);

        engine.start(&mut state);
        assert!(engine.toggle_pause(&mut state));
        assert_eq!(state.phase, Phase::Paused);
        assert!(engine.toggle_pause(&mut state));
        assert_eq!(state.phase, Phase::Running);

        state.phase = Phase::Over;
        assert!(!engine.toggle_pause(&mut state));
        assert_eq!(state.phase, Phase::Over);
    }

    #[test]
    fn test_paused_game_does_not_tick() {
        let mut engine = engine();
        let mut state = engine.new_game(0);
        engine.start(&mut state);
        engine.toggle_pause(&mut state);
        let before = state.clone();

        let result = engine.step(&mut state, ms(10_000), None);

        assert!(!result.ticked);
        assert_eq!(state, before);
    }

    #[test]
    fn test_step_gated_by_speed() {
        let mut engine = engine();
        let mut state = engine.new_game(0);
        state.food = Position::new(0, 0);
        engine.start(&mut state);

        // First step runs immediately
        assert!(engine.step(&mut state, ms(1000), None).ticked);
        assert_eq!(state.snake.head(), Position::new(11, 10));

        // Too early: nothing changes, timing preserved
        assert!(!engine.step(&mut state, ms(1100), None).ticked);
        assert!(!engine.step(&mut state, ms(1149), None).ticked);
        assert_eq!(state.last_tick, Some(ms(1000)));
        assert_eq!(state.snake.head(), Position::new(11, 10));

        // Exactly one interval later
        assert!(engine.step(&mut state, ms(1150), None).ticked);
        assert_eq!(state.snake.head(), Position::new(12, 10));
        assert_eq!(state.ticks, 2);
    }

    #[test]
    fn test_one_tick_per_call() {
        let mut engine = engine();
        let mut state = engine.new_game(0);
        state.food = Position::new(0, 0);
        engine.start(&mut state);

        engine.step(&mut state, ms(0), None);
        engine.step(&mut state, ms(5000), None);
        assert_eq!(state.ticks, 2);
        assert_eq!(state.snake.head(), Position::new(12, 10));
    }

    #[test]
    fn test_pointer_steers() {
        let mut engine = engine();
        let mut state = engine.new_game(0);
        state.food = Position::new(0, 0);
        engine.start(&mut state);

        // Pointer well below the head at (10, 10)
        let pointer = PointerPosition::new(210.0, 390.0);
        engine.step(&mut state, ms(0), Some(pointer));

        assert_eq!(state.snake.direction, Some(Direction::Down));
        assert_eq!(state.snake.head(), Position::new(10, 11));
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = engine();
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        let mut state = running_state(&mut engine, snake, Position::new(6, 5));

        let result = engine.step(&mut state, ms(0), None);

        assert!(result.info.ate_food);
        assert_eq!(state.score, 10);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.snake.tail(), Position::new(3, 5));
        assert!(!state.is_occupied_by_snake(state.food));
    }

    #[test]
    fn test_score_saturates_without_validation() {
        let config = GameConfig {
            food_score: u32::MAX,
            ..Default::default()
        };
        let mut engine = GameEngine::with_seed(config, 7);
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 1);
        let mut state = running_state(&mut engine, snake, Position::new(6, 5));

        engine.step(&mut state, ms(0), None);
        assert_eq!(state.score, u32::MAX);

        state.food = Position::new(7, 5);
        let result = engine.step(&mut state, ms(1000), None);
        assert!(result.info.ate_food);
        assert_eq!(state.score, u32::MAX);
        assert_eq!(state.phase, Phase::Running);
    }

    #[test]
    fn test_smallest_board_keeps_food_off_snake() {
        for seed in 0..20 {
            let mut engine = GameEngine::with_seed(GameConfig::new(2), seed);
            let state = engine.new_game(0);
            assert_eq!(state.snake.head(), Position::new(1, 1));
            assert!(!state.is_occupied_by_snake(state.food));
        }
    }

    #[test]
    fn test_no_food_keeps_length() {
        let mut engine = engine();
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        let mut state = running_state(&mut engine, snake, Position::new(0, 0));

        let result = engine.step(&mut state, ms(0), None);

        assert!(!result.info.ate_food);
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.food, Position::new(0, 0));
    }

    #[test]
    fn test_speed_up_at_threshold() {
        let mut engine = engine();
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        let mut state = running_state(&mut engine, snake, Position::new(6, 5));
        state.score = 40;

        let result = engine.step(&mut state, ms(0), None);

        assert_eq!(state.score, 50);
        assert!(result.info.sped_up);
        assert_eq!(state.speed, ms(140));
    }

    #[test]
    fn test_no_speed_up_off_threshold() {
        let mut engine = engine();
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        let mut state = running_state(&mut engine, snake, Position::new(6, 5));
        state.score = 50;

        let result = engine.step(&mut state, ms(0), None);

        assert_eq!(state.score, 60);
        assert!(!result.info.sped_up);
        assert_eq!(state.speed, ms(150));
    }

    #[test]
    fn test_speed_floor() {
        let mut engine = engine();
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        let mut state = running_state(&mut engine, snake, Position::new(6, 5));
        state.score = 90;
        state.speed = ms(50);

        let result = engine.step(&mut state, ms(0), None);

        assert_eq!(state.score, 100);
        assert!(!result.info.sped_up);
        assert_eq!(state.speed, ms(50));
    }

    #[test]
    fn test_speed_only_decreases() {
        let mut engine = GameEngine::with_seed(GameConfig::new(30), 3);
        let mut state = engine.new_game(0);
        engine.start(&mut state);

        let mut now = Duration::ZERO;
        let mut previous = state.speed;
        for _ in 0..20 {
            // Feed the snake straight ahead every tick
            let head = state.snake.head();
            state.food = head.moved_in_direction(Direction::Right);
            if !state.is_in_bounds(state.food) {
                break;
            }
            engine.step(&mut state, now, None);
            assert!(state.speed <= previous);
            assert!(state.speed >= ms(50));
            previous = state.speed;
            now += ms(1000);
        }
        assert_eq!(state.phase, Phase::Running);
        assert!(state.speed < ms(150));
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = engine();
        let snake = Snake::new(Position::new(0, 5), Direction::Left, 1);
        let mut state = running_state(&mut engine, snake, Position::new(8, 8));
        state.score = 30;
        state.high_score = 20;

        let result = engine.step(&mut state, ms(0), None);

        assert!(result.terminated);
        assert_eq!(state.phase, Phase::Over);
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
        assert!(result.new_high_score);
        assert_eq!(state.high_score, 30);
    }

    #[test]
    fn test_wall_collision_without_record() {
        let mut engine = engine();
        let snake = Snake::new(Position::new(0, 5), Direction::Left, 1);
        let mut state = running_state(&mut engine, snake, Position::new(8, 8));
        state.score = 20;
        state.high_score = 20;

        let result = engine.step(&mut state, ms(0), None);

        assert_eq!(state.phase, Phase::Over);
        assert!(!result.new_high_score);
        assert_eq!(state.high_score, 20);
        // The dead snake stays where it was
        assert_eq!(state.snake.head(), Position::new(0, 5));
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine();

        // Body: (5,5), (4,5), (3,5), (2,5), (1,5)
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 5);
        let mut state = running_state(&mut engine, snake, Position::new(8, 8));
        let cell = engine.config().cell_size;

        let mut now = Duration::ZERO;
        let mut turn = |state: &mut GameState, engine: &mut GameEngine, dir: Direction| {
            let target = state.snake.head().moved_by(dir.delta().0 * 5, dir.delta().1 * 5);
            let pointer = PointerPosition::new(
                target.x as f32 * cell + cell / 2.0,
                target.y as f32 * cell + cell / 2.0,
            );
            let result = engine.step(state, now, Some(pointer));
            now += ms(1000);
            result
        };

        turn(&mut state, &mut engine, Direction::Down);
        turn(&mut state, &mut engine, Direction::Left);
        let result = turn(&mut state, &mut engine, Direction::Up);

        assert!(result.terminated);
        assert_eq!(
            result.info.collision_type,
            Some(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_moving_into_vacating_tail() {
        // A 2x2 loop: head chases the tail around the square
        let body = vec![
            Position::new(5, 5),
            Position::new(5, 6),
            Position::new(6, 6),
            Position::new(6, 5),
        ];
        let snake = Snake {
            body,
            direction: Some(Direction::Right),
        };

        let mut engine = engine();
        let mut state = running_state(&mut engine, snake.clone(), Position::new(0, 0));
        let result = engine.step(&mut state, ms(0), None);
        assert!(!result.terminated);
        assert_eq!(state.snake.head(), Position::new(6, 5));
        assert_eq!(state.snake.len(), 4);

        let config = GameConfig {
            tail_vacates: false,
            ..Default::default()
        };
        let mut strict = GameEngine::with_seed(config, 7);
        let mut state = running_state(&mut strict, snake, Position::new(0, 0));
        let result = strict.step(&mut state, ms(0), None);
        assert_eq!(
            result.info.collision_type,
            Some(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_board_filled_ends_game() {
        // 2x2 board, three cells taken, food on the last one
        let mut engine = GameEngine::with_seed(GameConfig::new(2), 1);
        let snake = Snake {
            body: vec![Position::new(0, 1), Position::new(1, 1), Position::new(1, 0)],
            direction: Some(Direction::Up),
        };
        let mut state = running_state(&mut engine, snake, Position::new(0, 0));

        let result = engine.step(&mut state, ms(0), None);

        assert!(result.info.ate_food);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(result.info.collision_type, Some(CollisionType::BoardFilled));
        assert_eq!(state.phase, Phase::Over);
    }

    #[test]
    fn test_food_spawns_on_last_free_cell() {
        let mut engine = GameEngine::with_seed(GameConfig::new(3), 11);
        let snake = Snake {
            body: (0..3)
                .flat_map(|y| (0..3).map(move |x| Position::new(x, y)))
                .filter(|p| *p != Position::new(2, 2))
                .collect(),
            direction: None,
        };

        for _ in 0..10 {
            assert_eq!(engine.spawn_food_avoid_snake(&snake), Some(Position::new(2, 2)));
        }
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut engine = engine();
        let snake = Snake::new(Position::new(0, 5), Direction::Left, 4);
        let mut state = running_state(&mut engine, snake, Position::new(8, 8));
        state.score = 120;
        state.speed = ms(100);

        engine.step(&mut state, ms(0), None);
        assert_eq!(state.phase, Phase::Over);

        engine.reset(&mut state);

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.snake.body, vec![Position::new(10, 10)]);
        assert_eq!(state.snake.direction, None);
        assert_eq!(state.score, 0);
        assert_eq!(state.speed, ms(150));
        assert_eq!(state.last_tick, None);
        assert_eq!(state.high_score, 120);
        assert!(!state.is_occupied_by_snake(state.food));
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = engine();
        let mut state = engine.new_game(0);
        state.phase = Phase::Over;
        let before = state.clone();

        let result = engine.step(&mut state, ms(500), None);

        assert!(result.terminated);
        assert!(!result.ticked);
        assert_eq!(state, before);
    }

    #[test]
    fn test_invariants_under_random_play() {
        let mut engine = GameEngine::with_seed(GameConfig::small(), 42);
        let mut state = engine.new_game(0);
        engine.start(&mut state);
        let cell = engine.config().cell_size;

        let mut now = Duration::ZERO;
        let mut pointer_rng = StdRng::seed_from_u64(99);
        for _ in 0..2000 {
            if state.phase == Phase::Over {
                engine.reset(&mut state);
                engine.start(&mut state);
            }

            let pointer = PointerPosition::new(
                pointer_rng.gen_range(-cell..cell * 11.0),
                pointer_rng.gen_range(-cell..cell * 11.0),
            );
            let len_before = state.snake.len();
            let score_before = state.score;
            let result = engine.step(&mut state, now, Some(pointer));
            now += ms(200);

            if state.phase == Phase::Over {
                continue;
            }

            assert!(state.snake.body.iter().all(|p| state.is_in_bounds(*p)));
            let unique: HashSet<_> = state.snake.body.iter().collect();
            assert_eq!(unique.len(), state.snake.len());
            assert!(!state.is_occupied_by_snake(state.food));

            if result.info.ate_food {
                assert_eq!(state.score, score_before + 10);
                assert_eq!(state.snake.len(), len_before + 1);
            } else {
                assert_eq!(state.score, score_before);
                assert_eq!(state.snake.len(), len_before);
            }
        }
    }
}
