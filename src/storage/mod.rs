pub mod high_score;

pub use high_score::{FileHighScoreStore, HighScoreError, HighScoreStore, MemoryHighScoreStore};
