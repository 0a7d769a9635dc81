//! 分析模块：证据资产、候选猜测与汇总
pub mod asset;
pub mod guess;
pub mod board;
pub mod recency;

pub use self::asset::Asset;
pub use self::guess::{Guess, GuessDebug, GuessRecord};
pub use self::board::GuessBoard;
pub use self::recency::{more_recent_version, most_recent};
