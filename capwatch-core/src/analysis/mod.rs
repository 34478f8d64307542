//! Rank and trend analysis over the market-cap history.

pub mod momentum;
pub mod rank;

pub use momentum::{momentum_shift, MomentumEntry, MomentumReport, MA_BAND, MA_WINDOW};
pub use rank::{rank_deltas, Direction, RankDeltaReport, RankMove, RankSnapshot};
