pub mod decimal_serde;
pub mod match_odds;
pub mod session;
pub mod wager;

pub use match_odds::{MatchOdds, Outcome};
pub use session::Session;
pub use wager::{Receipt, WagerRequest};
