mod chart;
mod game;
mod score;

pub use chart::*;
pub use game::*;
pub use score::*;
