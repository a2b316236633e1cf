mod board;
mod stop;

pub use board::*;
pub use stop::*;
