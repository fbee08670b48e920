mod ring;
mod signals;
mod spinlock;

pub use ring::*;
pub use signals::*;
pub use spinlock::*;
