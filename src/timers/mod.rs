#[allow(clippy::module_inception)]
mod timers;
pub(crate) use timers::*;
