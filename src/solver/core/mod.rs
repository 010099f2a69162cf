// package together the following and re-export
// in a flattened structure :
// : user settings
// : status enums
// : statistics counters

mod settings;
mod statistics;
mod status;
pub use settings::*;
pub use statistics::*;
pub use status::*;
