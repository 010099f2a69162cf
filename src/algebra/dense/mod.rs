mod types;
pub use self::types::*;
mod eigen;
pub use self::eigen::*;
