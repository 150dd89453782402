pub mod buffer;
pub mod config;
pub mod constants;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod line;
pub mod pulse;
pub mod wiegand;


// Re-export the engine and the types its handlers see
pub use buffer::Snapshot;
pub use config::{Config, Length};
pub use decode::{Failure, Message, decode};
pub use error::{DataError, WiegandError};
pub use line::{ConnectivityState, Line};
pub use wiegand::Wiegand;
