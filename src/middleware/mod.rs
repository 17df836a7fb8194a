pub mod access_log;

pub use access_log::{access_logger, record_outcome};
