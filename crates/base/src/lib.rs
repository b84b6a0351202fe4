mod clock;
pub use clock::*;

mod latest;
pub use latest::*;

mod shutdown;
pub use shutdown::*;

pub mod logging;
pub use logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger};

// downstream crates log through base::log::*
pub use log;
