use simplelog::{Config, LevelFilter, TestLogger};
use std::sync::Once;

static INIT: Once = Once::new();

// Routes the trees' balancing traces to the test harness' captured output.
pub fn init_logger() {
    INIT.call_once(|| {
        TestLogger::init(LevelFilter::Trace, Config::default())
            .expect("Expected no other logger to be installed.");
    });
}
