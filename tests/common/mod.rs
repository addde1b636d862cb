#![allow(dead_code)]

pub use saveprobe_test_utils::init_tracing;
pub use saveprobe_test_utils::scripts;
pub use saveprobe_test_utils::sink::RecordingSink;
pub use saveprobe_test_utils::workspace::MockWorkspace;
