#![allow(dead_code)]

pub use dockergoal_test_utils::builders::{goal, linked_goal, HostConfigBuilder};
pub use dockergoal_test_utils::fake_client::{Call, FakeClient, Op};
pub use dockergoal_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
