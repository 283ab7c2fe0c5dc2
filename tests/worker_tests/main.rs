//! Deletion worker tests

mod queue_tests;
