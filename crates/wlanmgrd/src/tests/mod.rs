//! Test suites for the lifecycle daemon.

mod eviction;
mod lifecycle;
mod support;
