//! Shared test harness modules for the trafficway CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]
#![expect(
    clippy::expect_used,
    reason = "tests use expect for readable failures"
)]

use super::*;

mod helpers;
mod plan_unit;
