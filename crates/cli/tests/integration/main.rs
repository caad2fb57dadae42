//! End-to-end tests for the dxcpkg binary.

mod build_tests;
mod common;
mod package_tests;
mod plan_tests;
