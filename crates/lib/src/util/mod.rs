//! Test helpers shared across modules.

#[cfg(test)]
pub mod testutil;
