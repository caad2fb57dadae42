//! dxcpkg-lib: build orchestration for packaging the DirectX Shader Compiler
//!
//! The crate turns a target identity into a package directory in three steps:
//! - `source`: shallow, recursive clone of the pinned upstream tag
//! - `dispatch`: the OS-specific configure and build invocations
//! - `harvest`: copying the per-OS artifact manifest into the package layout
//!
//! `orchestrate` threads an immutable `Recipe` and `Layout` through the steps
//! and `package` describes the result for downstream consumers.

pub mod consts;
pub mod dispatch;
pub mod exec;
pub mod harvest;
pub mod layout;
pub mod orchestrate;
pub mod package;
pub mod platform;
pub mod recipe;
pub mod source;
pub mod target;
pub mod util;
pub mod work_lock;
