//! External analysis script orchestration.
//!
//! One invocation flows leaves-first through the submodules:
//! [`probe`] checks the interpreter, [`locator`] resolves the script,
//! [`launcher`] spawns it, [`encoder`] feeds stdin, [`collector`] drains
//! stdout/stderr, [`arbiter`] pairs the exit status with the output and
//! [`decoder`] parses structured results. [`orchestrator`] runs that
//! pipeline on a supervised task per invocation.

pub mod arbiter;
pub mod collector;
pub mod decoder;
pub mod encoder;
pub mod invocation;
pub mod launcher;
pub mod locator;
pub mod orchestrator;
pub mod probe;
