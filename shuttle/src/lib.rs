//! Jar handling and the orchestration around the external bytecode tooling: in-memory
//! jars, access widener jar processing, and the remap service wrapping a symbol
//! remapper engine.

pub mod jar;
pub mod aw;
pub mod remap;
