//! Pre/post tool mediation.
//!
//! Tool calls flow through an ordered registry: pre-hooks gate, the tool
//! body runs, post-hooks observe. The security gate is the first (and for
//! now only) pre-hook; the trace recorder is the only post-hook.

pub mod registry;
pub mod security;
pub mod trace;
