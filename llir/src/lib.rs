//! In-memory representation of LLVM-style IR modules.
//!
//! - [`modules`]: modules, functions, basic blocks and instructions, plus the
//!   textual reader (behind the default `chumsky` feature).
//! - [`types`]: value-like type representation printed in LLVM spelling.
//! - [`loader`]: the [`loader::ModuleLoader`] abstraction consumers load
//!   modules through.
pub mod loader;
pub mod modules;
pub mod types;
pub mod utils;
