//! Loading modules from storage.
//!
//! Consumers that only need a [`Module`] depend on the [`ModuleLoader`]
//! trait, so tests can hand them a synthetic module without any parsing.
use std::path::Path;

use crate::{modules::Module, utils::Error};

/// Trait implemented by anything able to produce a [`Module`] from a path.
pub trait ModuleLoader {
    /// Human-readable name of the loader, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Load the module stored at `path`.
    ///
    /// Either a complete module or an error is returned; loaders never hand
    /// back partial modules.
    fn load(&self, path: &Path) -> Result<Module, Error>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &L {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn load(&self, path: &Path) -> Result<Module, Error> {
        (**self).load(path)
    }
}

/// Loader reading textual IR (`.ll`) files.
#[cfg(feature = "chumsky")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TextualLoader;

#[cfg(feature = "chumsky")]
impl ModuleLoader for TextualLoader {
    fn name(&self) -> &'static str {
        "textual-ir"
    }

    fn load(&self, path: &Path) -> Result<Module, Error> {
        crate::modules::parser::module_from_path(path)
    }
}
