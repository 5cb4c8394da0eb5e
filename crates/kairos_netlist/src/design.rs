//! The design: a set of modules and a designated top.

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::module::Module;

/// A collection of module definitions with an optional top module.
///
/// A design is inert data; nothing here is resolved or flattened. Passing
/// it to [`crate::elaborate::elaborate`] produces the checked, flat form
/// the simulator executes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Design {
    /// All module definitions.
    pub modules: Arena<ModuleId, Module>,
    /// The module instantiated as the root of the hierarchy.
    pub top: Option<ModuleId>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Design {
        Design {
            modules: Arena::new(),
            top: None,
        }
    }

    /// Borrows the top module, if one is set.
    pub fn top_module(&self) -> Option<&Module> {
        self.top.map(|id| self.modules.get(id))
    }
}

impl Default for Design {
    fn default() -> Self {
        Design::new()
    }
}
