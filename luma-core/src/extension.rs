//! Extension point
//!
//! Subsystems that are not known when the registry is assembled (plugins,
//! game code) append callbacks here. They run after every registry group,
//! in append order, exactly once per installed engine module.

use crate::error::{BridgeError, Result};
use crate::module::Module;
use std::sync::Arc;

type ExtensionFn<C> = Box<dyn Fn(&mut Module<'_>, &Arc<C>) -> mlua::Result<()>>;

pub struct ExtensionPoint<C> {
    callbacks: Vec<ExtensionFn<C>>,
    sealed: bool,
}

impl<C> Default for ExtensionPoint<C> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
            sealed: false,
        }
    }
}

impl<C> std::fmt::Debug for ExtensionPoint<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionPoint")
            .field("callbacks", &self.callbacks.len())
            .field("sealed", &self.sealed)
            .finish()
    }
}

impl<C> ExtensionPoint<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback; fails once the engine module is installed
    pub fn register<F>(&mut self, callback: F) -> Result<()>
    where
        F: Fn(&mut Module<'_>, &Arc<C>) -> mlua::Result<()> + 'static,
    {
        if self.sealed {
            return Err(BridgeError::ExtensionPointSealed);
        }
        self.callbacks.push(Box::new(callback));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Run every callback in append order
    pub(crate) fn run(&self, module: &mut Module<'_>, context: &Arc<C>) -> Result<()> {
        for (index, callback) in self.callbacks.iter().enumerate() {
            callback(module, context).map_err(|source| BridgeError::Registration {
                group: format!("extension #{index}"),
                source,
            })?;
        }
        Ok(())
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    /// Drop every callback and accept registrations again
    pub(crate) fn clear(&mut self) {
        self.callbacks.clear();
        self.sealed = false;
    }
}
