//! Engine module handle
//!
//! A [`Module`] wraps the Lua table being populated during
//! `ScriptVm::init_engine_module`. Groups and extensions add bindings through
//! it; once every group ran the table is handed to the runtime and the handle
//! is dropped.

use luma_log::{trace, Logger};
use mlua::{FromLuaMulti, IntoLua, IntoLuaMulti, Lua, MaybeSend, Table, UserData};
use std::sync::Arc;

pub struct Module<'a> {
    lua: &'a Lua,
    name: &'a str,
    table: Table,
    bindings: Vec<String>,
    logger: &'a Logger,
}

impl<'a> Module<'a> {
    pub(crate) fn new(lua: &'a Lua, name: &'a str, logger: &'a Logger) -> mlua::Result<Self> {
        Ok(Module {
            lua,
            name,
            table: lua.create_table()?,
            bindings: Vec::new(),
            logger,
        })
    }

    /// Name scripts `require` the module by
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn lua(&self) -> &Lua {
        self.lua
    }

    /// Bind a value under `name`; a later binding with the same name wins
    pub fn set(&mut self, name: &str, value: impl IntoLua) -> mlua::Result<()> {
        self.table.set(name, value)?;
        self.record(name);
        Ok(())
    }

    /// Bind a host function
    pub fn function<F, A, R>(&mut self, name: &str, func: F) -> mlua::Result<()>
    where
        F: Fn(&Lua, A) -> mlua::Result<R> + MaybeSend + 'static,
        A: FromLuaMulti,
        R: IntoLuaMulti,
    {
        let func = self.lua.create_function(func)?;
        self.set(name, func)
    }

    /// Bind a constant value
    pub fn constant(&mut self, name: &str, value: impl IntoLua) -> mlua::Result<()> {
        self.set(name, value)
    }

    /// Bind a userdata type; its static functions (constructors) become the
    /// fields of the bound proxy table
    pub fn userdata_type<T: UserData + 'static>(&mut self, name: &str) -> mlua::Result<()> {
        let proxy = self.lua.create_proxy::<T>()?;
        self.set(name, proxy)
    }

    /// Nested namespace table, created on first use
    pub fn namespace(&mut self, name: &str) -> mlua::Result<Table> {
        if let Some(existing) = self.table.get::<Option<Table>>(name)? {
            return Ok(existing);
        }
        let table = self.lua.create_table()?;
        self.set(name, table.clone())?;
        Ok(table)
    }

    /// Names bound so far, in first-binding order
    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.iter().any(|b| b == name)
    }

    pub(crate) fn into_table(self) -> Table {
        self.table
    }

    fn record(&mut self, name: &str) {
        if self.contains(name) {
            trace!(
                self.logger,
                "binding '{}' in module '{}' shadows an earlier binding",
                name,
                self.name
            );
        } else {
            self.bindings.push(name.to_string());
        }
    }
}

/// The host context stored by `ScriptVm::init_engine_module`
///
/// Host functions reach the context through this instead of capturing it.
pub fn host_context<C: 'static>(lua: &Lua) -> Option<Arc<C>> {
    lua.app_data_ref::<Arc<C>>().map(|ctx| Arc::clone(&ctx))
}
