//! Remote debugger attachment
//!
//! The debuggee side is plain Lua: a transport module, a JSON codec and a
//! debugger protocol module exposing `start(json, config)` and `poll()`. The
//! bridge only generates the bootstrap chunk and remembers whether the
//! connection came up.

use luma_config::DebuggerConfig;
use std::fmt;

/// Chunk name used for the bootstrap script
pub(crate) const BOOTSTRAP_CHUNK: &str = "debuggee";

/// State of the debugger connection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebuggeeStatus {
    /// Not started, or disabled by configuration
    #[default]
    Disabled,
    /// The protocol module accepted the connection
    Connected,
    /// Bootstrap ran but no debugger answered, or a module was missing
    Failed,
}

impl fmt::Display for DebuggeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DebuggeeStatus::Disabled => "disabled",
            DebuggeeStatus::Connected => "connected",
            DebuggeeStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Quote a string as a single-quoted Lua literal
fn lua_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Build the bootstrap chunk; it returns whether the connection succeeded
pub(crate) fn bootstrap_script(module_name: &str, config: &DebuggerConfig, address: &str) -> String {
    format!(
        r#"local engine = require {module}
require {transport}
local json = require {json}
local debuggee = require {protocol}
local config = {{ redirectPrint = {redirect}, controllerHost = {address} }}
local startResult, breakerType = debuggee.start(json, config)
if startResult then
    engine.log('Connected to debugger (' .. tostring(breakerType) .. ')')
else
    engine.log('Failed to connect to debugger')
end
return startResult and true or false
"#,
        module = lua_quote(module_name),
        transport = lua_quote(&config.transport_module),
        json = lua_quote(&config.json_module),
        protocol = lua_quote(&config.protocol_module),
        redirect = config.redirect_print,
        address = lua_quote(address),
    )
}

/// Chunk polling the protocol module for pending debugger messages
pub(crate) fn poll_script(config: &DebuggerConfig) -> String {
    format!("require({}).poll()", lua_quote(&config.protocol_module))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(lua_quote("localhost"), "'localhost'");
        assert_eq!(lua_quote("it's"), r"'it\'s'");
        assert_eq!(lua_quote(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn test_bootstrap_substitutes_address() {
        let script = bootstrap_script("luma", &DebuggerConfig::default(), "10.0.0.7");
        assert!(script.contains("local engine = require 'luma'"));
        assert!(script.contains("require 'socket.core'"));
        assert!(script.contains("require 'dkjson'"));
        assert!(script.contains("require 'vscode-debuggee'"));
        assert!(script.contains("controllerHost = '10.0.0.7'"));
        assert!(script.contains("redirectPrint = true"));
    }

    #[test]
    fn test_bootstrap_compiles() {
        let lua = mlua::Lua::new();
        let script = bootstrap_script("luma", &DebuggerConfig::default(), "localhost");
        assert!(lua.load(script.as_str()).into_function().is_ok());
        assert!(lua
            .load(poll_script(&DebuggerConfig::default()).as_str())
            .into_function()
            .is_ok());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(DebuggeeStatus::default(), DebuggeeStatus::Disabled);
        assert_eq!(DebuggeeStatus::Connected.to_string(), "connected");
    }
}
