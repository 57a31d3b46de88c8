//! CLI 格式化输出
//!
//! 提供命令行友好的脚本错误显示和源码上下文打印。

use luma_core::{JitVersion, RuntimeVersion, ScriptFault};
use std::fmt::Write as _;

/// 错误行前后显示的上下文行数
const CONTEXT_LINES: usize = 3;

/// 打印脚本错误，能定位到行时附带源码上下文
pub fn print_fault_with_source(fault: &ScriptFault, chunk: &str, source: &str) {
    eprintln!("❌ {}", fault);

    if let Some(line) = fault_line(&fault.message, chunk) {
        eprint!("{}", render_source_context(source, line));
    }
    if let Some(traceback) = &fault.traceback {
        eprintln!("{}", traceback.trim_start());
    }
}

/// 从 `"<chunk>:<line>: ..."` 形式的消息中取出行号
pub fn fault_line(message: &str, chunk: &str) -> Option<usize> {
    let rest = message.strip_prefix(chunk)?.strip_prefix(':')?;
    let digits = rest.split(':').next()?;
    digits.parse().ok().filter(|line| *line > 0)
}

pub fn print_source_context(source: &str, error_line: usize) {
    eprint!("{}", render_source_context(source, error_line));
}

/// 渲染错误行及其前后几行，错误行用 `>` 标出
fn render_source_context(source: &str, error_line: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    if error_line == 0 || error_line > lines.len() {
        return String::new();
    }

    let start_line = error_line.saturating_sub(CONTEXT_LINES).max(1);
    let end_line = (error_line + CONTEXT_LINES).min(lines.len());
    let width = end_line.to_string().len();
    let separator = "-".repeat(width + 3);

    let mut out = String::new();
    let _ = writeln!(out, "{}|--", separator);
    for line_idx in start_line..=end_line {
        let marker = if line_idx == error_line { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:>width$} | {}",
            marker,
            line_idx,
            lines[line_idx - 1],
            width = width
        );
    }
    let _ = writeln!(out, "{}|--", separator);
    out
}

/// `--versions` 的输出
pub fn print_versions(runtime: &RuntimeVersion, jit: Option<&JitVersion>) {
    println!("{}", render_versions(runtime, jit));
}

fn render_versions(runtime: &RuntimeVersion, jit: Option<&JitVersion>) -> String {
    match jit {
        Some(jit) => format!("Lua {}\nLuaJIT {}", runtime, jit),
        None => format!("Lua {}\nLuaJIT unavailable", runtime),
    }
}
