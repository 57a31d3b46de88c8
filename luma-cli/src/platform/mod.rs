//! 终端相关的输出

mod cli;

pub use cli::{fault_line, print_fault_with_source, print_source_context, print_versions};
