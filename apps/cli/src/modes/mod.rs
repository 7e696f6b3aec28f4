//! 运行模式
//!
//! 支持两种模式：
//! - One-shot 模式：依次执行命令行给出的命令
//! - REPL 模式：交互式 Shell

pub mod oneshot;
pub mod repl;
