//! 命令定义和实现

pub mod check;
pub mod gcode;

pub use check::CheckCommand;
pub use gcode::{CommandError, GcodeCommand};
