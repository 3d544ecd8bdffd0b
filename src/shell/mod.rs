//! Shell command execution and platform queries.

pub mod command;
pub mod platform;

pub use command::{
    detect_shell, execute, execute_check, execute_streaming, CommandOptions, CommandResult,
    OutputLine,
};
pub use platform::{find_executable, find_executable_in, is_ci};
