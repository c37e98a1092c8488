mod args;

pub use args::{Cli, Command, DetectArgs, LogLevel};
