pub mod command_handler;
pub mod compose;
pub mod delivery;
pub mod format;
pub mod observed;
pub mod prompt;
pub mod signal_loop;
pub mod timeout;
pub mod unusual_options;
