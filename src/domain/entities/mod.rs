pub mod article;
pub mod instrument;
pub mod options;
pub mod signal_message;
