pub mod ai;
pub mod chat;
pub mod feeds;
pub mod http;
