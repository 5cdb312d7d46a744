pub mod ai_provider;
pub mod chat_channel;
pub mod filings_source;
pub mod market_data;
pub mod news_source;
