pub mod http;
pub mod speech;
pub mod token_store;
pub mod voice;
