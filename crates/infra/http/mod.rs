pub mod api_client;
pub mod endpoints;
pub mod error;
pub mod strategy_api;
pub mod video_api;
pub mod voice_api;

#[cfg(test)]
pub(crate) mod test_backend;
