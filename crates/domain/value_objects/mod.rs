pub mod api;
pub mod enums;
pub mod strategies;
pub mod video;
pub mod voice;
