pub mod email;
pub mod http_client;
pub mod limiter;
pub mod utils;
