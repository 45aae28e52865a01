pub mod http_fetch;
pub mod nws;
pub mod zippopotam;
