pub mod http;
pub mod noop;
