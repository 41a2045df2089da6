pub mod account_type;
pub mod backend;
pub mod config;
pub mod coordinate;
pub mod http_error;
pub mod middleware;
pub mod retry;
pub mod rto;
pub mod sse;
pub mod subscription;
