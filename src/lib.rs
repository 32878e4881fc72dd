pub mod api;
pub mod config;
pub mod dashboard;
pub mod logger;
pub mod server;

#[cfg(test)]
mod test_support;

pub use self::config::Config;
