pub mod browse;
pub mod documents;
pub mod runtime;
pub mod security;
pub mod watch;
