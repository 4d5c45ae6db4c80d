pub mod client;
pub mod events;
pub mod middleware;
pub mod webhook;
