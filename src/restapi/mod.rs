mod client;
mod poll;
mod transport;

pub use client::RestApi;
pub use poll::{poll, MIN_PERIOD};
pub use transport::Transport;
