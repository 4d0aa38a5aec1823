//! Real-time session and synchronization core of the board.
//!
//! A connection registers with the [`dispatcher::Dispatcher`], feeds decoded
//! [`larder_types::events::ClientCommand`]s to [`Gateway::dispatch`], and
//! receives whatever [`outcome::Delivery`] targets it. Store calls are the
//! only points where a handler suspends.

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod nickname;
pub mod outcome;
pub mod password;
mod presence;
mod recipes;
mod store;

pub use handler::Gateway;
