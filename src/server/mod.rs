//! TCP server driving one parser/writer pair per connection.

pub mod handler;
pub mod listener;

pub use handler::Handler;
pub use listener::Server;
