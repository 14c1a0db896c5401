pub mod attach;
pub mod connection;
pub mod reference;

pub use attach::*;
pub use connection::*;
pub use reference::*;
