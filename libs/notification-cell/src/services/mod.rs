pub mod notification;
pub mod recipients;
pub mod store;

pub use notification::*;
pub use recipients::*;
pub use store::*;
