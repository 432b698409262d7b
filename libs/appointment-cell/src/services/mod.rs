pub mod reminder;
pub mod store;

pub use reminder::*;
pub use store::*;
