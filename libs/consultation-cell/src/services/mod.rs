pub mod consultation;
pub mod store;

pub use consultation::*;
pub use store::*;
