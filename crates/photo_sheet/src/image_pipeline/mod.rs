pub mod fit;
pub mod intake;
pub mod store;
