pub mod grid;
pub mod page;
pub mod paginate;
