pub mod mention;
pub mod order;
pub mod product;
pub mod reservation;
