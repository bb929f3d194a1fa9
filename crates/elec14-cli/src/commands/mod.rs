pub mod devices;
pub mod evaluate;
