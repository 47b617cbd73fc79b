pub mod basic;
pub mod registry;
