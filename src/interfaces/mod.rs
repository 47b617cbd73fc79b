pub mod container;
pub mod descriptor;
