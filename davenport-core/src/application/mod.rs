pub mod agent;
pub mod catalog;
pub mod checkpoint;
