pub mod connection;
pub mod planner;
