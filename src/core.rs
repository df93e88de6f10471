pub mod config;
pub mod error;
pub mod interval;
pub mod planner;
pub mod point;
pub mod quota;
pub mod range;
pub mod series;
pub mod state;
pub mod window;
