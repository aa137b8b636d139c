pub mod geocode;
pub mod locations;
pub mod planner;
pub mod storage;
