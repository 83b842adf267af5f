pub mod config;
pub mod sessions;
pub mod subjects;
pub mod timer;
pub mod topics;
