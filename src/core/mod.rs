pub mod collector;
pub mod latch;
pub mod lister;
pub mod prober;
pub mod progress;
pub mod wait_group;
pub mod walker;
