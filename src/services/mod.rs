pub mod charts;
pub mod excel;
pub mod loader;
pub mod preview;
pub mod profiler;
pub mod samples;
pub mod statistics;
pub mod views;
