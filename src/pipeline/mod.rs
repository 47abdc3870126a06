pub mod extraction;
pub mod storage;
pub mod generation;
pub mod analysis;
pub mod processor; // Upload pipeline: extract → table → analysis
