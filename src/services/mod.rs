pub mod batch;
pub mod error;
pub mod gallery;
pub mod pipeline;
pub mod storage;
pub mod vision;
