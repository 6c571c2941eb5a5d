pub mod classifier;
pub mod colourizer;
pub mod gateway;
pub mod metadata;
pub mod notifier;
pub mod pipeline;
pub mod queue;
pub mod result_store;
pub mod staging;
pub mod storage;
