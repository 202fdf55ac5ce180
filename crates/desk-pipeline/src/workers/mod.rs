//! Specialist workers of the analysis desk

mod critic;
mod data_analyst;
mod journalist;
mod writer;

pub use critic::CriticWorker;
pub use data_analyst::DataAnalystWorker;
pub use journalist::JournalistWorker;
pub use writer::WriterWorker;
