pub mod ingest;
pub mod process;
pub mod report;
