pub mod args;
pub mod config;
pub mod error;
pub mod ocr;
pub mod pipeline;
pub mod region;
pub mod vocabulary;
