pub mod answer;
pub mod config;
pub mod report;
pub mod survey;
