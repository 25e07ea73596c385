mod common;

mod assessment;
mod scoring;
