pub mod dag;
pub mod dataset;
