pub mod dag;
