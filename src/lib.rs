pub mod config;
pub mod dashboard;
pub mod geo;
pub mod globe;
pub mod news;
pub mod panel;
pub mod risk;
pub mod translate;
pub mod view;
