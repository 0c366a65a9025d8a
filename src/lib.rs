extern crate enum_dispatch;

pub mod config;
pub mod util;

pub mod model;
pub mod view;
