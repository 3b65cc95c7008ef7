#![warn(non_snake_case)]

pub mod config;
pub mod net;
pub mod options;
pub mod unfold;
