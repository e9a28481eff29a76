#![deny(unsafe_code)]

pub mod catalog;
pub mod encoding;
pub mod event;
pub mod export;
pub mod settings;
