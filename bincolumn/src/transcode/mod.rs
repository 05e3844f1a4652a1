//! Conversions between Column values and other formats.

pub mod json;
pub mod toml;
pub mod xml;
pub mod yaml;
