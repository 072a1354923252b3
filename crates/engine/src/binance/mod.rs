pub mod rest;

pub use rest::{parse_klines, BinanceClient};
