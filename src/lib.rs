// src/lib.rs

//! MHLW COVID-19 case-count crawler and voice-assistant fulfillment.

pub mod error;
pub mod fulfillment;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
