pub mod dramabox;
pub mod metrics;
pub mod normalizer;
pub mod telegram;
