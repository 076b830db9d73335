pub mod dramabox;
pub mod health;
pub mod telegram;
