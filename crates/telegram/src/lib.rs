pub mod bot;

pub use bot::{DeliveryError, TelegramClient};
