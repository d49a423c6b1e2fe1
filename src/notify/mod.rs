// src/notify/mod.rs
mod message;
mod whatsapp;

pub use message::{area_counts, format_batch_message};
pub use whatsapp::{notify_listings, notify_new_listings, Messenger, TwilioClient};
