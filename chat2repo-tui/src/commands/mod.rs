pub mod ask;
pub mod health;
pub mod output;
pub mod sessions;
