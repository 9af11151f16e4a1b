pub mod brief;
pub mod events;
pub mod health;
pub mod history;
pub mod subscriptions;
