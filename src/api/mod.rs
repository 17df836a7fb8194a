pub mod health;
pub mod metrics;
pub mod edit;
pub mod users;
pub mod telegram;
pub mod swagger;
