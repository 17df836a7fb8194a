pub mod spreadsheet_service;
pub mod user_registry;
pub mod transaction_service;
pub mod telegram_service;
