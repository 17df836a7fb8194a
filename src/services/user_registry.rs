use crate::models::User;
use crate::utils::AppError;
use std::collections::HashMap;

/// In-memory user store. Lives as long as the process.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: HashMap<String, User>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, user_name: &str, user_email: Option<&str>) -> User {
        let mut user = User::new(user_name, user_email.map(String::from));
        // UUID v4 collisions are not expected, but ids must never be reused.
        while self.users.contains_key(user.user_id()) {
            user = User::new(user_name, user_email.map(String::from));
        }
        log::info!("👤 User '{}' registered ({})", user.user_name, user.user_id());
        self.users.insert(user.user_id().to_string(), user.clone());
        user
    }

    pub fn delete(&mut self, user_id: &str) {
        if self.users.remove(user_id).is_some() {
            log::info!("🗑️  User {} removed", user_id);
        }
    }

    pub fn get(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    /// First user with that name; names are not unique.
    pub fn get_by_name(&self, user_name: &str) -> Option<&User> {
        self.users.values().find(|u| u.user_name == user_name)
    }

    pub fn get_spreadsheet(&self, user_id: &str) -> Option<&str> {
        self.get(user_id).and_then(|u| u.spreadsheet_id())
    }

    pub fn set_spreadsheet(&mut self, user_id: &str, spreadsheet_id: &str) -> Result<(), AppError> {
        if spreadsheet_id.trim().is_empty() {
            return Err(AppError::Validation("Spreadsheet ID is invalid.".to_string()));
        }
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("User ID '{}' does not exist.", user_id)))?;
        user.link_spreadsheet(spreadsheet_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
