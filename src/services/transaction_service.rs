// ==================== TRANSACTION ROWS ====================
// Turns an append payload into the ledger row
// [date, expense, income, amount, currency, account, recorded_on].

use crate::gsheets::Row;
use crate::models::TransactionPayload;
use crate::utils::AppError;
use chrono::{DateTime, Local};
use serde_json::Value;

pub const PLACEHOLDER: &str = "-";
pub const ZERO_AMOUNT: &str = "(zero amount)";
pub const RECORDED_ON_FORMAT: &str = "%d.%m.%Y, %H:%M";

/// Which of the two mutually exclusive columns receives the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Expense,
    Income,
    Zero,
}

impl Direction {
    pub fn of(amount: f64) -> Self {
        if amount < 0.0 {
            Direction::Expense
        } else if amount > 0.0 {
            Direction::Income
        } else {
            Direction::Zero
        }
    }

    /// `(expense column, income column)` for `reason`.
    pub fn columns(&self, reason: &str) -> (String, String) {
        match self {
            Direction::Expense => (reason.to_string(), PLACEHOLDER.to_string()),
            Direction::Income => (PLACEHOLDER.to_string(), reason.to_string()),
            Direction::Zero => (ZERO_AMOUNT.to_string(), ZERO_AMOUNT.to_string()),
        }
    }
}

fn or_placeholder(value: &Option<String>) -> Value {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Value::from(v),
        _ => Value::from(PLACEHOLDER),
    }
}

/// Builds the ledger row. `now` stamps entries that carry no `recordedOn`.
pub fn build_row(payload: &TransactionPayload, now: DateTime<Local>) -> Result<Row, AppError> {
    let date = payload
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::Validation("'date' cannot be empty".to_string()))?;

    let amount = payload
        .amount
        .clone()
        .ok_or_else(|| {
            log::error!("❌ 'amount' cannot be none");
            AppError::Validation("'amount' cannot be none".to_string())
        })?;
    let value = amount
        .as_f64()
        .ok_or_else(|| AppError::Validation("'amount' is not a number".to_string()))?;

    let reason = payload
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(PLACEHOLDER);

    let direction = Direction::of(value);
    if direction == Direction::Zero {
        log::warn!("⚠️ A zero amount in request payload. Might it be a mistake client-side?");
    }
    let (expense, income) = direction.columns(reason);

    let recorded_on = match payload.recorded_on.as_deref().map(str::trim) {
        Some(ts) if !ts.is_empty() => ts.to_string(),
        _ => now.format(RECORDED_ON_FORMAT).to_string(),
    };

    Ok(vec![
        Value::from(date),
        Value::from(expense),
        Value::from(income),
        Value::Number(amount),
        or_placeholder(&payload.currency),
        or_placeholder(&payload.account),
        Value::from(recorded_on),
    ])
}
