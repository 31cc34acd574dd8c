use serde::{Deserialize, Serialize};

/// Comma separated, quoted column names of a table row type, in declaration order.
pub trait ColumnList {
    fn column_list() -> &'static str;
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
