use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub reason: String,
}

impl ErrorMessage {
    pub fn new(reason: impl ToString) -> Self {
        ErrorMessage {
            reason: reason.to_string(),
        }
    }
}
