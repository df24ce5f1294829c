use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog technology. `name` is unique and compared case-sensitively as stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Technology {
    pub id: i32,
    pub name: String,
    /// Informational only (backend, frontend, mobile, ...).
    pub category: Option<String>,
}

#[cfg(test)]
impl Technology {
    pub fn new(id: i32, name: &str, category: Option<&str>) -> Self {
        Self {
            id,
            name: name.to_string(),
            category: category.map(String::from),
        }
    }
}
