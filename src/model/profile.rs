use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ticket::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    It,
    Hr,
    Finance,
    Marketing,
    Sales,
    Operations,
    Other,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::It,
        Department::Hr,
        Department::Finance,
        Department::Marketing,
        Department::Sales,
        Department::Operations,
        Department::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::It => "it",
            Department::Hr => "hr",
            Department::Finance => "finance",
            Department::Marketing => "marketing",
            Department::Sales => "sales",
            Department::Operations => "operations",
            Department::Other => "other",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| ParseEnumError {
                kind: "department",
                value: s.to_string(),
                expected: Department::ALL
                    .iter()
                    .map(|d| d.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// The local user's contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: Department,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            phone: "+1 234 567 8900".to_string(),
            department: Department::It,
        }
    }
}
