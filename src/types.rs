/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// The closed set of tables the admin surface is allowed to touch.
///
/// Operation requests carry a table name on the wire; parsing it into this
/// enum is what keeps caller-supplied strings away from SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    PersonalInfo,
    Projects,
    Skills,
    ProjectSkills,
    WorkExperience,
    ContactInquiries,
}

impl Table {
    /// SQL table name. Safe to interpolate: the set is closed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::PersonalInfo => "personal_info",
            Table::Projects => "projects",
            Table::Skills => "skills",
            Table::ProjectSkills => "project_skills",
            Table::WorkExperience => "work_experience",
            Table::ContactInquiries => "contact_inquiries",
        }
    }

    pub fn all() -> [Table; 6] {
        [
            Table::PersonalInfo,
            Table::Projects,
            Table::Skills,
            Table::ProjectSkills,
            Table::WorkExperience,
            Table::ContactInquiries,
        ]
    }
}

impl std::str::FromStr for Table {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal_info" => Ok(Table::PersonalInfo),
            "projects" => Ok(Table::Projects),
            "skills" => Ok(Table::Skills),
            "project_skills" => Ok(Table::ProjectSkills),
            "work_experience" => Ok(Table::WorkExperience),
            "contact_inquiries" => Ok(Table::ContactInquiries),
            other => Err(UnknownTable(other.to_string())),
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTable(pub String);

impl std::fmt::Display for UnknownTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown table: {}", self.0)
    }
}

impl std::error::Error for UnknownTable {}
