//! Roles, decision records and the role partition.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic role of a column, describing its intended use rather than its storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Summed and averaged.
    Numeric,
    /// Bucketed by month.
    Date,
    /// Ranked by value frequency.
    Categorical,
    /// Names, references and keys.
    Identifier,
    /// Workflow states such as open/closed or yes/no.
    Status,
}

impl Role {
    /// All roles in partition order.
    pub const ALL: [Role; 5] = [
        Role::Numeric,
        Role::Categorical,
        Role::Date,
        Role::Identifier,
        Role::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Numeric => "numeric",
            Role::Date => "date",
            Role::Categorical => "categorical",
            Role::Identifier => "identifier",
            Role::Status => "status",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule of the priority chain that decided a column's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    /// No non-missing values; defaults to categorical.
    EmptyColumn,
    /// Every value is already a timestamp.
    NativeDate,
    /// Every value is already a number.
    NativeNumeric,
    /// Date-like name and enough values parse as dates.
    DateKeywordParse,
    /// Enough values coerce to numbers.
    NumericCoercion,
    /// At least one value is a status word.
    StatusVocabulary,
    /// Identifier-like name.
    IdentifierKeyword,
    /// Nothing else matched.
    Fallback,
}

impl DecisionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionRule::EmptyColumn => "empty_column",
            DecisionRule::NativeDate => "native_date",
            DecisionRule::NativeNumeric => "native_numeric",
            DecisionRule::DateKeywordParse => "date_keyword_parse",
            DecisionRule::NumericCoercion => "numeric_coercion",
            DecisionRule::StatusVocabulary => "status_vocabulary",
            DecisionRule::IdentifierKeyword => "identifier_keyword",
            DecisionRule::Fallback => "fallback",
        }
    }
}

/// Per-column decision details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    /// Column name
    pub name: String,
    /// Position of the column in the table
    pub index: usize,
    /// Assigned role
    pub role: Role,
    /// Rule that assigned the role
    pub rule: DecisionRule,
    /// Number of non-missing cells
    pub non_missing: usize,
    /// Fraction of non-missing cells parsed as dates, if the date rule ran
    pub date_fraction: Option<f64>,
    /// Fraction of non-missing cells coerced to numbers, if the numeric rule ran
    pub numeric_fraction: Option<f64>,
}

/// Disjoint assignment of every column name to exactly one role.
///
/// Names keep their table order within each role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePartition {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub date: Vec<String>,
    pub identifier: Vec<String>,
    pub status: Vec<String>,
}

impl RolePartition {
    /// Column names assigned to `role`.
    pub fn get(&self, role: Role) -> &[String] {
        match role {
            Role::Numeric => &self.numeric,
            Role::Date => &self.date,
            Role::Categorical => &self.categorical,
            Role::Identifier => &self.identifier,
            Role::Status => &self.status,
        }
    }

    pub(crate) fn push(&mut self, role: Role, name: String) {
        match role {
            Role::Numeric => self.numeric.push(name),
            Role::Date => self.date.push(name),
            Role::Categorical => self.categorical.push(name),
            Role::Identifier => self.identifier.push(name),
            Role::Status => self.status.push(name),
        }
    }

    /// Role assigned to the named column, if it is part of the partition.
    pub fn role_of(&self, name: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| self.get(*role).iter().any(|n| n == name))
    }

    /// Iterates over `(role, column name)` pairs in partition order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &str)> {
        Role::ALL
            .into_iter()
            .flat_map(move |role| self.get(role).iter().map(move |n| (role, n.as_str())))
    }

    /// Total number of classified columns.
    pub fn len(&self) -> usize {
        Role::ALL.iter().map(|r| self.get(*r).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
