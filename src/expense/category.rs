//! The fixed set of categories an expense can be filed under.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::Serialize;

use crate::Error;

/// The category of an expense.
///
/// The variant order is the order categories are listed in forms and tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Food,
    Transportation,
    Housing,
    Entertainment,
    Utilities,
    Healthcare,
    Education,
    Shopping,
    Other,
}

impl Category {
    /// Every category in declaration order.
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Transportation,
        Category::Housing,
        Category::Entertainment,
        Category::Utilities,
        Category::Healthcare,
        Category::Education,
        Category::Shopping,
        Category::Other,
    ];

    /// The display name, which is also how the category is stored and sent over the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Housing => "Housing",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }

    /// The colour used for this category in charts.
    pub fn colour(&self) -> &'static str {
        match self {
            Category::Food => "#22c55e",
            Category::Transportation => "#3b82f6",
            Category::Housing => "#f59e0b",
            Category::Entertainment => "#ef4444",
            Category::Utilities => "#06b6d4",
            Category::Healthcare => "#a855f7",
            Category::Education => "#14b8a6",
            Category::Shopping => "#f97316",
            Category::Other => "#64748b",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parse a category from its exact name, e.g. "Food".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_owned()))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.name()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(error.to_string().into()))
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::Category;

    #[test]
    fn parses_every_category_name() {
        for category in Category::ALL {
            assert_eq!(category.name().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn rejects_unknown_category() {
        assert_eq!(
            "Snacks".parse::<Category>(),
            Err(Error::InvalidCategory("Snacks".to_owned()))
        );
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("food".parse::<Category>().is_err());
    }

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&Category::Transportation).unwrap();

        assert_eq!(json, "\"Transportation\"");
    }

    #[test]
    fn every_category_has_a_distinct_colour() {
        let mut colours: Vec<_> = Category::ALL.iter().map(Category::colour).collect();
        colours.sort();
        colours.dedup();

        assert_eq!(colours.len(), Category::ALL.len());
    }
}
