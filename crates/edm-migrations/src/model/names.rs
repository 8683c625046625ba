//! Schema-qualified names and default constraint names.

use std::fmt;

/// Longest identifier the generators emit.
pub const MAX_NAME_LENGTH: usize = 128;

/// A possibly schema-qualified database object name (`schema.name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseName {
    schema: Option<String>,
    name: String,
}

impl DatabaseName {
    pub fn new(schema: Option<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.filter(|s| !s.is_empty()),
            name: name.into(),
        }
    }

    /// Parse `schema.name` or a bare `name`.
    pub fn parse(qualified: &str) -> Self {
        match qualified.split_once('.') {
            Some((schema, name)) => Self::new(Some(schema.to_string()), name),
            None => Self::new(None, qualified),
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema, or `default_schema` when unqualified.
    pub fn schema_or<'a>(&'a self, default_schema: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(default_schema)
    }

    /// Same object in another schema.
    pub fn with_schema(&self, schema: Option<String>) -> Self {
        Self::new(schema, self.name.clone())
    }

    /// Same schema, another name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self::new(self.schema.clone(), name)
    }

    /// Case-insensitive comparison, filling in `default_schema` on either side.
    pub fn matches(&self, other: &DatabaseName, default_schema: &str) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self
                .schema_or(default_schema)
                .eq_ignore_ascii_case(other.schema_or(default_schema))
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<&str> for DatabaseName {
    fn from(qualified: &str) -> Self {
        DatabaseName::parse(qualified)
    }
}

/// Strip the schema from a qualified table name.
pub fn strip_schema(table: &str) -> &str {
    table.split_once('.').map_or(table, |(_, name)| name)
}

/// Truncate a generated name to [`MAX_NAME_LENGTH`] characters.
pub fn restrict(name: String) -> String {
    if name.chars().count() <= MAX_NAME_LENGTH {
        return name;
    }
    name.chars().take(MAX_NAME_LENGTH).collect()
}

/// `PK_{table}`.
pub fn primary_key_name(table: &str) -> String {
    restrict(format!("PK_{}", strip_schema(table)))
}

/// `FK_{dependent}_{principal}_{columns}`.
pub fn foreign_key_name(dependent_table: &str, principal_table: &str, columns: &[String]) -> String {
    restrict(format!(
        "FK_{}_{}_{}",
        strip_schema(dependent_table),
        strip_schema(principal_table),
        columns.join("_")
    ))
}

/// `IX_{table}_{columns}`.
pub fn index_name(table: &str, columns: &[String]) -> String {
    restrict(format!("IX_{}_{}", strip_schema(table), columns.join("_")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let name = DatabaseName::parse("dbo.Customers");
        assert_eq!(name.schema(), Some("dbo"));
        assert_eq!(name.name(), "Customers");
        assert_eq!(name.to_string(), "dbo.Customers");

        let bare = DatabaseName::parse("Customers");
        assert_eq!(bare.schema(), None);
        assert_eq!(bare.schema_or("dbo"), "dbo");
        assert_eq!(bare.to_string(), "Customers");
    }

    #[test]
    fn test_matches_uses_default_schema() {
        let bare = DatabaseName::parse("customers");
        assert!(bare.matches(&DatabaseName::parse("dbo.Customers"), "dbo"));
        assert!(!bare.matches(&DatabaseName::parse("sales.Customers"), "dbo"));
    }

    #[test]
    fn test_default_constraint_names() {
        let columns = vec!["ProductId".to_string(), "Sku".to_string()];
        assert_eq!(
            foreign_key_name("dbo.OrderLines", "MigrationsProducts", &columns),
            "FK_OrderLines_MigrationsProducts_ProductId_Sku"
        );
        assert_eq!(primary_key_name("sales.Orders"), "PK_Orders");
        assert_eq!(index_name("dbo.Orders", &columns), "IX_Orders_ProductId_Sku");
    }

    #[test]
    fn test_long_names_are_restricted() {
        let long = "C".repeat(200);
        assert_eq!(primary_key_name(&long).len(), MAX_NAME_LENGTH);
    }
}
