//! Validation module
//!
//! Table and column names end up interpolated into generated SQL, so every
//! identifier registered in a schema or used as a write column is checked here
//! first. Names are rendered through [`quote_ident`], so keywords and mixed
//! case names such as `user` or `createdAt` are usable columns.

use std::borrow::Cow;
use std::fmt;

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name contains invalid characters (only alphanumeric and underscore allowed)
    InvalidCharacters(String),
    /// Name is too long (PostgreSQL limit is 63 characters)
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
    /// Name starts with invalid character (must start with letter or underscore)
    InvalidStartCharacter(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in name '{}': only alphanumeric characters and underscores are allowed", name)
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            ValidationError::Empty => {
                write!(f, "Name cannot be empty")
            }
            ValidationError::InvalidStartCharacter(name) => {
                write!(f, "Name '{}' must start with a letter or underscore", name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated table name that is safe to use in SQL queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    /// PostgreSQL identifier length limit
    const MAX_LENGTH: usize = 63;

    /// Create a new validated table name
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    /// Get the validated name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the validated name as a String
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Renders the SQL form, quoted when needed
impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_ident(&self.0))
    }
}

/// A validated field name that is safe to use in SQL queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName(String);

impl ValidatedFieldName {
    /// Create a new validated field name
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    /// Get the validated name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the validated name as a String
    pub fn into_string(self) -> String {
        self.0
    }

    /// `table.column` form used in generated SQL
    pub fn qualified(&self, table: &ValidatedTableName) -> String {
        qualify(table.as_str(), self.as_str())
    }
}

/// Renders the SQL form, quoted when needed
impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_ident(&self.0))
    }
}

/// Join a table and column into a qualified reference
pub fn qualify(table: &str, column: &str) -> String {
    let table = quote_ident(table);
    let column = quote_ident(column);
    let mut qualified = String::with_capacity(table.len() + column.len() + 1);
    qualified.push_str(&table);
    qualified.push('.');
    qualified.push_str(&column);
    qualified
}

/// Quote `name` the way PostgreSQL's `quote_ident` does: bare when it is a
/// lowercase, non-keyword identifier, double-quoted otherwise.
pub fn quote_ident(name: &str) -> Cow<'_, str> {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !is_reserved_keyword(name);

    if plain {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\"{}\"", name.replace('"', "\"\"")))
    }
}

/// Common validation logic for SQL identifiers
fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    let first_char = name.chars().next().ok_or(ValidationError::Empty)?;

    if name.len() > ValidatedTableName::MAX_LENGTH {
        return Err(ValidationError::TooLong {
            name: name.to_string(),
            length: name.len(),
            max_length: ValidatedTableName::MAX_LENGTH,
        });
    }

    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(ValidationError::InvalidStartCharacter(name.to_string()));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidCharacters(name.to_string()));
    }

    Ok(())
}

/// Keywords PostgreSQL refuses as bare identifiers
fn is_reserved_keyword(name: &str) -> bool {
    const RESERVED_KEYWORDS: &[&str] = &[
        "ALL", "AND", "ANY", "ARRAY", "AS", "ASC", "CASE", "CHECK", "COLUMN",
        "CONSTRAINT", "CREATE", "DEFAULT", "DESC", "DISTINCT", "DO", "ELSE", "END",
        "EXCEPT", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "GRANT", "GROUP",
        "HAVING", "IN", "INTERSECT", "INTO", "LIMIT", "NOT", "NULL", "OFFSET", "ON",
        "OR", "ORDER", "PRIMARY", "REFERENCES", "RETURNING", "SELECT", "TABLE",
        "THEN", "TO", "TRUE", "UNION", "UNIQUE", "USER", "USING", "WHEN", "WHERE",
        "WITH",
    ];

    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        let valid_names = [
            "posts",
            "author_id",
            "createdAt",
            "_private_table",
            "date",
            "status",
            "user",
            "order",
            &"a".repeat(63),
        ];

        for name in valid_names {
            assert!(
                ValidatedTableName::new(name).is_ok(),
                "Should accept valid name: {}",
                name
            );
        }
    }

    #[test]
    fn test_invalid_names() {
        let test_cases = [
            ("", ValidationError::Empty),
            (
                "123table",
                ValidationError::InvalidStartCharacter("123table".to_string()),
            ),
            (
                "author.name",
                ValidationError::InvalidCharacters("author.name".to_string()),
            ),
            (
                "name; DROP",
                ValidationError::InvalidCharacters("name; DROP".to_string()),
            ),
        ];

        for (name, expected_error) in test_cases {
            let result = ValidatedFieldName::new(name);
            assert_eq!(result.unwrap_err(), expected_error, "name: {}", name);
        }
    }

    #[test]
    fn test_too_long_name() {
        let long_name = "a".repeat(64);
        match ValidatedTableName::new(&long_name).unwrap_err() {
            ValidationError::TooLong {
                length, max_length, ..
            } => {
                assert_eq!(length, 64);
                assert_eq!(max_length, 63);
            }
            other => panic!("Expected TooLong error, got {:?}", other),
        }
    }

    #[test]
    fn test_qualified_reference() {
        let table = ValidatedTableName::new("authors").unwrap();
        let field = ValidatedFieldName::new("name").unwrap();
        assert_eq!(field.qualified(&table), "authors.name");
        assert_eq!(format!("{}", table), "authors");
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("title"), "title");
        assert_eq!(quote_ident("author_id2"), "author_id2");
        assert_eq!(quote_ident("user"), "\"user\"");
        assert_eq!(quote_ident("Order"), "\"Order\"");
        assert_eq!(quote_ident("createdAt"), "\"createdAt\"");

        assert_eq!(qualify("orders", "user"), "orders.\"user\"");
        assert_eq!(qualify("group", "id"), "\"group\".id");

        let field = ValidatedFieldName::new("desc").unwrap();
        assert_eq!(field.to_string(), "\"desc\"");
        assert_eq!(field.as_str(), "desc");
    }
}
