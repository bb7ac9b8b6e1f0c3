//! SQL dialect selection for rendered DDL.

use crate::model::ColumnFlag;

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// MySQL / MariaDB (the host's native database)
    #[default]
    MySQL,
    /// PostgreSQL
    PostgreSQL,
}

impl Dialect {
    /// Parse dialect from string.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySQL),
            "postgres" | "postgresql" | "pg" => Some(Self::PostgreSQL),
            _ => None,
        }
    }

    pub fn flag(self, flag: ColumnFlag) -> &'static str {
        match (flag, self) {
            (ColumnFlag::NotNull, _) => "NOT NULL",
            (ColumnFlag::AutoIncrement, Dialect::MySQL) => "AUTO_INCREMENT",
            (ColumnFlag::AutoIncrement, Dialect::PostgreSQL) => "GENERATED BY DEFAULT AS IDENTITY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Dialect::from_name("Postgres"), Some(Dialect::PostgreSQL));
        assert_eq!(Dialect::from_name("mysql"), Some(Dialect::MySQL));
        assert_eq!(Dialect::from_name("oracle"), None);
    }

    #[test]
    fn test_auto_increment_token() {
        assert_eq!(Dialect::MySQL.flag(ColumnFlag::AutoIncrement), "AUTO_INCREMENT");
        assert_eq!(
            Dialect::PostgreSQL.flag(ColumnFlag::AutoIncrement),
            "GENERATED BY DEFAULT AS IDENTITY"
        );
    }
}
