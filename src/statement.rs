use log::debug;
use thiserror::Error;

use crate::{
    cursor::{Cursor, ExecuteError},
    row::Row,
    table::Table,
};

/// Failures parsing a line into a [`Statement`].
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("missing fields in insert arguments")]
    SyntaxError,
    #[error("a field exceeded its maximum length")]
    StringTooLong,
    #[error("too many fields were provided")]
    TooManyFields,
    #[error("id contains a negative value")]
    NegativeId,
    #[error("unrecognized statement: {0}")]
    UnrecognizedStatement(String),
}

impl PrepareError {
    pub fn message(&self, line: &str) -> String {
        match self {
            PrepareError::SyntaxError => format!("Failed to parse arguments for query {line}."),
            PrepareError::StringTooLong => {
                "Failed to parse query. The fields exceeded maximum length.".to_string()
            }
            PrepareError::TooManyFields => {
                "Failed to parse query. Too many fields were provided.".to_string()
            }
            PrepareError::NegativeId => {
                "Failed to parse the query. It contains a negative id.".to_string()
            }
            PrepareError::UnrecognizedStatement(line) => format!("Unkown query: {line}."),
        }
    }
}

pub enum Statement {
    Select,
    Insert(Row),
}

impl Statement {
    pub fn prepare_statement(line: &str) -> Result<Self, PrepareError> {
        let trimmed = line.trim();
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let keyword = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").trim();

        match keyword {
            "insert" => {
                let row = rest.parse::<Row>()?;
                Ok(Statement::Insert(row))
            }
            "select" => Ok(Statement::Select),
            _ => Err(PrepareError::UnrecognizedStatement(trimmed.to_string())),
        }
    }

    pub fn execute(self, table: &mut Table) -> Result<Vec<String>, ExecuteError> {
        match self {
            Statement::Insert(row) => {
                debug!("executing insert id={}", row.id);
                let mut cursor = Cursor::table_end(table)?;
                cursor.insert_row(row)?;
                Ok(Vec::new())
            }
            Statement::Select => {
                debug!("executing select");
                let mut rows = Vec::new();
                let mut cursor = Cursor::table_start(table)?;
                while !cursor.end_of_table() {
                    rows.push(cursor.value()?.to_string());
                    cursor.advance()?;
                }
                Ok(rows)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn prepares_insert_statement() {
        let stmt = Statement::prepare_statement("insert 1 alice alice@x").unwrap();
        assert!(matches!(stmt, Statement::Insert(_)));
    }

    #[test]
    fn prepares_select_statement() {
        let stmt = Statement::prepare_statement("select").unwrap();
        assert!(matches!(stmt, Statement::Select));
    }

    #[test]
    fn rejects_unrecognized_statement() {
        let err = Statement::prepare_statement("delete 1").unwrap_err();
        assert!(matches!(err, PrepareError::UnrecognizedStatement(_)));
        assert_eq!(err.message("delete 1"), "Unkown query: delete 1.");
    }

    #[test]
    fn syntax_error_message_includes_original_line() {
        let err = Statement::prepare_statement("insert 1 alice").unwrap_err();
        assert!(matches!(err, PrepareError::SyntaxError));
        assert_eq!(
            err.message("insert 1 alice"),
            "Failed to parse arguments for query insert 1 alice."
        );
    }

    #[test]
    fn insert_then_select_round_trips_through_execute() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::db_open(file.path().to_str().unwrap()).unwrap();

        Statement::prepare_statement("insert 1 alice alice@x")
            .unwrap()
            .execute(&mut table)
            .unwrap();

        let rows = Statement::prepare_statement("select")
            .unwrap()
            .execute(&mut table)
            .unwrap();

        assert_eq!(rows, vec!["{id:1, email:alice@x, user:alice }"]);
    }
}
