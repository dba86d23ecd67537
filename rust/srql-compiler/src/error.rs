use crate::dialect::Backend;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Location of a token in the query text. Line and column are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at {position}: {message}")]
pub struct SyntaxError {
    pub position: Position,
    pub message: String,
}

impl SyntaxError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("unknown entity '{name}' at {position}")]
    UnknownEntity { name: String, position: Position },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("cannot bind {found} value as {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("array values must share one type: found {first} and {other}")]
    MixedArray {
        first: &'static str,
        other: &'static str,
    },

    #[error("array parameters must contain at least one value")]
    EmptyArray,

    #[error("invalid timestamp '{value}': expected an RFC 3339 timestamp with a zone")]
    InvalidTimestamp { value: String },

    #[error("{0} values cannot be bound as parameters")]
    Unbindable(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("entity '{entity}' is not available on backend '{backend}'")]
    UnsupportedEntity { entity: String, backend: Backend },

    #[error("function '{function}' is not supported on backend '{backend}'")]
    UnsupportedFunction { function: String, backend: Backend },

    #[error("invalid literal for '{field} {operator}': {reason}")]
    InvalidLiteralForOperator {
        field: String,
        operator: String,
        reason: String,
    },

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error(transparent)]
    Bind(#[from] BindError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SyntaxError,
    UnknownEntity,
    UnsupportedEntity,
    UnsupportedFunction,
    InvalidLiteralForOperator,
    InvalidCursor,
    BindError,
    InvalidRequest,
    Internal,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<SyntaxError> for ServiceError {
    fn from(err: SyntaxError) -> Self {
        ServiceError::Parse(ParseError::Syntax(err))
    }
}

impl From<BindError> for ServiceError {
    fn from(err: BindError) -> Self {
        ServiceError::Translation(TranslationError::Bind(err))
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Parse(ParseError::Syntax(_)) => ErrorKind::SyntaxError,
            ServiceError::Parse(ParseError::UnknownEntity { .. }) => ErrorKind::UnknownEntity,
            ServiceError::Translation(err) => match err {
                TranslationError::UnsupportedEntity { .. } => ErrorKind::UnsupportedEntity,
                TranslationError::UnsupportedFunction { .. } => ErrorKind::UnsupportedFunction,
                TranslationError::InvalidLiteralForOperator { .. } => {
                    ErrorKind::InvalidLiteralForOperator
                }
                TranslationError::InvalidCursor(_) => ErrorKind::InvalidCursor,
                TranslationError::Bind(_) => ErrorKind::BindError,
            },
            ServiceError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            kind: self.kind(),
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_message_carries_position() {
        let err = SyntaxError::new(
            Position {
                offset: 5,
                line: 1,
                column: 6,
            },
            "unexpected token",
        );
        assert_eq!(
            err.to_string(),
            "syntax error at line 1, column 6: unexpected token"
        );
    }

    #[test]
    fn kinds_distinguish_parse_failures() {
        let syntax: ServiceError = SyntaxError::new(Position::start(), "boom").into();
        let entity: ServiceError = ParseError::UnknownEntity {
            name: "widgets".into(),
            position: Position::start(),
        }
        .into();
        assert_eq!(syntax.kind(), ErrorKind::SyntaxError);
        assert_eq!(entity.kind(), ErrorKind::UnknownEntity);
    }

    #[test]
    fn bind_errors_surface_as_translation_errors() {
        let err: ServiceError = BindError::EmptyArray.into();
        assert!(matches!(
            err,
            ServiceError::Translation(TranslationError::Bind(BindError::EmptyArray))
        ));
        assert_eq!(err.kind(), ErrorKind::BindError);
    }
}
