use thiserror::Error;

/// Schema 错误类型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("invalid input at `/{}`: {message}", .path.join("/"))]
    Validation { message: String, path: Vec<String> },
}

impl SchemaError {
    pub(crate) fn at(path: &[String], message: impl Into<String>) -> Self {
        SchemaError::Validation {
            message: message.into(),
            path: path.to_vec(),
        }
    }

    pub fn path(&self) -> &[String] {
        match self {
            SchemaError::Validation { path, .. } => path,
        }
    }
}
