use thiserror::Error;

use crate::diagnostic::Diagnostic;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize },

    #[error("Variable '{name}' cannot be reinitialized.")]
    AlreadyDefined { name: String, line: usize },

    #[error("Operand of '{operator}' must be a number.")]
    NumberOperand { operator: String, line: usize },

    #[error("Operands of '{operator}' must be numbers.")]
    NumberOperands { operator: String, line: usize },

    #[error("Operands of '{operator}' must be two numbers or two strings.")]
    AddOperands { operator: String, line: usize },

    #[error("Failed to write output: {message}")]
    Output { message: String },
}

impl RuntimeError {
    pub fn undefined_variable(name: impl Into<String>, line: usize) -> Self {
        Self::UndefinedVariable { name: name.into(), line }
    }

    pub fn already_defined(name: impl Into<String>, line: usize) -> Self {
        Self::AlreadyDefined { name: name.into(), line }
    }

    pub fn number_operand(operator: impl ToString, line: usize) -> Self {
        Self::NumberOperand { operator: operator.to_string(), line }
    }

    pub fn number_operands(operator: impl ToString, line: usize) -> Self {
        Self::NumberOperands { operator: operator.to_string(), line }
    }

    pub fn add_operands(operator: impl ToString, line: usize) -> Self {
        Self::AddOperands { operator: operator.to_string(), line }
    }

    /// Source line the error is attributed to, when one is known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UndefinedVariable { line, .. }
            | Self::AlreadyDefined { line, .. }
            | Self::NumberOperand { line, .. }
            | Self::NumberOperands { line, .. }
            | Self::AddOperands { line, .. } => Some(*line),
            Self::Output { .. } => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::runtime(self.line(), self.to_string())
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(error: std::io::Error) -> Self {
        Self::Output { message: error.to_string() }
    }
}
