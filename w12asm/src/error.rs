use std::fmt::Display;

use thiserror::Error;

use crate::symbols::SymbolError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("Invalid mcro declaration")]
    InvalidMacro,
    #[error("Invalid endmcro declaration")]
    InvalidEndMacro,
    #[error("Macro `{0}` is never closed")]
    UnterminatedMacro(String),
    #[error("Macro `{0}` is already defined")]
    MacroRedefined(String),

    #[error("Invalid label name `{0}`")]
    InvalidLabel(String),
    #[error("Symbol `{0}` already exists")]
    SymbolExists(String),
    #[error("Empty label")]
    EmptyLabel,
    #[error("Ignored symbol `{0}`")]
    UnnecessarySymbol(String),

    #[error("Invalid data declaration")]
    InvalidData,
    #[error("Invalid string declaration")]
    InvalidString,
    #[error("Invalid quotes")]
    InvalidQuotes,
    #[error("Data operand {0} cannot fit in 12 bits")]
    DataOverflow(i32),

    #[error("Invalid command `{0}`")]
    InvalidCommand(String),
    #[error("Invalid number of operands for `{0}`")]
    InvalidOperandCount(String),
    #[error("Invalid number of commas")]
    InvalidCommas,
    #[error("Unidentified source operand `{0}`")]
    InvalidSourceOperand(String),
    #[error("Unidentified destination operand `{0}`")]
    InvalidDestinationOperand(String),

    #[error("Invalid entry operand `{0}` is already extern")]
    EntryIsExternal(String),
    #[error("Entry `{0}` is not in label table")]
    EntryNotFound(String),

    #[error("Memory overflow: {0} words do not fit in memory")]
    MemoryOverflow(usize),

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: Option<usize>,
    pub error: AsmError,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };
        write!(f, "{}: {}", kind, self.error)?;
        if let Some(line) = self.line {
            write!(f, " at line: {}", line)?;
        }
        Ok(())
    }
}

/// Everything reported while assembling one file. Only errors make the file fail.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    reported: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, line: usize, error: AsmError) {
        self.push(Severity::Error, Some(line), error);
    }

    pub fn warning(&mut self, line: usize, error: AsmError) {
        self.push(Severity::Warning, Some(line), error);
    }

    pub fn file_error(&mut self, error: AsmError) {
        self.push(Severity::Error, None, error);
    }

    fn push(&mut self, severity: Severity, line: Option<usize>, error: AsmError) {
        let diagnostic = Diagnostic {
            severity,
            line,
            error,
        };
        log::trace!("{}", diagnostic);
        self.reported.push(diagnostic);
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reported
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reported
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reported.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.reported.extend(other.reported);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_errors_count() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning(3, AsmError::UnnecessarySymbol("X".into()));
        assert!(!diagnostics.has_errors());

        diagnostics.error(4, AsmError::InvalidCommas);
        diagnostics.file_error(AsmError::MemoryOverflow(1000));
        assert_eq!(diagnostics.error_count(), 2);
        assert_eq!(diagnostics.warnings().count(), 1);

        let rendered = diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(
            rendered,
            vec![
                "WARNING: Ignored symbol `X` at line: 3",
                "ERROR: Invalid number of commas at line: 4",
                "ERROR: Memory overflow: 1000 words do not fit in memory",
            ]
        );
    }
}
