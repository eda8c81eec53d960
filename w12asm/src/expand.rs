use crate::{
    constants::{is_keyword, COMMENT, MACRO_CLOSE, MACRO_OPEN},
    error::{AsmError, Diagnostics},
    macros::MacroTable,
};

pub struct Expanded {
    pub text: String,
    pub diagnostics: Diagnostics,
}

fn valid_macro_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic()) && !is_keyword(name)
}

struct Expander {
    macros: MacroTable,
    diagnostics: Diagnostics,
    output: String,
}

impl Expander {
    fn new() -> Self {
        Self {
            macros: MacroTable::new(),
            diagnostics: Diagnostics::new(),
            output: String::new(),
        }
    }

    fn emit(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn in_macro(&mut self, tokens: &[&str], line_no: usize) {
        if tokens[0] == MACRO_CLOSE {
            if tokens.len() != 1 {
                self.diagnostics.error(line_no, AsmError::InvalidEndMacro);
            }
            self.macros.close();
            return;
        }

        self.macros.append(tokens.join(" "));
    }

    fn outside_macro(&mut self, tokens: &[&str], line_no: usize) {
        if tokens[0] == MACRO_OPEN {
            let name = tokens.get(1).copied().unwrap_or_default();
            if tokens.len() != 2 || !valid_macro_name(name) {
                self.diagnostics.error(line_no, AsmError::InvalidMacro);
            }
            if !self.macros.open(name) {
                self.diagnostics
                    .warning(line_no, AsmError::MacroRedefined(name.to_owned()));
            }
            return;
        }

        if let Some(body) = self.macros.get(tokens[0]) {
            let body = body.join("\n");
            if !body.is_empty() {
                self.emit(&body);
            }
            return;
        }

        self.emit(&tokens.join(" "));
    }

    fn expand_line(&mut self, line: &str, line_no: usize) {
        let tokens = line.split_whitespace().collect::<Vec<_>>();

        if tokens.is_empty() || tokens[0].starts_with(COMMENT) {
            return;
        }

        if self.macros.is_open() {
            self.in_macro(&tokens, line_no);
        } else {
            self.outside_macro(&tokens, line_no);
        }
    }
}

/// Replaces macro invocations with their bodies and drops comments and blank lines.
pub fn expand_macros(source: &str) -> Expanded {
    let mut expander = Expander::new();

    for (index, line) in source.lines().enumerate() {
        expander.expand_line(line, index + 1);
    }

    if let Some(name) = expander.macros.open_name().map(str::to_owned) {
        let last_line = source.lines().count();
        expander
            .diagnostics
            .warning(last_line, AsmError::UnterminatedMacro(name));
    }

    log::debug!(
        "macro expansion: {} macros, {} errors",
        expander.macros.len(),
        expander.diagnostics.error_count()
    );

    Expanded {
        text: expander.output,
        diagnostics: expander.diagnostics,
    }
}
