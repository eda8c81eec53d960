use libw12::op::Opcode;

use crate::{
    constants::integer,
    directive::Directive,
    encoder::word_count,
    error::{AsmError, Diagnostics},
    line::{check_commas, string_literal, LineTokens},
    symbols::{SymbolError, SymbolKind, SymbolTable},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineBody {
    Data(Vec<i32>),
    String(String),
    Extern(Vec<String>),
    Entry(Vec<String>),
    Instruction {
        opcode: Opcode,
        operands: Vec<String>,
    },
    /// An instruction with bad structure. Its words are counted but never encoded.
    Invalid,
}

#[derive(Debug, Clone)]
pub struct ParsedLine {
    pub line_no: usize,
    pub text: String,
    pub label: Option<String>,
    pub body: LineBody,
    pub size: usize,
}

pub struct PassOne {
    pub parsed_lines: Vec<ParsedLine>,
    pub symbols: SymbolTable,
    pub ic: usize,
    pub dc: usize,
}

pub struct FirstPass<'a> {
    ic: usize,
    dc: usize,
    symbols: SymbolTable,
    diagnostics: &'a mut Diagnostics,
}

fn label_error(error: SymbolError) -> AsmError {
    match error {
        SymbolError::InvalidName(name) => AsmError::InvalidLabel(name),
        SymbolError::Exists(name) => AsmError::SymbolExists(name),
        other => AsmError::Symbol(other),
    }
}

impl<'a> FirstPass<'a> {
    fn new(diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            ic: 0,
            dc: 0,
            symbols: SymbolTable::new(),
            diagnostics,
        }
    }

    /// Builds the symbol table and sizes every line. Line numbers start at one.
    pub fn parse_lines(lines: &[&str], diagnostics: &'a mut Diagnostics) -> PassOne {
        let mut pass = Self::new(diagnostics);
        let parsed_lines = lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| pass.parse_line(index + 1, line))
            .collect::<Vec<_>>();

        pass.symbols.rebase(pass.ic);
        log::debug!(
            "first pass: {} instruction words, {} data words, {} symbols",
            pass.ic,
            pass.dc,
            pass.symbols.len()
        );
        for symbol in pass.symbols.symbols() {
            log::debug!("  {:<31} {:?} {}", symbol.name, symbol.kind, symbol.address);
        }

        PassOne {
            parsed_lines,
            symbols: pass.symbols,
            ic: pass.ic,
            dc: pass.dc,
        }
    }

    fn declare_label(&mut self, line_no: usize, label: &str, directive: Directive) -> Option<String> {
        if directive.is_linkage() {
            self.diagnostics
                .warning(line_no, AsmError::UnnecessarySymbol(label.to_owned()));
            return None;
        }

        let (kind, address) = if directive.is_data() {
            (SymbolKind::Data, self.dc)
        } else {
            (SymbolKind::Code, self.ic)
        };

        match self.symbols.declare(label, kind, address) {
            Ok(()) => Some(label.to_owned()),
            Err(e) => {
                self.diagnostics.error(line_no, label_error(e));
                None
            }
        }
    }

    fn parse_line(&mut self, line_no: usize, text: &str) -> Option<ParsedLine> {
        let tokens = LineTokens::parse(text);

        let keyword = match (&tokens.keyword, &tokens.label) {
            (Some(keyword), _) => keyword,
            (None, Some(_)) => {
                self.diagnostics.error(line_no, AsmError::EmptyLabel);
                return None;
            }
            (None, None) => {
                self.diagnostics
                    .error(line_no, AsmError::InvalidCommand(text.trim().to_owned()));
                return None;
            }
        };

        let directive = match Directive::from_str(keyword) {
            Some(directive) => directive,
            None => {
                self.diagnostics
                    .error(line_no, AsmError::InvalidCommand(keyword.clone()));
                return None;
            }
        };

        let label = tokens
            .label
            .as_deref()
            .and_then(|label| self.declare_label(line_no, label, directive));

        let (body, size) = match directive {
            Directive::Data => self.data(line_no, &tokens)?,
            Directive::String => self.string(line_no, &tokens)?,
            Directive::Extern => self.external(line_no, &tokens),
            Directive::Entry => (LineBody::Entry(tokens.operands()), 0),
            Directive::Instruction(opcode) => self.instruction(line_no, opcode, &tokens),
        };

        log::trace!("{:>4} {:>2} words: {}", line_no, size, text);

        Some(ParsedLine {
            line_no,
            text: text.to_owned(),
            label,
            body,
            size,
        })
    }

    fn data(&mut self, line_no: usize, tokens: &LineTokens) -> Option<(LineBody, usize)> {
        let operands = tokens.operands();
        let values = operands
            .iter()
            .filter_map(|o| integer(o))
            .collect::<Vec<_>>();

        if operands.is_empty() || values.len() != operands.len() {
            self.diagnostics.error(line_no, AsmError::InvalidData);
        }
        if values.is_empty() {
            return None;
        }

        self.dc += values.len();
        let size = values.len();
        Some((LineBody::Data(values), size))
    }

    fn string(&mut self, line_no: usize, tokens: &LineTokens) -> Option<(LineBody, usize)> {
        match string_literal(&tokens.rest) {
            Ok(text) => {
                let size = text.chars().count() + 1;
                self.dc += size;
                Some((LineBody::String(text), size))
            }
            Err(e) => {
                self.diagnostics.error(line_no, e);
                None
            }
        }
    }

    fn external(&mut self, line_no: usize, tokens: &LineTokens) -> (LineBody, usize) {
        let names = tokens.operands();
        for name in &names {
            if let Err(e) = self.symbols.declare(name, SymbolKind::External, 0) {
                self.diagnostics.error(line_no, label_error(e));
            }
        }
        (LineBody::Extern(names), 0)
    }

    fn instruction(
        &mut self,
        line_no: usize,
        opcode: Opcode,
        tokens: &LineTokens,
    ) -> (LineBody, usize) {
        let operands = tokens.operands();
        let size = word_count(&operands);
        self.ic += size;

        if operands.len() != opcode.operand_count() {
            self.diagnostics
                .error(line_no, AsmError::InvalidOperandCount(opcode.to_string()));
            return (LineBody::Invalid, size);
        }

        if !check_commas(&tokens.rest, opcode.operand_count()) {
            self.diagnostics.error(line_no, AsmError::InvalidCommas);
            return (LineBody::Invalid, size);
        }

        (LineBody::Instruction { opcode, operands }, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> (PassOne, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let lines = source.lines().collect::<Vec<_>>();
        let pass_one = FirstPass::parse_lines(&lines, &mut diagnostics);
        (pass_one, diagnostics)
    }

    fn errors(diagnostics: &Diagnostics) -> Vec<(usize, AsmError)> {
        diagnostics
            .errors()
            .map(|d| (d.line.unwrap_or_default(), d.error.clone()))
            .collect()
    }

    #[test]
    fn counts_and_rebases() {
        let (pass_one, diagnostics) = run(
            "MAIN: mov @r3, LENGTH\nLOOP: jmp L1\nprn -5\nL1: inc K\nstop\nSTR: .string \"abcdef\"\nLENGTH: .data 6,-9,15\nK: .data 22",
        );
        assert!(!diagnostics.has_errors());
        assert_eq!(pass_one.ic, 10);
        assert_eq!(pass_one.dc, 11);
        assert_eq!(pass_one.symbols.lookup("MAIN"), Ok(100));
        assert_eq!(pass_one.symbols.lookup("LOOP"), Ok(103));
        assert_eq!(pass_one.symbols.lookup("L1"), Ok(107));
        assert_eq!(pass_one.symbols.lookup("STR"), Ok(110));
        assert_eq!(pass_one.symbols.lookup("LENGTH"), Ok(117));
        assert_eq!(pass_one.symbols.lookup("K"), Ok(120));
        assert_eq!(
            pass_one.parsed_lines.iter().map(|l| l.size).collect::<Vec<_>>(),
            vec![3, 2, 2, 2, 1, 7, 3, 1]
        );
    }

    #[test]
    fn register_pair_label() {
        let (pass_one, diagnostics) = run("LOOP: mov @r1, @r2");
        assert!(!diagnostics.has_errors());
        assert_eq!(pass_one.ic, 2);
        assert_eq!(pass_one.symbols.get("LOOP").map(|s| s.kind), Some(SymbolKind::Code));
        assert_eq!(pass_one.symbols.lookup("LOOP"), Ok(100));
    }

    #[test]
    fn bad_labels_report_once() {
        let (pass_one, diagnostics) = run("1X: stop\nA: rts\nA: rts\nmov: rts\nEND:");
        assert_eq!(
            errors(&diagnostics),
            vec![
                (1, AsmError::InvalidLabel("1X".into())),
                (3, AsmError::SymbolExists("A".into())),
                (4, AsmError::InvalidLabel("mov".into())),
                (5, AsmError::EmptyLabel),
            ]
        );
        assert_eq!(pass_one.ic, 4);
        assert_eq!(pass_one.symbols.len(), 1);
    }

    #[test]
    fn linkage_labels_are_ignored() {
        let (pass_one, diagnostics) = run("X: .extern W, Y\nE: .entry Q");
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.warnings().count(), 2);
        assert!(pass_one.symbols.is_external("W"));
        assert!(pass_one.symbols.is_external("Y"));
        assert!(!pass_one.symbols.contains("X"));
        assert_eq!(
            pass_one.parsed_lines[1].body,
            LineBody::Entry(vec!["Q".into()])
        );
    }

    #[test]
    fn data_and_strings() {
        let (pass_one, diagnostics) = run(
            ".data\n.data 1, x, 3\n.string\n.string \"ab\n.string \"AB\"\n.data 2047, -2048",
        );
        assert_eq!(
            errors(&diagnostics),
            vec![
                (1, AsmError::InvalidData),
                (2, AsmError::InvalidData),
                (3, AsmError::InvalidString),
                (4, AsmError::InvalidQuotes),
            ]
        );
        assert_eq!(pass_one.dc, 2 + 3 + 2);
        assert_eq!(pass_one.parsed_lines[0].body, LineBody::Data(vec![1, 3]));
        assert_eq!(pass_one.parsed_lines[1].body, LineBody::String("AB".into()));
    }

    #[test]
    fn instruction_structure() {
        let (pass_one, diagnostics) = run(
            "mov @r1\nmov @r1 @r2\ninc K,\nstop now\nfoo @r1\n.text 5\nL: add @r1,, @r2\n,",
        );
        assert_eq!(
            errors(&diagnostics),
            vec![
                (1, AsmError::InvalidOperandCount("mov".into())),
                (2, AsmError::InvalidCommas),
                (3, AsmError::InvalidCommas),
                (4, AsmError::InvalidOperandCount("stop".into())),
                (5, AsmError::InvalidCommand("foo".into())),
                (6, AsmError::InvalidCommand(".text".into())),
                (7, AsmError::InvalidCommas),
                (8, AsmError::InvalidCommand(",".into())),
            ]
        );
        assert!(pass_one
            .parsed_lines
            .iter()
            .all(|l| l.body == LineBody::Invalid));
        assert_eq!(pass_one.ic, 2 + 2 + 2 + 2 + 2);
        assert_eq!(pass_one.symbols.lookup("L"), Ok(108));
    }
}
