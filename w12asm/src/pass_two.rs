use libw12::{op::Opcode, Image, Word};
use w12dbg::{Sdb, Segment};

use crate::{
    constants::{MEMORY_OFFSET, MEMORY_SIZE},
    encoder::{encode_instruction, encode_integer, encode_string},
    error::{AsmError, Diagnostics},
    operand::{classify_destination, classify_source, Operand},
    pass_one::{LineBody, ParsedLine, PassOne},
    record::{Export, ExternalUse},
    symbols::{SymbolError, SymbolKind, SymbolTable},
};

pub struct Assembled {
    pub image: Image,
    pub entries: Vec<Export>,
    pub externals: Vec<ExternalUse>,
    pub debug: Sdb,
}

struct PassTwo<'a> {
    symbols: SymbolTable,
    diagnostics: &'a mut Diagnostics,
    image: Image,
    externals: Vec<ExternalUse>,
    debug: Sdb,
    address: usize,
    data_address: usize,
}

impl<'a> PassTwo<'a> {
    fn new(ic: usize, symbols: SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            symbols,
            diagnostics,
            image: Image::new(),
            externals: Vec::new(),
            debug: Sdb::new("", MEMORY_OFFSET),
            address: MEMORY_OFFSET,
            data_address: MEMORY_OFFSET + ic,
        }
    }

    fn assemble_lines(mut self, lines: &[ParsedLine]) -> Assembled {
        for line in lines {
            self.assemble_line(line);
        }

        for symbol in self.symbols.symbols() {
            if symbol.kind != SymbolKind::External {
                self.debug.add_label(symbol.name.clone(), symbol.address as u32);
            }
        }

        let entries = self
            .symbols
            .entries()
            .map(|s| Export {
                name: s.name.clone(),
                address: s.address,
            })
            .collect();

        Assembled {
            image: self.image,
            entries,
            externals: self.externals,
            debug: self.debug,
        }
    }

    fn assemble_line(&mut self, line: &ParsedLine) {
        match &line.body {
            LineBody::Data(values) => {
                let words = values
                    .iter()
                    .map(|v| encode_integer(*v, line.line_no, self.diagnostics))
                    .collect::<Vec<_>>();
                self.add_data(line, &words);
            }
            LineBody::String(text) => {
                let words = encode_string(text);
                self.add_data(line, &words);
            }
            LineBody::Extern(_) => {}
            LineBody::Entry(names) => {
                for name in names {
                    self.promote(line.line_no, name);
                }
            }
            LineBody::Instruction { opcode, operands } => {
                self.instruction(line, *opcode, operands);
                self.address += line.size;
            }
            LineBody::Invalid => self.address += line.size,
        }
    }

    fn add_data(&mut self, line: &ParsedLine, words: &[Word]) {
        for word in words {
            self.image.push_data(*word);
        }
        self.debug.add_line(
            self.data_address as u32,
            words.len(),
            Segment::Data,
            line.text.clone(),
            line.line_no,
        );
        self.data_address += words.len();
    }

    fn promote(&mut self, line_no: usize, name: &str) {
        let error = match self.symbols.promote_to_entry(name) {
            Ok(()) => return,
            Err(SymbolError::External(name)) => AsmError::EntryIsExternal(name),
            Err(SymbolError::NotFound(name)) => AsmError::EntryNotFound(name),
            Err(e) => AsmError::Symbol(e),
        };
        self.diagnostics.error(line_no, error);
    }

    fn classify(
        &mut self,
        line_no: usize,
        opcode: Opcode,
        operands: &[String],
    ) -> Option<(Option<Operand>, Option<Operand>)> {
        let (source, destination) = match operands {
            [] => return Some((None, None)),
            [destination] => (None, destination),
            [source, destination] => (Some(source), destination),
            _ => return None,
        };

        let src = source.map(|token| (token, classify_source(token, opcode, &self.symbols)));
        let dst = classify_destination(destination, opcode, &self.symbols);

        let mut valid = true;
        if let Some((token, None)) = &src {
            self.diagnostics
                .error(line_no, AsmError::InvalidSourceOperand((*token).clone()));
            valid = false;
        }
        if dst.is_none() {
            self.diagnostics
                .error(line_no, AsmError::InvalidDestinationOperand(destination.clone()));
            valid = false;
        }

        if valid {
            Some((src.and_then(|(_, operand)| operand), dst))
        } else {
            None
        }
    }

    fn instruction(&mut self, line: &ParsedLine, opcode: Opcode, operands: &[String]) {
        let (source, destination) = match self.classify(line.line_no, opcode, operands) {
            Some(classified) => classified,
            None => return,
        };

        let words = match encode_instruction(
            opcode,
            source.as_ref(),
            destination.as_ref(),
            self.address,
            &self.symbols,
            &mut self.externals,
        ) {
            Ok(words) => words,
            Err(e) => {
                self.diagnostics.error(line.line_no, e.into());
                return;
            }
        };

        log::trace!(
            "{:>4}: {}",
            self.address,
            words
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        );

        self.image.push_instruction(&words);
        self.debug.add_line(
            self.address as u32,
            words.len(),
            Segment::Code,
            line.text.clone(),
            line.line_no,
        );
    }
}

/// Encodes every line with final addresses. Nothing is encoded when the program
/// cannot fit in memory.
pub fn pass_two(pass_one: PassOne, diagnostics: &mut Diagnostics) -> Option<Assembled> {
    let total = pass_one.ic + pass_one.dc;
    if total > MEMORY_SIZE {
        diagnostics.file_error(AsmError::MemoryOverflow(total));
        return None;
    }

    let PassOne {
        parsed_lines,
        symbols,
        ic,
        ..
    } = pass_one;

    let assembled = PassTwo::new(ic, symbols, diagnostics).assemble_lines(&parsed_lines);
    log::debug!(
        "second pass: {} words, {} entries, {} external references",
        assembled.image.len(),
        assembled.entries.len(),
        assembled.externals.len()
    );
    Some(assembled)
}
