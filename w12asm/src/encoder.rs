use libw12::{
    op::{register_word, value_word, Are, Header, Opcode, Register},
    word::{char_to_word, i32_to_word},
    Word,
};

use crate::{
    constants::{register, MAX_DATA_OPERAND, MIN_DATA_OPERAND},
    error::{AsmError, Diagnostics},
    operand::Operand,
    record::ExternalUse,
    symbols::{SymbolError, SymbolTable},
};

/// Words taken by an instruction with these operand tokens. Two registers share one word.
pub fn word_count(operands: &[String]) -> usize {
    match operands.len() {
        0 => 1,
        1 => 2,
        2 if operands.iter().all(|o| register(o).is_some()) => 2,
        2 => 3,
        _ => 1,
    }
}

pub fn encode_header(
    opcode: Opcode,
    source: Option<&Operand>,
    destination: Option<&Operand>,
) -> Word {
    Header {
        source: source.map(Operand::mode),
        opcode,
        destination: destination.map(Operand::mode),
    }
    .into()
}

pub fn encode_registers(source: Option<Register>, destination: Option<Register>) -> Word {
    register_word(source, destination)
}

/// One operand word stored at `address`. A register here is a lone destination register.
pub fn encode_operand(
    operand: &Operand,
    address: usize,
    symbols: &SymbolTable,
    externals: &mut Vec<ExternalUse>,
) -> Result<Word, SymbolError> {
    Ok(match operand {
        Operand::Direct(name) if symbols.is_external(name) => {
            externals.push(ExternalUse {
                name: name.clone(),
                address,
            });
            value_word(0, Are::External)
        }
        Operand::Direct(name) => value_word(symbols.lookup(name)? as i32, Are::Relocatable),
        Operand::Absolute(value) => value_word(*value, Are::Absolute),
        Operand::Register(reg) => encode_registers(None, Some(*reg)),
    })
}

/// All words of one instruction placed at `address`.
pub fn encode_instruction(
    opcode: Opcode,
    source: Option<&Operand>,
    destination: Option<&Operand>,
    address: usize,
    symbols: &SymbolTable,
    externals: &mut Vec<ExternalUse>,
) -> Result<Vec<Word>, SymbolError> {
    let mut words = vec![encode_header(opcode, source, destination)];

    if let (Some(Operand::Register(src)), Some(Operand::Register(dst))) = (source, destination) {
        words.push(encode_registers(Some(*src), Some(*dst)));
        return Ok(words);
    }

    if let Some(source) = source {
        let word = match source {
            Operand::Register(reg) => encode_registers(Some(*reg), None),
            _ => encode_operand(source, address + words.len(), symbols, externals)?,
        };
        words.push(word);
    }

    if let Some(destination) = destination {
        let word = encode_operand(destination, address + words.len(), symbols, externals)?;
        words.push(word);
    }

    Ok(words)
}

/// Reports values outside 12 bits but still returns the truncated word.
pub fn encode_integer(value: i32, line_no: usize, diagnostics: &mut Diagnostics) -> Word {
    if !(MIN_DATA_OPERAND..=MAX_DATA_OPERAND).contains(&value) {
        diagnostics.error(line_no, AsmError::DataOverflow(value));
    }
    i32_to_word(value)
}

pub fn encode_character(c: char) -> Word {
    char_to_word(c)
}

/// Every character followed by a zero word.
pub fn encode_string(text: &str) -> Vec<Word> {
    text.chars()
        .map(encode_character)
        .chain(std::iter::once(Word::default()))
        .collect()
}
