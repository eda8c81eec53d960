use libw12::op::{AddressMode, Opcode, Register};

use crate::{
    constants::{integer, register, MAX_NUM_OPERAND, MIN_NUM_OPERAND},
    symbols::SymbolTable,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Direct(String),
    Absolute(i32),
}

impl Operand {
    pub fn mode(&self) -> AddressMode {
        match self {
            Operand::Register(_) => AddressMode::Register,
            Operand::Direct(_) => AddressMode::Direct,
            Operand::Absolute(_) => AddressMode::Absolute,
        }
    }
}

fn label(token: &str, symbols: &SymbolTable) -> Option<Operand> {
    symbols
        .contains(token)
        .then(|| Operand::Direct(token.to_owned()))
}

pub fn classify_source(token: &str, opcode: Opcode, symbols: &SymbolTable) -> Option<Operand> {
    if opcode.source_label_only() {
        return label(token, symbols);
    }

    if let Some(reg) = register(token) {
        return Some(Operand::Register(reg));
    }

    label(token, symbols).or_else(|| {
        integer(token)
            .filter(|n| (MIN_NUM_OPERAND..=MAX_NUM_OPERAND).contains(n))
            .map(Operand::Absolute)
    })
}

/// Immediate destinations are only accepted by `cmp` and `prn`, and are not range checked.
pub fn classify_destination(
    token: &str,
    opcode: Opcode,
    symbols: &SymbolTable,
) -> Option<Operand> {
    if let Some(reg) = register(token) {
        return Some(Operand::Register(reg));
    }

    label(token, symbols).or_else(|| {
        if opcode.allows_absolute_destination() {
            integer(token).map(Operand::Absolute)
        } else {
            None
        }
    })
}
