use libw12::op::Opcode;

use crate::constants::opcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Data,
    String,
    Extern,
    Entry,
    Instruction(Opcode),
}

impl Directive {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            ".data" => Some(Self::Data),
            ".string" => Some(Self::String),
            ".extern" => Some(Self::Extern),
            ".entry" => Some(Self::Entry),
            _ => opcode(s).map(Self::Instruction),
        }
    }

    /// Data and string lines live in the data segment.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data | Self::String)
    }

    /// A label in front of these is ignored.
    pub fn is_linkage(&self) -> bool {
        matches!(self, Self::Extern | Self::Entry)
    }
}
