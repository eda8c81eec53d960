use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use strum_macros::EnumString;

use crate::word::{u16_to_word, Word};

#[derive(FromPrimitive, EnumString, strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Opcode {
    Mov = 0,
    Cmp = 1,
    Add = 2,
    Sub = 3,
    Not = 4,
    Clr = 5,
    Lea = 6,
    Inc = 7,
    Dec = 8,
    Jmp = 9,
    Bne = 10,
    Red = 11,
    Prn = 12,
    Jsr = 13,
    Rts = 14,
    Stop = 15,
}

impl Opcode {
    pub fn operand_count(&self) -> usize {
        match self {
            Opcode::Mov | Opcode::Cmp | Opcode::Add | Opcode::Sub | Opcode::Lea => 2,
            Opcode::Not
            | Opcode::Clr
            | Opcode::Inc
            | Opcode::Dec
            | Opcode::Jmp
            | Opcode::Bne
            | Opcode::Red
            | Opcode::Prn
            | Opcode::Jsr => 1,
            Opcode::Rts | Opcode::Stop => 0,
        }
    }

    /// Only these two may take an immediate value as their destination.
    pub fn allows_absolute_destination(&self) -> bool {
        matches!(self, Opcode::Cmp | Opcode::Prn)
    }

    pub fn source_label_only(&self) -> bool {
        matches!(self, Opcode::Lea)
    }
}

#[derive(FromPrimitive, EnumString, strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    #[strum(serialize = "@r0")]
    R0 = 0,
    #[strum(serialize = "@r1")]
    R1 = 1,
    #[strum(serialize = "@r2")]
    R2 = 2,
    #[strum(serialize = "@r3")]
    R3 = 3,
    #[strum(serialize = "@r4")]
    R4 = 4,
    #[strum(serialize = "@r5")]
    R5 = 5,
    #[strum(serialize = "@r6")]
    R6 = 6,
    #[strum(serialize = "@r7")]
    R7 = 7,
}

#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    Absolute = 0b001,
    Direct = 0b011,
    Register = 0b101,
}

/// The two low bits of every operand word.
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Are {
    Absolute = 0b00,
    External = 0b01,
    Relocatable = 0b10,
}

fn mode_bits(mode: Option<AddressMode>) -> u16 {
    mode.map(|m| m as u16).unwrap_or(0)
}

fn mode_from_bits(bits: u16) -> Option<Option<AddressMode>> {
    if bits == 0 {
        Some(None)
    } else {
        AddressMode::from_u16(bits).map(Some)
    }
}

/// First word of every instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub source: Option<AddressMode>,
    pub opcode: Opcode,
    pub destination: Option<AddressMode>,
}

impl Header {
    pub fn from_word(word: Word) -> Option<Self> {
        let bits = word.bits();
        if bits & 0b11 != 0 {
            return None;
        }
        Some(Self {
            source: mode_from_bits(bits >> 9)?,
            opcode: Opcode::from_u16((bits >> 5) & 0x0F)?,
            destination: mode_from_bits((bits >> 2) & 0b111)?,
        })
    }
}

impl From<Header> for Word {
    fn from(header: Header) -> Word {
        u16_to_word(
            mode_bits(header.source) << 9
                | (header.opcode as u16) << 5
                | mode_bits(header.destination) << 2
                | Are::Absolute as u16,
        )
    }
}

/// Both register numbers packed into one operand word. A missing register is all zero.
pub fn register_word(source: Option<Register>, destination: Option<Register>) -> Word {
    let src = source.map(|r| r as u16).unwrap_or(0);
    let dst = destination.map(|r| r as u16).unwrap_or(0);
    u16_to_word(src << 7 | dst << 2 | Are::Absolute as u16)
}

/// A ten bit value (two's complement) followed by the tag.
pub fn value_word(value: i32, are: Are) -> Word {
    let value = (value as u32 & 0x3_FF) as u16;
    u16_to_word(value << 2 | are as u16)
}

pub fn are_of(word: Word) -> Are {
    // Two bits always map onto one of the three tags or the unused 0b11
    Are::from_u16(word.bits() & 0b11).unwrap_or(Are::Absolute)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn mnemonics() {
        assert_eq!(Opcode::from_str("mov").unwrap(), Opcode::Mov);
        assert_eq!(Opcode::from_str("stop").unwrap(), Opcode::Stop);
        assert!(Opcode::from_str("MOV").is_err());
        assert_eq!(Opcode::Lea.to_string(), "lea");
        assert_eq!(Register::from_str("@r7").unwrap(), Register::R7);
        assert!(Register::from_str("r7").is_err());
        assert!(Register::from_str("@r8").is_err());
        assert_eq!(Register::R3.to_string(), "@r3");
    }

    #[test]
    fn groups() {
        let counts = (0..16)
            .map(|i| Opcode::from_u8(i).unwrap().operand_count())
            .fold([0; 3], |mut acc, c| {
                acc[c] += 1;
                acc
            });
        assert_eq!(counts, [2, 9, 5]);
        assert!(Opcode::Cmp.allows_absolute_destination());
        assert!(Opcode::Prn.allows_absolute_destination());
        assert!(!Opcode::Mov.allows_absolute_destination());
    }

    #[test]
    fn header() {
        let header = Header {
            source: Some(AddressMode::Register),
            opcode: Opcode::Mov,
            destination: Some(AddressMode::Register),
        };
        let word: Word = header.into();
        assert_eq!(word.to_string(), "101000010100");
        assert_eq!(Header::from_word(word), Some(header));

        let header = Header {
            source: None,
            opcode: Opcode::Stop,
            destination: None,
        };
        let word: Word = header.into();
        assert_eq!(word.to_string(), "000111100000");
        assert_eq!(Header::from_word(word), Some(header));

        assert_eq!(Header::from_word(Word::new(0b000_0000_000_10)), None);
        assert_eq!(Header::from_word(Word::new(0b010_0000_000_00)), None);
    }

    #[test]
    fn operand_words() {
        assert_eq!(
            register_word(Some(Register::R1), Some(Register::R2)).to_string(),
            "000010001000"
        );
        assert_eq!(
            register_word(Some(Register::R7), None).to_string(),
            "001110000000"
        );
        assert_eq!(
            register_word(None, Some(Register::R7)).to_string(),
            "000000011100"
        );
        assert_eq!(value_word(0, Are::External).to_string(), "000000000001");
        assert_eq!(value_word(105, Are::Relocatable).to_string(), "000110100110");
        assert_eq!(value_word(-1, Are::Absolute).to_string(), "111111111100");
        assert_eq!(value_word(511, Are::Absolute).to_string(), "011111111100");
        assert_eq!(are_of(value_word(3, Are::Relocatable)), Are::Relocatable);
    }
}
