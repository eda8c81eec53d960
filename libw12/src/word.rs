use std::fmt::Display;

pub const WORD_BITS: u32 = 12;
pub const WORD_MASK: u16 = 0x0F_FF;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A single machine word. Only the low 12 bits are ever set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Word(u16);

impl Word {
    pub fn new(bits: u16) -> Self {
        Self(bits & WORD_MASK)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }

    pub fn as_i32(&self) -> i32 {
        let val = self.0 as i32;
        if val & 0x8_00 > 0 {
            // Sign extend from bit 11
            val | !(WORD_MASK as i32)
        } else {
            val
        }
    }

    /// Two characters: high six bits first, then the low six.
    pub fn to_base64(&self) -> String {
        let high = BASE64[((self.0 >> 6) & 0x3F) as usize] as char;
        let low = BASE64[(self.0 & 0x3F) as usize] as char;
        [high, low].iter().collect()
    }

    pub fn from_base64(pair: &str) -> Option<Self> {
        let mut chars = pair.chars();
        let high = base64_value(chars.next()?)?;
        let low = base64_value(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self::new((high << 6) | low))
    }
}

fn base64_value(c: char) -> Option<u16> {
    BASE64
        .iter()
        .position(|b| *b as char == c)
        .map(|p| p as u16)
}

impl Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0>12b}", self.0)
    }
}

pub fn i32_to_word(i: i32) -> Word {
    // Two's complement, keep the low 12 bits
    Word::new((i as u32 & WORD_MASK as u32) as u16)
}

pub fn u16_to_word(i: u16) -> Word {
    Word::new(i)
}

pub fn char_to_word(c: char) -> Word {
    Word::new((c as u32 & WORD_MASK as u32) as u16)
}
