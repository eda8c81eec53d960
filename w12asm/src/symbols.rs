use indexmap::IndexMap;
use thiserror::Error;
use w12dbg::Segment;

use crate::constants::{is_keyword, MAX_LABEL_LENGTH, MEMORY_OFFSET};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Invalid label name `{0}`")]
    InvalidName(String),
    #[error("Symbol `{0}` already exists")]
    Exists(String),
    #[error("Symbol `{0}` is not defined")]
    NotFound(String),
    #[error("Symbol `{0}` is external")]
    External(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Code,
    Data,
    External,
    Entry(Segment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub address: usize,
}

impl Symbol {
    fn segment(&self) -> Option<Segment> {
        match self.kind {
            SymbolKind::Code | SymbolKind::Entry(Segment::Code) => Some(Segment::Code),
            SymbolKind::Data | SymbolKind::Entry(Segment::Data) => Some(Segment::Data),
            SymbolKind::External => None,
        }
    }
}

/// Every declared name, whatever its kind. Names are unique across kinds.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
    rebased: bool,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a letter, fits the length limit and is not a reserved word.
    pub fn validate(name: &str) -> Result<(), SymbolError> {
        if name.len() > MAX_LABEL_LENGTH
            || !name.starts_with(|c: char| c.is_ascii_alphabetic())
            || is_keyword(name)
        {
            return Err(SymbolError::InvalidName(name.to_owned()));
        }
        Ok(())
    }

    pub fn declare(&mut self, name: &str, kind: SymbolKind, address: usize) -> Result<(), SymbolError> {
        Self::validate(name)?;
        if self.symbols.contains_key(name) {
            return Err(SymbolError::Exists(name.to_owned()));
        }

        log::trace!("declare {} {:?} {}", name, kind, address);
        self.symbols.insert(
            name.to_owned(),
            Symbol {
                name: name.to_owned(),
                kind,
                address,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn lookup(&self, name: &str) -> Result<usize, SymbolError> {
        self.symbols
            .get(name)
            .map(|s| s.address)
            .ok_or_else(|| SymbolError::NotFound(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn is_external(&self, name: &str) -> bool {
        matches!(
            self.symbols.get(name).map(|s| s.kind),
            Some(SymbolKind::External)
        )
    }

    /// Marks a code or data symbol as exported. Promoting twice is harmless.
    pub fn promote_to_entry(&mut self, name: &str) -> Result<(), SymbolError> {
        let symbol = self
            .symbols
            .get_mut(name)
            .ok_or_else(|| SymbolError::NotFound(name.to_owned()))?;

        match symbol.segment() {
            Some(segment) => {
                symbol.kind = SymbolKind::Entry(segment);
                Ok(())
            }
            None => Err(SymbolError::External(name.to_owned())),
        }
    }

    /// Moves code after the memory offset and data after the code. Only the first call counts.
    pub fn rebase(&mut self, instruction_words: usize) {
        if self.rebased {
            return;
        }
        self.rebased = true;

        for symbol in self.symbols.values_mut() {
            match symbol.segment() {
                Some(Segment::Code) => symbol.address += MEMORY_OFFSET,
                Some(Segment::Data) => symbol.address += MEMORY_OFFSET + instruction_words,
                None => {}
            }
        }
    }

    pub fn is_rebased(&self) -> bool {
        self.rebased
    }

    /// Exported symbols, code segment first, then data, each in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &Symbol> {
        let symbols = &self.symbols;
        let in_segment = move |segment: Segment| {
            symbols
                .values()
                .filter(move |s| s.kind == SymbolKind::Entry(segment))
        };
        in_segment(Segment::Code).chain(in_segment(Segment::Data))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert!(SymbolTable::validate("LOOP").is_ok());
        assert!(SymbolTable::validate("a1b2").is_ok());
        assert!(SymbolTable::validate(&"A".repeat(31)).is_ok());
        assert!(SymbolTable::validate(&"A".repeat(32)).is_err());
        assert!(SymbolTable::validate("1abc").is_err());
        assert!(SymbolTable::validate("").is_err());
        assert!(SymbolTable::validate("mov").is_err());
        assert!(SymbolTable::validate("@r1").is_err());
        assert!(SymbolTable::validate(".data").is_err());
        assert!(SymbolTable::validate("A_B").is_ok());
    }

    #[test]
    fn unique_across_kinds() {
        let mut table = SymbolTable::new();
        table.declare("X", SymbolKind::External, 0).unwrap();
        assert_eq!(
            table.declare("X", SymbolKind::Code, 3),
            Err(SymbolError::Exists("X".into()))
        );
        assert_eq!(
            table.declare("mov", SymbolKind::Code, 3),
            Err(SymbolError::InvalidName("mov".into()))
        );
        assert_eq!(table.len(), 1);
        assert!(table.is_external("X"));
        assert!(!table.is_external("Y"));
    }

    #[test]
    fn rebase_once() {
        let mut table = SymbolTable::new();
        table.declare("LOOP", SymbolKind::Code, 0).unwrap();
        table.declare("END", SymbolKind::Code, 4).unwrap();
        table.declare("STR", SymbolKind::Data, 0).unwrap();
        table.declare("LEN", SymbolKind::Data, 3).unwrap();
        table.declare("X", SymbolKind::External, 0).unwrap();

        table.rebase(6);
        table.rebase(6);

        assert!(table.is_rebased());
        assert_eq!(table.lookup("LOOP"), Ok(100));
        assert_eq!(table.lookup("END"), Ok(104));
        assert_eq!(table.lookup("STR"), Ok(106));
        assert_eq!(table.lookup("LEN"), Ok(109));
        assert_eq!(table.lookup("X"), Ok(0));
        assert_eq!(table.lookup("Y"), Err(SymbolError::NotFound("Y".into())));
    }

    #[test]
    fn entries() {
        let mut table = SymbolTable::new();
        table.declare("LEN", SymbolKind::Data, 0).unwrap();
        table.declare("MAIN", SymbolKind::Code, 0).unwrap();
        table.declare("LOOP", SymbolKind::Code, 2).unwrap();
        table.declare("X", SymbolKind::External, 0).unwrap();

        table.promote_to_entry("LEN").unwrap();
        table.promote_to_entry("LOOP").unwrap();
        table.promote_to_entry("LOOP").unwrap();
        assert_eq!(
            table.promote_to_entry("X"),
            Err(SymbolError::External("X".into()))
        );
        assert_eq!(
            table.promote_to_entry("Q"),
            Err(SymbolError::NotFound("Q".into()))
        );

        table.rebase(5);
        let entries = table
            .entries()
            .map(|s| (s.name.as_str(), s.address))
            .collect::<Vec<_>>();
        assert_eq!(entries, vec![("LOOP", 102), ("LEN", 105)]);
    }
}
