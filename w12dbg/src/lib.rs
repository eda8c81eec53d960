use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
pub use serde_json::Error;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Code,
    Data,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SdbLine {
    pub address: u32,
    pub words: usize,
    pub segment: Segment,
    pub text: String,
    pub line_number: usize,
}

/// Source level debug info for one assembled file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Sdb {
    pub name: String,
    pub start: usize,
    pub lines: Vec<SdbLine>,
    pub address_map: HashMap<u32, usize>,
    pub labels: BTreeMap<String, u32>,
}

impl Sdb {
    pub fn new(name: &str, start: usize) -> Self {
        Sdb {
            name: name.into(),
            start,
            lines: Vec::new(),
            address_map: HashMap::new(),
            labels: BTreeMap::new(),
        }
    }

    pub fn to_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn add_label(&mut self, label: String, address: u32) {
        self.labels.insert(label, address);
    }

    pub fn add_line(
        &mut self,
        address: u32,
        words: usize,
        segment: Segment,
        text: String,
        line_number: usize,
    ) {
        self.lines.push(SdbLine {
            address,
            words,
            segment,
            text,
            line_number,
        });
        self.address_map.insert(address, self.lines.len() - 1);
    }

    /// The line whose words cover `address`, if any.
    pub fn line_at(&self, address: u32) -> Option<&SdbLine> {
        if let Some(index) = self.address_map.get(&address) {
            return self.lines.get(*index);
        }
        self.lines
            .iter()
            .find(|l| l.address <= address && address < l.address + l.words as u32)
    }

    pub fn from_string(dbg: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(dbg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_round_trip() {
        let mut sdb = Sdb::new("prog", 100);
        sdb.add_line(100, 3, Segment::Code, "mov X, @r1".into(), 1);
        sdb.add_line(103, 1, Segment::Code, "stop".into(), 2);
        sdb.add_line(104, 3, Segment::Data, "STR: .string \"ab\"".into(), 3);
        sdb.add_label("STR".into(), 104);

        assert_eq!(sdb.line_at(100).map(|l| l.line_number), Some(1));
        assert_eq!(sdb.line_at(102).map(|l| l.line_number), Some(1));
        assert_eq!(sdb.line_at(106).map(|l| l.segment), Some(Segment::Data));
        assert!(sdb.line_at(107).is_none());

        let text = sdb.to_string().unwrap();
        assert_eq!(Sdb::from_string(&text).unwrap(), sdb);
    }
}
