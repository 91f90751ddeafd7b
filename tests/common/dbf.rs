//! Builds dBase III files for tests.
use std::{fs, path::Path};

pub struct DbfBuilder {
    fields: Vec<(String, usize)>,
    rows: Vec<(bool, Vec<Vec<u8>>)>,
    declared_records: Option<u32>,
}

impl DbfBuilder {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            rows: Vec::new(),
            declared_records: None,
        }
    }

    /// Adds a character column.
    pub fn field(mut self, name: &str, length: usize) -> Self {
        self.fields.push((name.to_string(), length));
        self
    }

    pub fn row(self, values: &[&str]) -> Self {
        let values = values.iter().map(|v| v.as_bytes().to_vec()).collect();
        self.raw_row(false, values)
    }

    pub fn deleted_row(self, values: &[&str]) -> Self {
        let values = values.iter().map(|v| v.as_bytes().to_vec()).collect();
        self.raw_row(true, values)
    }

    pub fn raw_row(mut self, deleted: bool, values: Vec<Vec<u8>>) -> Self {
        self.rows.push((deleted, values));
        self
    }

    /// Overrides the record count written in the header.
    pub fn declared_records(mut self, count: u32) -> Self {
        self.declared_records = Some(count);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let header_length = 32 + 32 * self.fields.len() + 1;
        let record_length = 1 + self.fields.iter().map(|(_, len)| len).sum::<usize>();
        let record_count = self
            .declared_records
            .unwrap_or(self.rows.len() as u32);

        let mut bytes = vec![0x03, 124, 1, 1];
        bytes.extend_from_slice(&record_count.to_le_bytes());
        bytes.extend_from_slice(&(header_length as u16).to_le_bytes());
        bytes.extend_from_slice(&(record_length as u16).to_le_bytes());
        bytes.resize(32, 0);

        for (name, length) in &self.fields {
            let mut descriptor = [0u8; 32];
            descriptor[..name.len()].copy_from_slice(name.as_bytes());
            descriptor[11] = b'C';
            descriptor[16] = *length as u8;
            bytes.extend_from_slice(&descriptor);
        }
        bytes.push(0x0D);

        for (deleted, values) in &self.rows {
            bytes.push(if *deleted { b'*' } else { b' ' });
            for (index, (_, length)) in self.fields.iter().enumerate() {
                let mut cell = values.get(index).cloned().unwrap_or_default();
                cell.resize(*length, b' ');
                bytes.extend_from_slice(&cell);
            }
        }
        bytes.push(0x1A);
        bytes
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) {
        fs::write(path, self.build()).expect("Unable to write DBF file");
    }
}
