//! Helpers for reading session archives back

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One entry of a finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
}

impl Entry {
    /// Step number parsed from `debug/<step>-<label>`.
    pub fn step(&self) -> u64 {
        let rest = self
            .name
            .strip_prefix("debug/")
            .unwrap_or_else(|| panic!("entry outside debug/: {}", self.name));
        let (step, _) = rest
            .split_once('-')
            .unwrap_or_else(|| panic!("entry without step: {}", self.name));
        step.parse()
            .unwrap_or_else(|_| panic!("bad step in {}", self.name))
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.data).expect("entry is not utf-8")
    }
}

/// Read every entry, in archive order.
pub fn read_entries(path: &Path) -> Vec<Entry> {
    let file = File::open(path).expect("Failed to open archive");
    let mut archive = zip::ZipArchive::new(file).expect("Archive has no valid index");
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).expect("Failed to read entry");
            let mut data = Vec::new();
            entry.read_to_end(&mut data).expect("Failed to read entry data");
            Entry {
                name: entry.name().to_string(),
                data,
            }
        })
        .collect()
}

/// Entries sorted by step number.
pub fn entries_by_step(path: &Path) -> Vec<Entry> {
    let mut entries = read_entries(path);
    entries.sort_by_key(Entry::step);
    entries
}
