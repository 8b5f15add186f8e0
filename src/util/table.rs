//! Scraping of docker's columnar listings (`docker images`, `docker ps`).

/// A listing split into its header line and data rows (raw text, whitespace preserved).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: String,
    pub rows: Vec<String>,
}

impl Table {
    pub fn parse(out: &str) -> Self {
        let mut lines = out
            .trim()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string);
        let header = lines.next().unwrap_or_default();
        Table {
            header,
            rows: lines.collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Whitespace-separated field `idx` of a row.
///
/// docker's headers contain spaces ("IMAGE ID", "CONTAINER ID") but its cells do not for the
/// leading columns, so positional splitting is reliable for repository, tag and ids.
pub fn field(row: &str, idx: usize) -> Option<&str> {
    row.split_whitespace().nth(idx)
}
