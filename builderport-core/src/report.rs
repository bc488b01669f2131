use std::io::{self, Write};

/// One audit finding: `zone\tissue\tdetail` in the emitted TSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub zone: String,
    pub issue: String,
    pub detail: String,
}

impl Issue {
    pub fn new(zone: impl Into<String>, issue: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            issue: issue.into(),
            detail: detail.into(),
        }
    }
}

/// Collected audit findings. A clean report carries only the header row
/// and maps to process exit code 0; anything else is exit code 1.
#[derive(Debug, Default)]
pub struct Report {
    rows: Vec<Issue>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.rows.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.rows.extend(issues);
    }

    pub fn rows(&self) -> &[Issue] {
        &self.rows
    }

    pub fn is_clean(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_clean() { 0 } else { 1 }
    }

    pub fn write_tsv(&self, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "zone\tissue\tdetail")?;
        for row in &self.rows {
            writeln!(w, "{}\t{}\t{}", row.zone, row.issue, row.detail)?;
        }
        Ok(())
    }
}
