use crate::error::{WldError, WldResult};
use crate::wld::model::Room;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Baseline `vnum -> sector` snapshot, captured before a batch of
/// edits and re-checked afterwards. TSV with a single header row:
/// `VNUM\tZONE\tSECTOR\tNAME`.
#[derive(Debug, Default, Clone)]
pub struct Manifest {
    entries: BTreeMap<u32, ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub zone: u32,
    pub sector: u32,
    pub name: String,
}

/// One divergence between the baseline and the current world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    Changed { vnum: u32, baseline: u32, current: u32 },
    Missing { vnum: u32, baseline: u32 },
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Drift::Changed { vnum, baseline, current } => {
                write!(f, "VNUM {vnum}: Sector changed from {baseline} to {current}")
            }
            Drift::Missing { vnum, baseline } => {
                write!(f, "VNUM {vnum}: Room missing (baseline sector {baseline})")
            }
        }
    }
}

impl Drift {
    pub fn vnum(&self) -> u32 {
        match self {
            Drift::Changed { vnum, .. } | Drift::Missing { vnum, .. } => *vnum,
        }
    }
}

impl Manifest {
    pub fn snapshot<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> Self {
        let entries = rooms
            .into_iter()
            .map(|r| {
                (
                    r.vnum,
                    ManifestEntry {
                        zone: r.zone(),
                        sector: r.sector,
                        name: r.name.clone(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sector_of(&self, vnum: u32) -> Option<u32> {
        self.entries.get(&vnum).map(|e| e.sector)
    }

    pub fn insert(&mut self, vnum: u32, entry: ManifestEntry) {
        self.entries.insert(vnum, entry);
    }

    pub fn to_tsv(&self) -> String {
        let mut out = String::from("VNUM\tZONE\tSECTOR\tNAME\n");
        for (vnum, e) in &self.entries {
            out.push_str(&format!("{vnum}\t{}\t{}\t{}\n", e.zone, e.sector, e.name));
        }
        out
    }

    pub fn parse_tsv(text: &str) -> WldResult<Self> {
        let mut entries = BTreeMap::new();
        for (idx, line) in text.lines().enumerate() {
            if idx == 0 || line.trim().is_empty() {
                continue; // header row
            }
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < 4 {
                return Err(WldError::Manifest {
                    line: idx + 1,
                    message: format!("expected 4 columns, found {}", cols.len()),
                });
            }
            let parse_col = |col: &str, what: &str| -> WldResult<u32> {
                col.parse().map_err(|_| WldError::Manifest {
                    line: idx + 1,
                    message: format!("bad {what} '{col}'"),
                })
            };
            let vnum = parse_col(cols[0], "vnum")?;
            entries.insert(
                vnum,
                ManifestEntry {
                    zone: parse_col(cols[1], "zone")?,
                    sector: parse_col(cols[2], "sector")?,
                    name: cols[3].to_string(),
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn load(path: impl AsRef<Path>) -> WldResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_tsv(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> WldResult<()> {
        std::fs::write(path, self.to_tsv())?;
        Ok(())
    }

    /// Re-derive the sector map from the current rooms and report any
    /// vnum whose sector drifted from the baseline. Rooms that are in
    /// the world but not in the baseline are new, not drift.
    pub fn verify<'a>(&self, rooms: impl IntoIterator<Item = &'a Room>) -> Vec<Drift> {
        let current: BTreeMap<u32, u32> = rooms.into_iter().map(|r| (r.vnum, r.sector)).collect();
        let mut drifts = Vec::new();
        for (&vnum, entry) in &self.entries {
            match current.get(&vnum) {
                Some(&sector) if sector == entry.sector => {}
                Some(&sector) => drifts.push(Drift::Changed {
                    vnum,
                    baseline: entry.sector,
                    current: sector,
                }),
                None => drifts.push(Drift::Missing {
                    vnum,
                    baseline: entry.sector,
                }),
            }
        }
        drifts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wld::WldDocument;

    #[test]
    fn manifest_tsv_round_trip() {
        let doc = WldDocument::parse(
            b"#46851\nA Windswept Road~\n~\n468 a 11 10 10\nS\n$~\n",
        )
        .unwrap();
        let manifest = Manifest::snapshot(doc.rooms());
        let reparsed = Manifest::parse_tsv(&manifest.to_tsv()).unwrap();
        assert_eq!(reparsed.sector_of(46851), Some(11));
    }

    #[test]
    fn sector_change_is_reported() {
        let mut baseline = Manifest::default();
        baseline.insert(
            46851,
            ManifestEntry { zone: 468, sector: 11, name: "A Windswept Road".into() },
        );
        let doc = WldDocument::parse(
            b"#46851\nA Windswept Road~\n~\n468 a 2 10 10\nS\n$~\n",
        )
        .unwrap();
        let drifts = baseline.verify(doc.rooms());
        assert_eq!(drifts.len(), 1);
        assert_eq!(
            drifts[0].to_string(),
            "VNUM 46851: Sector changed from 11 to 2"
        );
    }

    #[test]
    fn unchanged_world_is_clean() {
        let doc = WldDocument::parse(
            b"#46851\nA Windswept Road~\n~\n468 a 11 10 10\nS\n$~\n",
        )
        .unwrap();
        let baseline = Manifest::snapshot(doc.rooms());
        assert!(baseline.verify(doc.rooms()).is_empty());
    }
}
