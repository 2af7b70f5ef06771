//! Aggregate statistics over a finalized graph. Reporting only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::types::Graph;

/// Count of one object or morphism type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
    /// Share of the total, 0-100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub object_count: usize,
    pub morphism_count: usize,
    /// Descending by count, then by type name.
    pub objects_by_type: Vec<TypeCount>,
    /// Descending by count, then by type name.
    pub morphisms_by_type: Vec<TypeCount>,
}

impl GraphStats {
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            object_count: graph.objects.len(),
            morphism_count: graph.morphisms.len(),
            objects_by_type: breakdown(graph.objects.values().map(|o| o.kind.to_string())),
            morphisms_by_type: breakdown(graph.morphisms.values().map(|m| m.kind.to_string())),
        }
    }

    /// Morphisms per object; `None` for an empty graph.
    pub fn ratio(&self) -> Option<f64> {
        if self.object_count == 0 {
            None
        } else {
            Some(self.morphism_count as f64 / self.object_count as f64)
        }
    }

    pub fn object_type_count(&self, kind: &str) -> usize {
        lookup(&self.objects_by_type, kind)
    }

    pub fn morphism_type_count(&self, kind: &str) -> usize {
        lookup(&self.morphisms_by_type, kind)
    }
}

fn lookup(counts: &[TypeCount], kind: &str) -> usize {
    counts
        .iter()
        .find(|c| c.kind == kind)
        .map(|c| c.count)
        .unwrap_or(0)
}

fn breakdown(kinds: impl Iterator<Item = String>) -> Vec<TypeCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for kind in kinds {
        *counts.entry(kind).or_default() += 1;
    }
    let total: usize = counts.values().sum();

    let mut rows: Vec<TypeCount> = counts
        .into_iter()
        .map(|(kind, count)| TypeCount {
            kind,
            count,
            percent: if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            },
        })
        .collect();
    // BTreeMap order is by name already; a stable sort keeps it for ties.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Format with `,` thousands separators.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Banner rule framing the report headings.
pub const RULE: &str = "═══════════════════════════════════════════════════════════════";

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "  Categorical Model Statistics")?;
        writeln!(f, "{RULE}")?;
        writeln!(f)?;
        writeln!(f, "Total Objects: {}", group_thousands(self.object_count))?;
        writeln!(f, "Total Morphisms: {}", group_thousands(self.morphism_count))?;
        if let Some(ratio) = self.ratio() {
            writeln!(f, "Ratio: {ratio:.2} morphisms per object")?;
        }
        writeln!(f)?;
        writeln!(f, "Objects by Type:")?;
        write_rows(f, &self.objects_by_type)?;
        writeln!(f)?;
        writeln!(f, "Morphisms by Type:")?;
        write_rows(f, &self.morphisms_by_type)
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[TypeCount]) -> fmt::Result {
    for row in rows {
        writeln!(
            f,
            "  • {:15}: {:>5} ({:5.1}%)",
            row.kind,
            group_thousands(row.count),
            row.percent
        )?;
    }
    Ok(())
}
