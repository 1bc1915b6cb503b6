//! Relation labels and their aggregation into reconciliation buckets

use crate::ClaimId;
use std::collections::{HashMap, HashSet};

/// Verdict on how a claim relates to the rest of the candidate pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Same meaning as an existing claim
    Identical,

    /// Overlapping meaning; should be merged with its targets
    Similar,

    /// Independent of everything else in the pool
    Unrelated,
}

impl RelationKind {
    /// Wire name of the label
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Identical => "IDENTICAL",
            RelationKind::Similar => "SIMILAR",
            RelationKind::Unrelated => "UNRELATED",
        }
    }

    /// Parse a wire label, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IDENTICAL" => Some(RelationKind::Identical),
            "SIMILAR" => Some(RelationKind::Similar),
            "UNRELATED" | "DIFFERENT" => Some(RelationKind::Unrelated),
            _ => None,
        }
    }
}

/// One labeled relation reported by the inference service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLabel {
    /// Claim the verdict is about
    pub source: ClaimId,

    /// Verdict
    pub kind: RelationKind,

    /// Other pool members the source is identical/similar to
    pub targets: Vec<ClaimId>,
}

impl RelationLabel {
    /// Create a label with no targets
    pub fn new(source: ClaimId, kind: RelationKind) -> Self {
        Self {
            source,
            kind,
            targets: Vec::new(),
        }
    }

    /// Add targets to the label
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = ClaimId>) -> Self {
        self.targets.extend(targets);
        self
    }
}

/// Pool members partitioned by verdict
///
/// The three buckets are disjoint and each keeps candidate-pool order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationBuckets {
    /// Claims that duplicate existing meaning
    pub identical: Vec<ClaimId>,

    /// Claims to merge into revised claims
    pub similar: Vec<ClaimId>,

    /// Claims to keep as they are
    pub unrelated: Vec<ClaimId>,
}

impl RelationBuckets {
    /// Whether the id landed in any bucket
    pub fn contains(&self, id: &ClaimId) -> bool {
        self.identical.contains(id) || self.similar.contains(id) || self.unrelated.contains(id)
    }

    /// Move ids that received no verdict at all into `unrelated`
    pub fn adopt_unlabeled(&mut self, ids: impl IntoIterator<Item = ClaimId>) {
        for id in ids {
            if !self.contains(&id) {
                self.unrelated.push(id);
            }
        }
    }

    /// Total number of bucketed ids
    pub fn len(&self) -> usize {
        self.identical.len() + self.similar.len() + self.unrelated.len()
    }

    /// True when no id was bucketed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregate relation labels over a candidate pool
///
/// Precedence is IDENTICAL > SIMILAR > UNRELATED: an id mentioned under a
/// stronger verdict anywhere is removed from every weaker bucket. IDENTICAL and
/// SIMILAR labels contribute their source and all targets; UNRELATED labels
/// contribute only their source. Ids outside `pool` are dropped.
///
/// # Examples
///
/// ```
/// use vigil_domain::{aggregate_relations, ClaimId, RelationKind, RelationLabel};
///
/// let (a, b) = (ClaimId::new(), ClaimId::new());
/// let labels = vec![
///     RelationLabel::new(a, RelationKind::Similar).with_targets([b]),
///     RelationLabel::new(b, RelationKind::Identical),
/// ];
/// let buckets = aggregate_relations(&labels, &[a, b]);
/// assert_eq!(buckets.identical, vec![b]);
/// assert_eq!(buckets.similar, vec![a]);
/// ```
pub fn aggregate_relations(labels: &[RelationLabel], pool: &[ClaimId]) -> RelationBuckets {
    let mut identical = HashSet::new();
    let mut similar = HashSet::new();
    let mut unrelated = HashSet::new();

    for label in labels {
        match label.kind {
            RelationKind::Identical => {
                identical.insert(label.source);
                identical.extend(label.targets.iter().copied());
            }
            RelationKind::Similar => {
                similar.insert(label.source);
                similar.extend(label.targets.iter().copied());
            }
            RelationKind::Unrelated => {
                unrelated.insert(label.source);
            }
        }
    }

    let mut buckets = RelationBuckets::default();
    let mut seen = HashSet::new();
    for id in pool {
        if !seen.insert(*id) {
            continue;
        }
        if identical.contains(id) {
            buckets.identical.push(*id);
        } else if similar.contains(id) {
            buckets.similar.push(*id);
        } else if unrelated.contains(id) {
            buckets.unrelated.push(*id);
        }
    }
    buckets
}

/// Split the IDENTICAL verdicts into groups of claims that share a meaning
///
/// Two ids belong to one group when an IDENTICAL label connects them,
/// directly or through other ids. Groups and their members keep pool order;
/// ids outside `pool` are dropped.
///
/// # Examples
///
/// ```
/// use vigil_domain::{identical_groups, ClaimId, RelationKind, RelationLabel};
///
/// let ids: Vec<ClaimId> = (0..4).map(|_| ClaimId::new()).collect();
/// let labels = vec![
///     RelationLabel::new(ids[0], RelationKind::Identical).with_targets([ids[3]]),
///     RelationLabel::new(ids[1], RelationKind::Identical).with_targets([ids[2]]),
/// ];
/// let groups = identical_groups(&labels, &ids);
/// assert_eq!(groups, vec![vec![ids[0], ids[3]], vec![ids[1], ids[2]]]);
/// ```
pub fn identical_groups(labels: &[RelationLabel], pool: &[ClaimId]) -> Vec<Vec<ClaimId>> {
    let index: HashMap<ClaimId, usize> = pool
        .iter()
        .enumerate()
        .rev()
        .map(|(i, id)| (*id, i))
        .collect();
    let mut parent: Vec<usize> = (0..pool.len()).collect();
    let mut member = vec![false; pool.len()];

    for label in labels.iter().filter(|l| l.kind == RelationKind::Identical) {
        let ends: Vec<usize> = std::iter::once(&label.source)
            .chain(label.targets.iter())
            .filter_map(|id| index.get(id).copied())
            .collect();
        for &i in &ends {
            member[i] = true;
        }
        for pair in ends.windows(2) {
            let (a, b) = (find(&mut parent, pair[0]), find(&mut parent, pair[1]));
            if a != b {
                parent[a.max(b)] = a.min(b);
            }
        }
    }

    let mut groups: Vec<Vec<ClaimId>> = Vec::new();
    let mut slot: HashMap<usize, usize> = HashMap::new();
    for (i, id) in pool.iter().enumerate() {
        if !member[i] || index.get(id) != Some(&i) {
            continue;
        }
        let root = find(&mut parent, i);
        let next = groups.len();
        let at = *slot.entry(root).or_insert(next);
        if at == next {
            groups.push(Vec::new());
        }
        groups[at].push(*id);
    }
    groups
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}
