//! Track planning within a stage: phases with disjoint reads/writes may run
//! concurrently; any read/write or write/write overlap on a shared table
//! forces them onto the same (sequential) track.

use super::phase::PhaseOperation;

fn overlaps(a: &[&str], b: &[&str]) -> bool {
    a.iter().any(|x| b.contains(x))
}

fn conflicts(a: &dyn PhaseOperation, b: &dyn PhaseOperation) -> bool {
    overlaps(a.writes(), b.writes()) || overlaps(a.writes(), b.reads()) || overlaps(a.reads(), b.writes())
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Partitions a stage's phases into tracks, each a list of phase indices in
/// declared order. Tracks themselves are returned ordered by the smallest
/// phase index they contain, so the first track is always the one leading
/// with phase 0.
#[must_use]
pub fn plan_tracks(phases: &[Box<dyn PhaseOperation>]) -> Vec<Vec<usize>> {
    let n = phases.len();
    let mut sets = DisjointSet::new(n);

    for i in 0..n {
        for j in (i + 1)..n {
            if conflicts(phases[i].as_ref(), phases[j].as_ref()) {
                sets.union(i, j);
            }
        }
    }

    let mut tracks: Vec<Vec<usize>> = Vec::new();
    let mut root_to_track: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();
    for i in 0..n {
        let root = sets.find(i);
        let track_idx = *root_to_track.entry(root).or_insert_with(|| {
            tracks.push(Vec::new());
            tracks.len() - 1
        });
        tracks[track_idx].push(i);
    }
    tracks
}
