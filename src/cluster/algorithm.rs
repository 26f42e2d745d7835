use std::fmt;
use std::str::FromStr;

use super::bfs::Bfs;
use super::hoshen_kopelman::HoshenKopelman;
use super::traits::ClusterLabeler;
use crate::error::Error;

/// Labeling strategy, chosen at call time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Breadth-first flood fill. Reference implementation.
    Bfs,
    /// Hoshen-Kopelman union-find. The fast path.
    #[default]
    UnionFind,
}

static BFS: Bfs = Bfs;
static UNION_FIND: HoshenKopelman = HoshenKopelman;

impl Algorithm {
    /// Every available strategy.
    pub const ALL: [Algorithm; 2] = [Algorithm::Bfs, Algorithm::UnionFind];

    /// The labeler implementing this strategy.
    pub fn labeler(self) -> &'static dyn ClusterLabeler {
        match self {
            Algorithm::Bfs => &BFS,
            Algorithm::UnionFind => &UNION_FIND,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.labeler().name()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "union-find" | "union_find" | "uf" | "hk" => Ok(Algorithm::UnionFind),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for algo in Algorithm::ALL {
            assert_eq!(algo.to_string().parse::<Algorithm>().unwrap(), algo);
        }
        assert_eq!("HK".parse::<Algorithm>().unwrap(), Algorithm::UnionFind);
        assert!(matches!(
            "dfs".parse::<Algorithm>(),
            Err(Error::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_default_is_union_find() {
        assert_eq!(Algorithm::default(), Algorithm::UnionFind);
        assert_eq!(Algorithm::default().labeler().name(), "union-find");
    }
}
