//! Show, season and episode records returned by a metadata provider.

use std::fmt;

/// A TV show search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    pub name: String,
    /// Premiere year, empty if unknown.
    pub year: String,
    pub id: u64,
}

/// A regular season of a show. Specials are never represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub name: String,
    pub episode_count: u32,
    /// Season number, always greater than zero.
    pub number: u32,
    pub id: u64,
}

/// A single episode within a season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub name: String,
    pub number: u32,
    pub id: u64,
}

impl fmt::Display for Show {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.year)
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.episode_count)
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Find the first episode with the given episode number.
#[must_use]
pub fn find_episode_by_number(episodes: &[Episode], number: u32) -> Option<&Episode> {
    episodes.iter().find(|episode| episode.number == number)
}
