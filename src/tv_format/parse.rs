use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static RE_SEASON_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[Ss](?P<season>[0-9]{2})[Ee](?P<episode>[0-9]{2})")
        .expect("Failed to create regex pattern for SxxEyy")
});

/// Season and episode number parsed from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeasonEpisode {
    pub season: u32,
    pub episode: u32,
}

impl SeasonEpisode {
    #[must_use]
    pub const fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

impl fmt::Display for SeasonEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

/// Parse season and episode numbers from the first `SxxEyy` marker in a filename.
///
/// Both numbers must be exactly two digits. The `S` and `E` letters are case-insensitive.
/// Returns `None` when the filename contains no marker.
///
/// ```rust
/// use tvfmt::tv_format::{SeasonEpisode, parse_episode_file};
///
/// assert_eq!(parse_episode_file("Show.Name.S01E05.mkv"), Some(SeasonEpisode::new(1, 5)));
/// assert_eq!(parse_episode_file("random_file.txt"), None);
/// ```
#[must_use]
pub fn parse_episode_file(filename: &str) -> Option<SeasonEpisode> {
    let captures = RE_SEASON_EPISODE.captures(filename)?;
    let season = captures.name("season")?.as_str().parse().ok()?;
    let episode = captures.name("episode")?.as_str().parse().ok()?;
    Some(SeasonEpisode { season, episode })
}
