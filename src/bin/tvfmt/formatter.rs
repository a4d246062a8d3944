use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::{Color, Colorize};

use tvfmt::tv_format::{Episode, PathChange, RenamePlan, Season, Show, apply_renames, build_rename_plan};

use crate::config::Config;
use crate::provider::MetadataProvider;
use crate::select::Selector;

/// Maximum number of shows listed for a search.
const SHOW_SEARCH_LIMIT: usize = 5;

const SHOW_NOT_FOUND: &str = "Unable to find TV Show matching given name.";
const INVALID_SEASON: &str = "Invalid season number given.";
const EPISODES_NOT_FOUND: &str = "Unable to find episodes for given season.";
const NO_PARSED_FILES: &str = "Unable to parse files in given directory.";

/// Renames the episode files in one directory.
pub struct TvFormatter<P, S> {
    provider: P,
    selector: S,
    config: Config,
}

impl<P: MetadataProvider, S: Selector> TvFormatter<P, S> {
    pub const fn new(provider: P, selector: S, config: Config) -> Self {
        Self {
            provider,
            selector,
            config,
        }
    }

    /// Look up the show and season, then rename the files.
    pub async fn run(mut self) -> Result<()> {
        let directory = self.config.path.clone();
        if !directory.is_dir() {
            bail!(
                "Invalid value for PATH: Directory '{}' doesn't exist.",
                tvfmt::short_path(&directory)
            );
        }

        let show = self.resolve_show().await?;
        if self.config.verbose {
            println!("{} {show}", "Show:".bold());
        }

        let season = self.resolve_season(&show).await?;
        if self.config.verbose {
            println!("{} {season}", "Season:".bold());
        }

        let episodes = self.fetch_episodes(&show, &season).await?;
        let files = tvfmt::list_visible_files(&directory)?;
        let plan = build_rename_plan(&files, &show.name, &episodes);
        print_unmatched(&plan);
        if plan.is_empty() {
            bail!(NO_PARSED_FILES);
        }

        let changes = plan.pending();
        if changes.is_empty() {
            println!("{}", "All files are already named correctly.".green());
            return Ok(());
        }

        if self.config.dryrun {
            print_changes(&changes, &directory);
            return Ok(());
        }

        if self.config.confirm {
            print_changes(&changes, &directory);
            if !self.selector.confirm("Commit changes?")? {
                println!("No changes made.");
                return Ok(());
            }
        }

        let renamed = apply_renames(&changes)?;
        if self.config.verbose {
            println!("Renamed {renamed} file{}", if renamed == 1 { "" } else { "s" });
        }
        println!("{}", "Done!".bold().green());
        Ok(())
    }

    /// Search shows by the configured name, or ask for one, and pick one result.
    async fn resolve_show(&mut self) -> Result<Show> {
        let query = match self.config.show.clone() {
            Some(name) => name,
            None => self.selector.text("Search TV shows")?.context(SHOW_NOT_FOUND)?,
        };

        let shows = self
            .provider
            .search_shows(&query, SHOW_SEARCH_LIMIT)
            .await
            .context(SHOW_NOT_FOUND)?;
        let mut shows = tvfmt::non_empty(shows, SHOW_NOT_FOUND)?;

        let index = if self.config.auto {
            0
        } else {
            let choices: Vec<String> = shows.iter().map(ToString::to_string).collect();
            self.selector.select("TV Show", &choices)?.context(SHOW_NOT_FOUND)?
        };
        Ok(shows.swap_remove(index))
    }

    /// Pick a season by its one-based position in the season list, or ask for one.
    async fn resolve_season(&mut self, show: &Show) -> Result<Season> {
        let seasons = self
            .provider
            .list_seasons(show.id)
            .await
            .context(INVALID_SEASON)?;
        let mut seasons = tvfmt::non_empty(seasons, INVALID_SEASON)?;

        let index = match self.config.season {
            Some(number) if (1..=seasons.len()).contains(&number) => number - 1,
            _ => {
                let choices: Vec<String> = seasons.iter().map(ToString::to_string).collect();
                self.selector.select("Season", &choices)?.context(INVALID_SEASON)?
            }
        };
        Ok(seasons.swap_remove(index))
    }

    async fn fetch_episodes(&self, show: &Show, season: &Season) -> Result<Vec<Episode>> {
        let episodes = self
            .provider
            .list_episodes(show.id, season.number)
            .await
            .context(EPISODES_NOT_FOUND)?;
        tvfmt::non_empty(episodes, EPISODES_NOT_FOUND)
    }
}

fn print_unmatched(plan: &RenamePlan) {
    for message in unmatched_messages(plan) {
        tvfmt::print_warning(&message);
    }
}

fn unmatched_messages(plan: &RenamePlan) -> Vec<String> {
    plan.unmatched
        .iter()
        .map(|file| {
            format!(
                "No episode {} found for: {}",
                file.season_episode,
                tvfmt::path_to_filename_string(&file.path)
            )
        })
        .collect()
}

/// Print numbered changes in a panel titled with the directory path.
fn print_changes(changes: &[PathChange], directory: &Path) {
    let body = changes
        .iter()
        .filter(|change| change.is_file)
        .enumerate()
        .map(|(index, change)| format!("({}) {change}", index + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let title = tvfmt::short_path(&tvfmt::absolute_path(directory)).cyan().to_string();
    tvfmt::print_panel(&title, &body, Color::Yellow);
}

#[cfg(test)]
mod formatter_tests {
    use super::*;

    use std::collections::VecDeque;
    use std::fs;
    use std::path::PathBuf;

    use tempfile::{TempDir, tempdir};

    struct FakeProvider {
        shows: Vec<Show>,
        seasons: Vec<Season>,
        episodes: Vec<Episode>,
        fail: bool,
    }

    impl FakeProvider {
        fn office() -> Self {
            Self {
                shows: vec![
                    Show {
                        name: "The Office".to_string(),
                        year: "2005".to_string(),
                        id: 1391,
                    },
                    Show {
                        name: "The Office: UK".to_string(),
                        year: "2001".to_string(),
                        id: 1392,
                    },
                ],
                seasons: vec![
                    Season {
                        name: "Season 1".to_string(),
                        episode_count: 2,
                        number: 1,
                        id: 3001,
                    },
                    Season {
                        name: "Season 2".to_string(),
                        episode_count: 2,
                        number: 2,
                        id: 3002,
                    },
                ],
                episodes: vec![
                    Episode {
                        name: "Pilot".to_string(),
                        number: 1,
                        id: 1,
                    },
                    Episode {
                        name: "Diversity Day".to_string(),
                        number: 2,
                        id: 2,
                    },
                ],
                fail: false,
            }
        }
    }

    impl MetadataProvider for FakeProvider {
        async fn search_shows(&self, query: &str, limit: usize) -> Result<Vec<Show>> {
            if self.fail {
                bail!("Trakt API unavailable: HTTP 503 Service Unavailable");
            }
            Ok(self
                .shows
                .iter()
                .filter(|show| show.name.contains(query))
                .take(limit)
                .cloned()
                .collect())
        }

        async fn list_seasons(&self, _show_id: u64) -> Result<Vec<Season>> {
            Ok(self.seasons.clone())
        }

        async fn list_episodes(&self, _show_id: u64, _season_number: u32) -> Result<Vec<Episode>> {
            Ok(self.episodes.clone())
        }
    }

    #[derive(Default)]
    struct ScriptedSelector {
        texts: VecDeque<Option<String>>,
        selections: VecDeque<Option<usize>>,
        confirmations: VecDeque<bool>,
        prompts: Vec<String>,
    }

    impl Selector for ScriptedSelector {
        fn text(&mut self, prompt: &str) -> Result<Option<String>> {
            self.prompts.push(prompt.to_string());
            Ok(self.texts.pop_front().flatten())
        }

        fn select(&mut self, prompt: &str, _choices: &[String]) -> Result<Option<usize>> {
            self.prompts.push(prompt.to_string());
            Ok(self.selections.pop_front().flatten())
        }

        fn confirm(&mut self, prompt: &str) -> Result<bool> {
            self.prompts.push(prompt.to_string());
            Ok(self.confirmations.pop_front().unwrap_or(false))
        }
    }

    fn config(path: &Path) -> Config {
        Config {
            path: path.to_path_buf(),
            show: Some("The Office".to_string()),
            season: Some(1),
            auto: true,
            confirm: false,
            api_key: "key".to_string(),
            dryrun: false,
            verbose: false,
        }
    }

    fn episode_dir(names: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), "").unwrap();
        }
        dir
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn renames_files_without_confirmation() {
        let dir = episode_dir(&["office.s01e01.720p.mkv", "office.s01e02.720p.mkv", "notes.txt"]);
        let formatter = TvFormatter::new(FakeProvider::office(), ScriptedSelector::default(), config(dir.path()));

        formatter.run().await.unwrap();

        assert_eq!(
            file_names(dir.path()),
            vec![
                "The Office S01E01 Pilot.mkv",
                "The Office S01E02 Diversity Day.mkv",
                "notes.txt",
            ]
        );
    }

    #[tokio::test]
    async fn declined_confirmation_leaves_files() {
        let dir = episode_dir(&["a S01E01.mkv"]);
        let selector = ScriptedSelector {
            confirmations: VecDeque::from([false]),
            ..ScriptedSelector::default()
        };
        let config = Config {
            confirm: true,
            ..config(dir.path())
        };

        TvFormatter::new(FakeProvider::office(), selector, config).run().await.unwrap();

        assert_eq!(file_names(dir.path()), vec!["a S01E01.mkv"]);
    }

    #[tokio::test]
    async fn accepted_confirmation_renames() {
        let dir = episode_dir(&["a S01E02.mp4"]);
        let selector = ScriptedSelector {
            confirmations: VecDeque::from([true]),
            ..ScriptedSelector::default()
        };
        let config = Config {
            confirm: true,
            ..config(dir.path())
        };

        TvFormatter::new(FakeProvider::office(), selector, config).run().await.unwrap();

        assert_eq!(file_names(dir.path()), vec!["The Office S01E02 Diversity Day.mp4"]);
    }

    #[tokio::test]
    async fn dryrun_does_not_rename() {
        let dir = episode_dir(&["a S01E01.mkv"]);
        let config = Config {
            dryrun: true,
            ..config(dir.path())
        };

        TvFormatter::new(FakeProvider::office(), ScriptedSelector::default(), config)
            .run()
            .await
            .unwrap();

        assert_eq!(file_names(dir.path()), vec!["a S01E01.mkv"]);
    }

    #[tokio::test]
    async fn interactive_show_and_season_selection() {
        let dir = episode_dir(&["x S02E01.mkv"]);
        let selector = ScriptedSelector {
            texts: VecDeque::from([Some("Office".to_string())]),
            selections: VecDeque::from([Some(1), Some(1)]),
            ..ScriptedSelector::default()
        };
        let config = Config {
            show: None,
            season: None,
            auto: false,
            ..config(dir.path())
        };

        TvFormatter::new(FakeProvider::office(), selector, config).run().await.unwrap();

        assert_eq!(file_names(dir.path()), vec!["The Office UK S02E01 Pilot.mkv"]);
    }

    #[tokio::test]
    async fn out_of_range_season_asks_selector() {
        let dir = episode_dir(&["x S02E02.mkv"]);
        let mut formatter = TvFormatter::new(
            FakeProvider::office(),
            ScriptedSelector {
                selections: VecDeque::from([Some(1)]),
                ..ScriptedSelector::default()
            },
            Config {
                season: Some(7),
                ..config(dir.path())
            },
        );
        let show = formatter.resolve_show().await.unwrap();

        let season = formatter.resolve_season(&show).await.unwrap();

        assert_eq!(season.number, 2);
        assert_eq!(formatter.selector.prompts, vec!["Season"]);
    }

    #[tokio::test]
    async fn cancelled_season_selection_is_an_error() {
        let dir = episode_dir(&["x S01E01.mkv"]);
        let config = Config {
            season: None,
            ..config(dir.path())
        };

        let error = TvFormatter::new(FakeProvider::office(), ScriptedSelector::default(), config)
            .run()
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Invalid season number given.");
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let missing: PathBuf = dir.path().join("missing");

        let error = TvFormatter::new(FakeProvider::office(), ScriptedSelector::default(), config(&missing))
            .run()
            .await
            .unwrap_err();

        assert!(error.to_string().starts_with("Invalid value for PATH: Directory '"));
        assert!(error.to_string().ends_with("' doesn't exist."));
    }

    #[tokio::test]
    async fn no_search_results_is_an_error() {
        let dir = episode_dir(&["x S01E01.mkv"]);
        let config = Config {
            show: Some("Seinfeld".to_string()),
            ..config(dir.path())
        };

        let error = TvFormatter::new(FakeProvider::office(), ScriptedSelector::default(), config)
            .run()
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), SHOW_NOT_FOUND);
    }

    #[tokio::test]
    async fn provider_failure_keeps_cause() {
        let dir = episode_dir(&["x S01E01.mkv"]);
        let provider = FakeProvider {
            fail: true,
            ..FakeProvider::office()
        };

        let error = TvFormatter::new(provider, ScriptedSelector::default(), config(dir.path()))
            .run()
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), SHOW_NOT_FOUND);
        assert!(format!("{error:#}").contains("HTTP 503"));
    }

    #[tokio::test]
    async fn empty_episode_list_is_an_error() {
        let dir = episode_dir(&["x S01E01.mkv"]);
        let provider = FakeProvider {
            episodes: Vec::new(),
            ..FakeProvider::office()
        };

        let error = TvFormatter::new(provider, ScriptedSelector::default(), config(dir.path()))
            .run()
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), EPISODES_NOT_FOUND);
    }

    #[tokio::test]
    async fn no_parseable_files_is_an_error() {
        let dir = episode_dir(&["readme.txt", "episode one.mkv"]);

        let error = TvFormatter::new(FakeProvider::office(), ScriptedSelector::default(), config(dir.path()))
            .run()
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), NO_PARSED_FILES);
    }

    #[tokio::test]
    async fn already_named_files_skip_confirmation() {
        let dir = episode_dir(&["The Office S01E01 Pilot.mkv"]);
        let config = Config {
            confirm: true,
            ..config(dir.path())
        };
        let mut formatter = TvFormatter::new(FakeProvider::office(), ScriptedSelector::default(), config);
        let show = formatter.resolve_show().await.unwrap();
        assert_eq!(show.id, 1391);

        formatter.run().await.unwrap();

        assert_eq!(file_names(dir.path()), vec!["The Office S01E01 Pilot.mkv"]);
    }

    #[tokio::test]
    async fn all_files_unmatched_is_an_error() {
        let dir = episode_dir(&["x S01E08.mkv", "x S01E09.mkv"]);
        let mut formatter = TvFormatter::new(FakeProvider::office(), ScriptedSelector::default(), config(dir.path()));
        let show = formatter.resolve_show().await.unwrap();
        let season = formatter.resolve_season(&show).await.unwrap();
        let episodes = formatter.fetch_episodes(&show, &season).await.unwrap();
        let files = tvfmt::list_visible_files(dir.path()).unwrap();
        let plan = build_rename_plan(&files, &show.name, &episodes);
        assert!(plan.is_empty());
        assert_eq!(
            unmatched_messages(&plan),
            vec![
                "No episode S01E08 found for: x S01E08.mkv",
                "No episode S01E09 found for: x S01E09.mkv",
            ]
        );

        let error = formatter.run().await.unwrap_err();

        assert_eq!(error.to_string(), NO_PARSED_FILES);
        assert_eq!(file_names(dir.path()), vec!["x S01E08.mkv", "x S01E09.mkv"]);
    }

    #[tokio::test]
    async fn unmatched_episode_is_skipped() {
        let dir = episode_dir(&["x S01E01.mkv", "x S01E09.mkv"]);

        TvFormatter::new(FakeProvider::office(), ScriptedSelector::default(), config(dir.path()))
            .run()
            .await
            .unwrap();

        assert_eq!(file_names(dir.path()), vec!["The Office S01E01 Pilot.mkv", "x S01E09.mkv"]);
    }
}
