//! Whitespace text feed: catalog files, command streams and their renderer

use std::io::Write;
use std::str::FromStr;

use derivative::Derivative;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use simple_error::bail;

use crate::base::{BlendDelta, BoxResult, Mood, PlayCount, PlaylistId, Track, TrackId};
use crate::blend::{Blend, BlendLimits};
use crate::catalog::Catalog;

const DEFAULT_PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

fn pb_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(DEFAULT_PROGRESS_TEMPLATE)
        .progress_chars("=> ")
}

#[derive(Derivative, Clone)]
#[derivative(Default)]
pub struct LoadOptions {
    /// Draw a progress bar while reading the catalog
    #[derivative(Default(value = "false"))]
    pub progress: bool,
}

/// Whitespace token reader over a feed file
struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    fn next(&mut self) -> BoxResult<&'a str> {
        match self.inner.next() {
            Some(token) => Ok(token),
            None => bail!("unexpected end of input"),
        }
    }

    fn number<T: FromStr>(&mut self) -> BoxResult<T>
    where
        T::Err: std::error::Error + 'static,
    {
        Ok(self.next()?.parse()?)
    }
}

/// Reads a catalog file: a track count, then one record per track with
/// `id name plays heartache roadtrip blissful`.
pub fn read_catalog(input: &str, options: &LoadOptions) -> BoxResult<Catalog> {
    let mut tokens = Tokens::new(input);
    let count: usize = tokens.number()?;

    let progress = if options.progress {
        let pb = ProgressBar::new(count as u64);
        pb.set_style(pb_style());
        Some(pb)
    } else {
        None
    };

    let mut catalog = Catalog::new();
    for _ in 0..count {
        let id: TrackId = tokens.number()?;
        if catalog.tracks.contains_key(&id) {
            bail!("track {} appears twice in the catalog", id);
        }
        let name = tokens.next()?;
        let plays: PlayCount = tokens.number()?;
        let mut moods = [0; Mood::COUNT];
        for score in moods.iter_mut() {
            *score = tokens.number()?;
        }
        catalog.add_track(Track {
            id,
            name: name.into(),
            plays,
            moods,
            playlist: None,
        });
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = &progress {
        pb.finish();
    }

    info!("catalog loaded, {} tracks", count);
    Ok(catalog)
}

/// Runs a command stream against the catalog and renders every event.
///
/// The stream starts with the limits (`quota cap cap cap`), then the
/// playlist blocks (`pid size` followed by `size` track ids), then the
/// event count and one `ADD id pid` / `REM id pid` / `ASK` per event.
pub fn process(catalog: &mut Catalog, commands: &str, output: &mut dyn Write) -> BoxResult<()> {
    let mut tokens = Tokens::new(commands);

    let per_playlist: usize = tokens.number()?;
    let mut capacities = [0; Mood::COUNT];
    for capacity in capacities.iter_mut() {
        *capacity = tokens.number()?;
    }
    let limits = BlendLimits {
        per_playlist,
        capacities,
    };

    let playlist_count: usize = tokens.number()?;
    for _ in 0..playlist_count {
        let playlist: PlaylistId = tokens.number()?;
        catalog.ensure_playlist(playlist);
        let size: usize = tokens.number()?;
        for _ in 0..size {
            let track: TrackId = tokens.number()?;
            catalog.assign(track, playlist);
        }
    }

    let mut blend = Blend::new(catalog, &limits);

    let event_count: usize = tokens.number()?;
    for _ in 0..event_count {
        match tokens.next()? {
            "ADD" => {
                let track: TrackId = tokens.number()?;
                let playlist: PlaylistId = tokens.number()?;
                let delta = blend.add(catalog, track, playlist);
                write_delta(output, &delta)?;
            }
            "REM" => {
                let track: TrackId = tokens.number()?;
                let playlist: PlaylistId = tokens.number()?;
                if catalog.track(track).playlist != Some(playlist) {
                    bail!("track {} does not belong to playlist {}", track, playlist);
                }
                let delta = blend.remove(catalog, track);
                write_delta(output, &delta)?;
            }
            "ASK" => {
                let ranking = blend.ask(catalog);
                write_ranking(output, &ranking)?;
            }
            event => bail!("unknown event {}", event),
        }
    }
    Ok(())
}

/// Two lines per mutation: the admitted ids, then the evicted ids, one slot
/// per mood with `0` when nothing changed.
fn write_delta(output: &mut dyn Write, delta: &BlendDelta) -> BoxResult<()> {
    writeln!(
        output,
        "{} {} {}",
        delta.added[0].unwrap_or(0),
        delta.added[1].unwrap_or(0),
        delta.added[2].unwrap_or(0)
    )?;
    writeln!(
        output,
        "{} {} {}",
        delta.removed[0].unwrap_or(0),
        delta.removed[1].unwrap_or(0),
        delta.removed[2].unwrap_or(0)
    )?;
    Ok(())
}

/// One line of ids for a query; an empty ranking renders nothing at all
fn write_ranking(output: &mut dyn Write, ranking: &[TrackId]) -> BoxResult<()> {
    if ranking.is_empty() {
        return Ok(());
    }
    let line = ranking
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(output, "{}", line)?;
    Ok(())
}
