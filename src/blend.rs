//! Three-mood blend over a track catalog

use std::collections::HashSet;

use log::info;
use serde::{Deserialize, Serialize};

use crate::base::{BlendDelta, Mood, PlaylistId, RankedTrack, TrackId};
use crate::catalog::Catalog;
use crate::selector::MoodSelector;

/// Selection limits, fixed for the lifetime of a blend
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct BlendLimits {
    /// How many tracks one playlist may contribute to one mood's chosen set
    pub per_playlist: usize,
    /// Chosen-set sizes, indexed by [`Mood::index`]
    pub capacities: [usize; Mood::COUNT],
}

/// The maintained selection: one chosen set per mood, updated on every
/// track arrival and departure.
pub struct Blend {
    selectors: [MoodSelector; Mood::COUNT],
    active: HashSet<TrackId>,
}

impl Blend {
    /// Builds the blend over the catalog's assigned tracks and performs the
    /// one-time greedy fill of every mood.
    pub fn new(catalog: &mut Catalog, limits: &BlendLimits) -> Blend {
        let mut blend = Blend {
            selectors: Mood::ALL.map(|mood| {
                MoodSelector::new(mood, limits.capacities[mood.index()], limits.per_playlist)
            }),
            active: HashSet::new(),
        };

        let assigned: Vec<_> = catalog
            .tracks
            .values()
            .filter(|track| track.playlist.is_some())
            .collect();
        info!(
            "blending {} tracks over {} playlists",
            assigned.len(),
            catalog.playlists.len()
        );

        for selector in blend.selectors.iter_mut() {
            let entries = assigned
                .iter()
                .map(|track| RankedTrack::new(track, selector.mood()))
                .collect();
            selector.seed(entries);
            selector.initial_fill(&mut catalog.playlists);
        }
        blend.active.extend(assigned.iter().map(|track| track.id));
        blend
    }

    /// A track joins a playlist. Returns what changed in each mood.
    pub fn add(&mut self, catalog: &mut Catalog, id: TrackId, playlist: PlaylistId) -> BlendDelta {
        catalog.assign(id, playlist);
        assert!(
            self.active.insert(id),
            "track {} is already part of the blend",
            id
        );
        let track = catalog.tracks.get(&id).expect(&format!("unknown track {}", id));

        let mut delta = BlendDelta::default();
        for selector in self.selectors.iter_mut() {
            let entry = RankedTrack::new(track, selector.mood());
            delta.record(selector.mood(), selector.insert(entry, &mut catalog.playlists));
        }
        delta
    }

    /// A track leaves its playlist. Returns what changed in each mood.
    pub fn remove(&mut self, catalog: &mut Catalog, id: TrackId) -> BlendDelta {
        assert!(
            self.active.remove(&id),
            "track {} is not part of the blend",
            id
        );
        let track = catalog.tracks.get(&id).expect(&format!("unknown track {}", id));

        let mut delta = BlendDelta::default();
        for selector in self.selectors.iter_mut() {
            let entry = RankedTrack::new(track, selector.mood());
            delta.record(selector.mood(), selector.remove(entry, &mut catalog.playlists));
        }
        delta
    }

    /// The union of the three chosen sets: most played first, ties broken
    /// by name and then by track ID.
    pub fn ask(&self, catalog: &Catalog) -> Vec<TrackId> {
        let mut ids = HashSet::new();
        for selector in self.selectors.iter() {
            ids.extend(selector.members().iter().copied());
        }

        let mut ranking: Vec<TrackId> = ids.into_iter().collect();
        ranking.sort_by(|a, b| {
            let track_a = catalog.track(*a);
            let track_b = catalog.track(*b);
            track_b
                .plays
                .cmp(&track_a.plays)
                .then_with(|| track_a.name.cmp(&track_b.name))
                .then_with(|| track_a.id.cmp(&track_b.id))
        });
        ranking
    }

    /// Tracks currently chosen for one mood
    pub fn members(&self, mood: Mood) -> &HashSet<TrackId> {
        self.selectors[mood.index()].members()
    }

    /// Whether a track is currently part of the blend's universe
    pub fn contains(&self, id: TrackId) -> bool {
        self.active.contains(&id)
    }

    /// Recounts every selector invariant against the catalog
    pub fn validate(&self, catalog: &Catalog) {
        for selector in self.selectors.iter() {
            selector.validate(&catalog.playlists);
        }
    }
}
