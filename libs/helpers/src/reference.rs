//! Scan-based reference blend for differential tests.
//!
//! Implements the same admission, displacement and refill rules as the
//! engine, but over plain sets with linear scans instead of heaps, so a
//! bookkeeping bug on either side makes the two diverge.

use std::collections::{HashMap, HashSet};

use log::debug;

use blend_index::base::{BlendDelta, Mood, MoodDelta, PlaylistId, RankedTrack, TrackId};
use blend_index::blend::BlendLimits;
use blend_index::catalog::Catalog;

pub struct NaiveBlend {
    limits: BlendLimits,
    members: [HashSet<TrackId>; Mood::COUNT],
    pool: [HashSet<TrackId>; Mood::COUNT],
    grants: [HashMap<PlaylistId, usize>; Mood::COUNT],
    active: HashSet<TrackId>,
}

impl NaiveBlend {
    pub fn new(catalog: &Catalog, limits: &BlendLimits) -> Self {
        let mut blend = Self {
            limits: *limits,
            members: std::array::from_fn(|_| HashSet::new()),
            pool: std::array::from_fn(|_| HashSet::new()),
            grants: std::array::from_fn(|_| HashMap::new()),
            active: HashSet::new(),
        };
        for track in catalog.tracks.values() {
            if track.playlist.is_some() {
                blend.active.insert(track.id);
                for mood in Mood::ALL {
                    blend.pool[mood.index()].insert(track.id);
                }
            }
        }
        for mood in Mood::ALL {
            blend.fill(catalog, mood);
        }
        blend
    }

    pub fn add(&mut self, catalog: &Catalog, id: TrackId, playlist: PlaylistId) -> BlendDelta {
        assert!(
            self.active.insert(id),
            "track {} is already part of the blend",
            id
        );
        assert_eq!(
            catalog.track(id).playlist,
            Some(playlist),
            "the engine must assign the track before the reference sees it"
        );
        let mut delta = BlendDelta::default();
        for mood in Mood::ALL {
            let entry = RankedTrack::new(catalog.track(id), mood);
            delta.record(mood, self.insert(catalog, entry, mood));
        }
        delta
    }

    pub fn remove(&mut self, catalog: &Catalog, id: TrackId) -> BlendDelta {
        assert!(
            self.active.remove(&id),
            "track {} is not part of the blend",
            id
        );
        let mut delta = BlendDelta::default();
        for mood in Mood::ALL {
            delta.record(mood, self.take(catalog, id, mood));
        }
        delta
    }

    pub fn ask(&self, catalog: &Catalog) -> Vec<TrackId> {
        let mut ids: HashSet<TrackId> = HashSet::new();
        for mood in Mood::ALL {
            ids.extend(self.members[mood.index()].iter().copied());
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

    pub fn members(&self, mood: Mood) -> &HashSet<TrackId> {
        &self.members[mood.index()]
    }

    fn granted(&self, mood: Mood, playlist: PlaylistId) -> usize {
        self.grants[mood.index()]
            .get(&playlist)
            .copied()
            .unwrap_or(0)
    }

    fn headroom(&self, mood: Mood, playlist: PlaylistId) -> bool {
        self.granted(mood, playlist) < self.limits.per_playlist
    }

    fn admit(&mut self, mood: Mood, id: TrackId, playlist: PlaylistId) {
        self.pool[mood.index()].remove(&id);
        self.members[mood.index()].insert(id);
        *self.grants[mood.index()].entry(playlist).or_insert(0) += 1;
    }

    fn displace(&mut self, mood: Mood, id: TrackId, playlist: PlaylistId) {
        debug!("[{}] reference displaces {}", mood, id);
        self.members[mood.index()].remove(&id);
        self.pool[mood.index()].insert(id);
        let slot = self.grants[mood.index()]
            .get_mut(&playlist)
            .expect("no quota slots granted");
        *slot -= 1;
    }

    fn weakest_member(&self, catalog: &Catalog, mood: Mood) -> Option<RankedTrack> {
        self.members[mood.index()]
            .iter()
            .map(|&id| RankedTrack::new(catalog.track(id), mood))
            .min()
    }

    fn weakest_of_playlist(
        &self,
        catalog: &Catalog,
        mood: Mood,
        playlist: PlaylistId,
    ) -> Option<RankedTrack> {
        self.members[mood.index()]
            .iter()
            .map(|&id| RankedTrack::new(catalog.track(id), mood))
            .filter(|entry| entry.playlist == playlist)
            .min()
    }

    fn strongest_in_pool(
        &self,
        catalog: &Catalog,
        mood: Mood,
        passed: &HashSet<TrackId>,
    ) -> Option<RankedTrack> {
        self.pool[mood.index()]
            .iter()
            .copied()
            .filter(|id| !passed.contains(id))
            .map(|id| RankedTrack::new(catalog.track(id), mood))
            .max()
    }

    fn fill(&mut self, catalog: &Catalog, mood: Mood) {
        let capacity = self.limits.capacities[mood.index()];
        let mut passed = HashSet::new();
        while self.members[mood.index()].len() < capacity {
            let entry = match self.strongest_in_pool(catalog, mood, &passed) {
                Some(entry) => entry,
                None => break,
            };
            if self.headroom(mood, entry.playlist) {
                self.admit(mood, entry.track, entry.playlist);
            } else {
                passed.insert(entry.track);
            }
        }
    }

    fn insert(&mut self, catalog: &Catalog, entry: RankedTrack, mood: Mood) -> MoodDelta {
        let m = mood.index();
        let mut delta = MoodDelta::default();
        let capacity = self.limits.capacities[m];

        if capacity == 0 || self.limits.per_playlist == 0 {
            self.pool[m].insert(entry.track);
            return delta;
        }

        if self.members[m].len() < capacity {
            if self.headroom(mood, entry.playlist) {
                self.admit(mood, entry.track, entry.playlist);
                delta.added = Some(entry.track);
            } else {
                let weakest = self
                    .weakest_of_playlist(catalog, mood, entry.playlist)
                    .expect("a playlist at quota must have chosen tracks");
                if entry > weakest {
                    self.displace(mood, weakest.track, weakest.playlist);
                    self.admit(mood, entry.track, entry.playlist);
                    delta.removed = Some(weakest.track);
                    delta.added = Some(entry.track);
                } else {
                    self.pool[m].insert(entry.track);
                }
            }
            return delta;
        }

        let weakest = self
            .weakest_member(catalog, mood)
            .expect("chosen set at capacity cannot be empty");
        if !(entry > weakest) {
            self.pool[m].insert(entry.track);
            return delta;
        }

        if weakest.playlist == entry.playlist || self.headroom(mood, entry.playlist) {
            self.displace(mood, weakest.track, weakest.playlist);
            self.admit(mood, entry.track, entry.playlist);
            delta.removed = Some(weakest.track);
            delta.added = Some(entry.track);
        } else {
            let own_weakest = self
                .weakest_of_playlist(catalog, mood, entry.playlist)
                .expect("a playlist at quota must have chosen tracks");
            if entry > own_weakest {
                self.displace(mood, own_weakest.track, own_weakest.playlist);
                self.admit(mood, entry.track, entry.playlist);
                delta.removed = Some(own_weakest.track);
                delta.added = Some(entry.track);
            } else {
                self.pool[m].insert(entry.track);
            }
        }
        delta
    }

    fn take(&mut self, catalog: &Catalog, id: TrackId, mood: Mood) -> MoodDelta {
        let m = mood.index();
        let mut delta = MoodDelta::default();

        if !self.members[m].remove(&id) {
            self.pool[m].remove(&id);
            return delta;
        }

        let playlist = catalog
            .track(id)
            .playlist
            .expect("track is not assigned to any playlist");
        let slot = self.grants[m]
            .get_mut(&playlist)
            .expect("no quota slots granted");
        *slot -= 1;
        delta.removed = Some(id);

        // At most one candidate takes the freed slot
        let capacity = self.limits.capacities[m];
        let mut passed = HashSet::new();
        while self.members[m].len() < capacity {
            let entry = match self.strongest_in_pool(catalog, mood, &passed) {
                Some(entry) => entry,
                None => break,
            };
            if self.headroom(mood, entry.playlist) {
                self.admit(mood, entry.track, entry.playlist);
                delta.added = Some(entry.track);
                break;
            }
            passed.insert(entry.track);
        }
        delta
    }
}
