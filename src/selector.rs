//! Per-mood selection engine

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::base::{Mood, MoodDelta, PlaylistId, RankedTrack, TrackId};
use crate::catalog::Playlist;
use crate::heap::{Orientation, RankedHeap};

/// Maintains the bounded chosen set for one mood.
///
/// Tracks sit either in the candidate pool (a max-heap over strength) or in
/// the chosen set (a min-heap, weakest incumbent at the root). Removals are
/// lazy: an entry leaving a heap logically stays in the backing array, marked
/// in the matching stale set, until it surfaces at a root. The per-playlist
/// heaps mirror the chosen set so the weakest track a playlist contributes
/// can be found without scanning; they are purged against the membership set.
pub struct MoodSelector {
    mood: Mood,
    capacity: usize,
    quota: usize,
    candidates: RankedHeap<RankedTrack>,
    chosen: RankedHeap<RankedTrack>,
    by_playlist: HashMap<PlaylistId, RankedHeap<RankedTrack>>,
    members: HashSet<TrackId>,
    stale_candidates: HashSet<TrackId>,
    stale_chosen: HashSet<TrackId>,
}

impl MoodSelector {
    pub fn new(mood: Mood, capacity: usize, quota: usize) -> Self {
        Self {
            mood,
            capacity,
            quota,
            candidates: RankedHeap::new(Orientation::Max),
            chosen: RankedHeap::new(Orientation::Min),
            by_playlist: HashMap::new(),
            members: HashSet::new(),
            stale_candidates: HashSet::new(),
            stale_chosen: HashSet::new(),
        }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Tracks currently in the chosen set
    pub fn members(&self) -> &HashSet<TrackId> {
        &self.members
    }

    /// Bulk-loads the candidate pool before the first fill
    pub fn seed(&mut self, entries: Vec<RankedTrack>) {
        self.candidates = RankedHeap::from_vec(Orientation::Max, entries);
    }

    /// One-time greedy fill of the chosen set from the seeded pool.
    /// Candidates blocked by their playlist's quota are set aside and
    /// returned to the pool once the fill is over.
    pub fn initial_fill(&mut self, playlists: &mut HashMap<PlaylistId, Playlist>) {
        let mut held = Vec::new();
        while self.chosen.live() < self.capacity {
            let entry = match self.pop_candidate() {
                Some(entry) => entry,
                None => break,
            };
            let playlist = playlists
                .get_mut(&entry.playlist)
                .expect(&format!("unknown playlist {}", entry.playlist));
            if playlist.granted(self.mood) < self.quota {
                playlist.grant(self.mood);
                self.admit(entry);
            } else {
                held.push(entry);
            }
        }
        for entry in held {
            self.candidates.insert(entry);
        }
    }

    /// A track joins the universe of this mood. Returns what changed in the
    /// chosen set, if anything.
    pub fn insert(
        &mut self,
        entry: RankedTrack,
        playlists: &mut HashMap<PlaylistId, Playlist>,
    ) -> MoodDelta {
        let mut delta = MoodDelta::default();

        if self.capacity == 0 || self.quota == 0 {
            self.demote(entry);
            return delta;
        }

        if self.chosen.live() < self.capacity {
            let playlist = playlists
                .get_mut(&entry.playlist)
                .expect(&format!("unknown playlist {}", entry.playlist));
            if playlist.granted(self.mood) < self.quota {
                // A free slot and quota headroom: nobody gets displaced
                playlist.grant(self.mood);
                delta.added = Some(self.admit(entry));
            } else {
                // A free slot, but the playlist used up its quota: the track
                // can only displace the weakest of its own playlist
                let weakest = self
                    .weakest_of_playlist(entry.playlist)
                    .expect("a playlist at quota must have chosen tracks");
                if entry > weakest {
                    delta.removed = Some(weakest.track);
                    self.evict(weakest);
                    delta.added = Some(self.admit(entry));
                } else {
                    self.demote(entry);
                }
            }
            return delta;
        }

        let weakest = self
            .weakest_chosen()
            .expect("chosen set at capacity cannot be empty");

        if !(entry > weakest) {
            self.demote(entry);
            return delta;
        }

        if weakest.playlist == entry.playlist {
            // Swapping within one playlist leaves the quota untouched
            delta.removed = Some(weakest.track);
            self.evict(weakest);
            delta.added = Some(self.admit(entry));
            return delta;
        }

        let granted = playlists
            .get_mut(&entry.playlist)
            .expect(&format!("unknown playlist {}", entry.playlist))
            .granted(self.mood);
        if granted < self.quota {
            // The quota slot moves from the weakest's playlist to ours
            playlists
                .get_mut(&weakest.playlist)
                .expect(&format!("unknown playlist {}", weakest.playlist))
                .release(self.mood);
            playlists
                .get_mut(&entry.playlist)
                .expect(&format!("unknown playlist {}", entry.playlist))
                .grant(self.mood);
            delta.removed = Some(weakest.track);
            self.evict(weakest);
            delta.added = Some(self.admit(entry));
        } else {
            // Out of quota: the global weakest stays, the track may still
            // displace the weakest of its own playlist
            let own_weakest = self
                .weakest_of_playlist(entry.playlist)
                .expect("a playlist at quota must have chosen tracks");
            if entry > own_weakest {
                delta.removed = Some(own_weakest.track);
                self.evict(own_weakest);
                delta.added = Some(self.admit(entry));
            } else {
                self.demote(entry);
            }
        }
        delta
    }

    /// A track leaves the universe of this mood. A chosen track frees its
    /// slot and at most one candidate takes it; candidates blocked by their
    /// playlist's quota go back to the pool.
    pub fn remove(
        &mut self,
        entry: RankedTrack,
        playlists: &mut HashMap<PlaylistId, Playlist>,
    ) -> MoodDelta {
        let mut delta = MoodDelta::default();
        let id = entry.track;

        if !self.members.remove(&id) {
            // Not chosen here: retire its pool entry in place
            if self.stale_candidates.insert(id) {
                self.candidates.retire();
            }
            return delta;
        }

        debug!("[{}] removing chosen {}", self.mood, entry);
        self.stale_chosen.insert(id);
        self.chosen.retire();
        self.by_playlist
            .get_mut(&entry.playlist)
            .expect("chosen track has no playlist heap")
            .retire();
        playlists
            .get_mut(&entry.playlist)
            .expect(&format!("unknown playlist {}", entry.playlist))
            .release(self.mood);
        delta.removed = Some(id);

        let mut held = Vec::new();
        while self.chosen.live() < self.capacity {
            let candidate = match self.pop_candidate() {
                Some(candidate) => candidate,
                None => break,
            };
            let playlist = playlists
                .get_mut(&candidate.playlist)
                .expect(&format!("unknown playlist {}", candidate.playlist));
            if playlist.granted(self.mood) < self.quota {
                playlist.grant(self.mood);
                delta.added = Some(self.admit(candidate));
                break;
            }
            held.push(candidate);
        }
        for candidate in held {
            self.candidates.insert(candidate);
        }
        delta
    }

    /// Puts a track into the chosen set and its playlist's mirror heap,
    /// reviving a stale chosen entry when one is still in the array.
    fn admit(&mut self, entry: RankedTrack) -> TrackId {
        let id = entry.track;
        debug!("[{}] admitting {}", self.mood, entry);
        if self.stale_chosen.remove(&id) {
            self.chosen.restore();
        } else {
            self.chosen.insert(entry.clone());
        }
        self.by_playlist
            .entry(entry.playlist)
            .or_insert_with(|| RankedHeap::new(Orientation::Min))
            .insert(entry);
        self.members.insert(id);
        id
    }

    /// Returns a track to the candidate pool, reviving a stale pool entry
    /// when one is still in the array.
    fn demote(&mut self, entry: RankedTrack) {
        debug!("[{}] {} goes back to the pool", self.mood, entry);
        if self.stale_candidates.remove(&entry.track) {
            self.candidates.restore();
        } else {
            self.candidates.insert(entry);
        }
    }

    /// Moves a chosen track back to the candidate pool. Quota counters are
    /// the caller's business.
    fn evict(&mut self, entry: RankedTrack) {
        debug!("[{}] evicting {}", self.mood, entry);
        self.members.remove(&entry.track);
        self.stale_chosen.insert(entry.track);
        self.chosen.retire();
        self.by_playlist
            .get_mut(&entry.playlist)
            .expect("chosen track has no playlist heap")
            .retire();
        self.demote(entry);
    }

    /// Pops the strongest live candidate, discarding stale roots on the way
    fn pop_candidate(&mut self) -> Option<RankedTrack> {
        while let Some(entry) = self.candidates.pop() {
            if self.stale_candidates.remove(&entry.track) {
                continue;
            }
            self.candidates.retire();
            return Some(entry);
        }
        None
    }

    /// The weakest chosen track across all playlists
    fn weakest_chosen(&mut self) -> Option<RankedTrack> {
        while let Some(id) = self.chosen.peek().map(|entry| entry.track) {
            if !self.stale_chosen.remove(&id) {
                break;
            }
            self.chosen.pop();
        }
        self.chosen.peek().cloned()
    }

    /// The weakest chosen track of one playlist. Entries whose track is no
    /// longer a member are dropped for good on the way down.
    fn weakest_of_playlist(&mut self, playlist: PlaylistId) -> Option<RankedTrack> {
        let heap = self.by_playlist.get_mut(&playlist)?;
        while let Some(top) = heap.peek() {
            if self.members.contains(&top.track) {
                return Some(top.clone());
            }
            heap.pop();
        }
        None
    }

    /// Recounts every structural invariant. Meant for tests and debugging,
    /// not for the hot path.
    pub fn validate(&self, playlists: &HashMap<PlaylistId, Playlist>) {
        assert!(
            self.chosen.live() <= self.capacity,
            "[{}] chosen set over capacity: {} > {}",
            self.mood,
            self.chosen.live(),
            self.capacity
        );
        assert_eq!(
            self.chosen.live(),
            self.members.len(),
            "[{}] live chosen entries diverge from the membership set",
            self.mood
        );
        assert_eq!(
            self.chosen.live() + self.stale_chosen.len(),
            self.chosen.len(),
            "[{}] chosen heap accounting is off",
            self.mood
        );
        assert_eq!(
            self.candidates.live() + self.stale_candidates.len(),
            self.candidates.len(),
            "[{}] candidate heap accounting is off",
            self.mood
        );

        // A track never counts on both sides at once
        for entry in self.candidates.iter() {
            if !self.stale_candidates.contains(&entry.track) {
                assert!(
                    !self.members.contains(&entry.track),
                    "[{}] track {} is both chosen and a live candidate",
                    self.mood,
                    entry.track
                );
            }
        }

        // Quota counters must match a per-playlist recount of the members
        let mut counted: HashMap<PlaylistId, usize> = HashMap::new();
        for entry in self.chosen.iter() {
            if self.members.contains(&entry.track) {
                *counted.entry(entry.playlist).or_insert(0) += 1;
            }
        }
        assert_eq!(
            counted.values().sum::<usize>(),
            self.members.len(),
            "[{}] some members have no live chosen entry",
            self.mood
        );
        for (playlist_id, playlist) in playlists.iter() {
            let observed = counted.get(playlist_id).copied().unwrap_or(0);
            assert_eq!(
                observed,
                playlist.granted(self.mood),
                "[{}] playlist {} quota counter diverges from the chosen set",
                self.mood,
                playlist_id
            );
            assert!(
                playlist.granted(self.mood) <= self.quota,
                "[{}] playlist {} exceeds its quota",
                self.mood,
                playlist_id
            );
        }

        // The mirror heaps agree with the quota counters
        for (playlist_id, heap) in self.by_playlist.iter() {
            let granted = playlists
                .get(playlist_id)
                .map(|playlist| playlist.granted(self.mood))
                .unwrap_or(0);
            assert_eq!(
                heap.live(),
                granted,
                "[{}] playlist {} mirror heap accounting is off",
                self.mood,
                playlist_id
            );
        }
    }
}
