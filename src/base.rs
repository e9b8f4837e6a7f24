pub type TrackId = u32;
pub type PlaylistId = u32;
pub type MoodScore = u32;
pub type PlayCount = u64;
pub type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One scoring dimension of the blend
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Mood {
    Heartache,
    RoadTrip,
    Blissful,
}

impl Mood {
    pub const COUNT: usize = 3;
    pub const ALL: [Mood; Mood::COUNT] = [Mood::Heartache, Mood::RoadTrip, Mood::Blissful];

    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mood::Heartache => write!(f, "heartache"),
            Mood::RoadTrip => write!(f, "roadtrip"),
            Mood::Blissful => write!(f, "blissful"),
        }
    }
}

/// A scored track; immutable except for its playlist assignment
#[derive(Serialize, Deserialize, Clone)]
pub struct Track {
    pub id: TrackId,
    pub name: Arc<str>,
    pub plays: PlayCount,
    /// One score per mood, indexed by [`Mood::index`]
    pub moods: [MoodScore; Mood::COUNT],
    pub playlist: Option<PlaylistId>,
}

impl Track {
    #[inline]
    pub fn score(&self, mood: Mood) -> MoodScore {
        self.moods[mood.index()]
    }
}

/// A track projected onto one mood: what the selection heaps order
#[derive(Clone)]
pub struct RankedTrack {
    pub track: TrackId,
    pub playlist: PlaylistId,
    pub score: MoodScore,
    pub name: Arc<str>,
}

impl RankedTrack {
    pub fn new(track: &Track, mood: Mood) -> Self {
        Self {
            track: track.id,
            playlist: track
                .playlist
                .expect("track is not assigned to any playlist"),
            score: track.score(mood),
            name: track.name.clone(),
        }
    }
}

impl fmt::Display for RankedTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.track, self.score)
    }
}

impl PartialEq for RankedTrack {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.track == other.track
    }
}

impl Eq for RankedTrack {}

impl PartialOrd for RankedTrack {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Greater means stronger: higher score first, then the lexicographically
// smaller name, then the smaller track ID
impl Ord for RankedTrack {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.name.cmp(&self.name))
            .then_with(|| other.track.cmp(&self.track))
    }
}

/// What one operation changed in a single mood's chosen set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoodDelta {
    pub added: Option<TrackId>,
    pub removed: Option<TrackId>,
}

/// Per-mood changes produced by one add or remove
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlendDelta {
    pub added: [Option<TrackId>; Mood::COUNT],
    pub removed: [Option<TrackId>; Mood::COUNT],
}

impl BlendDelta {
    pub fn record(&mut self, mood: Mood, delta: MoodDelta) {
        self.added[mood.index()] = delta.added;
        self.removed[mood.index()] = delta.removed;
    }
}
