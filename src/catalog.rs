//! Track and playlist universe

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::base::{Mood, PlaylistId, Track, TrackId};

pub const CATALOG_CBOR: &str = "catalog.cbor";

/// Quota bookkeeping for one playlist
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct Playlist {
    /// Chosen-set slots currently held, indexed by [`Mood::index`]
    granted: [usize; Mood::COUNT],
}

impl Playlist {
    pub fn granted(&self, mood: Mood) -> usize {
        self.granted[mood.index()]
    }

    pub fn grant(&mut self, mood: Mood) {
        self.granted[mood.index()] += 1;
    }

    pub fn release(&mut self, mood: Mood) {
        self.granted[mood.index()] = self.granted[mood.index()]
            .checked_sub(1)
            .expect("released a quota slot that was never granted");
    }
}

#[derive(Serialize, Deserialize)]
pub struct Catalog {
    pub tracks: HashMap<TrackId, Track>,
    pub playlists: HashMap<PlaylistId, Playlist>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog {
            tracks: HashMap::new(),
            playlists: HashMap::new(),
        }
    }

    pub fn add_track(&mut self, track: Track) {
        let id = track.id;
        if self.tracks.insert(id, track).is_some() {
            panic!("track {} is already registered", id);
        }
    }

    pub fn ensure_playlist(&mut self, playlist: PlaylistId) {
        self.playlists.entry(playlist).or_default();
    }

    /// Binds a track to a playlist. The binding is permanent: assigning the
    /// same playlist again is a no-op, assigning another one panics.
    pub fn assign(&mut self, track: TrackId, playlist: PlaylistId) {
        self.playlists.entry(playlist).or_default();
        let entry = self
            .tracks
            .get_mut(&track)
            .expect(&format!("cannot assign unknown track {}", track));
        match entry.playlist {
            None => entry.playlist = Some(playlist),
            Some(current) if current == playlist => (),
            Some(current) => panic!(
                "track {} belongs to playlist {}, cannot move it to {}",
                track, current, playlist
            ),
        }
    }

    pub fn track(&self, id: TrackId) -> &Track {
        self.tracks
            .get(&id)
            .expect(&format!("unknown track {}", id))
    }

    pub fn playlist(&self, id: PlaylistId) -> &Playlist {
        self.playlists
            .get(&id)
            .expect(&format!("unknown playlist {}", id))
    }
}

pub fn save_catalog(catalog: &Catalog, path: &Path) -> Result<(), std::io::Error> {
    let cbor_path = path.join(CATALOG_CBOR);
    let cbor_path_s = cbor_path.display().to_string();

    let cbor_file = File::options()
        .write(true)
        .truncate(true)
        .create(true)
        .open(cbor_path)
        .expect(&format!("Error while creating file {}", cbor_path_s));

    ciborium::ser::into_writer(catalog, BufWriter::new(cbor_file))
        .expect("Error saving the catalog");

    Ok(())
}

pub fn load_catalog(path: &Path) -> Catalog {
    let cbor_path = path.join(CATALOG_CBOR);
    let cbor_file = File::options()
        .read(true)
        .open(cbor_path)
        .expect("Error while opening the catalog file");

    ciborium::de::from_reader(BufReader::new(cbor_file)).expect("Error loading the catalog")
}
