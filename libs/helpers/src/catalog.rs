use std::sync::Arc;

use rand::{rngs::StdRng, Rng};
use rand_distr::{Distribution, LogNormal, Uniform};

use blend_index::base::{PlaylistId, Track, TrackId};
use blend_index::catalog::Catalog;

pub struct TestCatalog {
    pub catalog: Catalog,
    /// Home playlist of every track; re-adds must reuse it
    pub assignments: Vec<(TrackId, PlaylistId)>,
    /// How many of the assignments were applied up front
    pub seeded: usize,
}

/// Generates a random catalog: log-normal play counts, uniform mood scores,
/// short lowercase names (collisions welcome, they exercise the
/// tie-breaking), and a random home playlist per track. The first `seeded`
/// tracks are assigned before the blend is built, the rest arrive as events.
pub fn create_catalog(
    track_count: usize,
    playlist_count: usize,
    seeded: usize,
    rng: &mut StdRng,
) -> TestCatalog {
    let plays = LogNormal::new(8., 2.).unwrap();
    let scores = Uniform::new_inclusive(0u32, 100);
    let name_lengths = Uniform::new_inclusive(3usize, 6);

    let mut catalog = Catalog::new();
    for playlist in 1..=playlist_count {
        catalog.ensure_playlist(playlist as PlaylistId);
    }

    let mut assignments = Vec::with_capacity(track_count);
    for ix in 0..track_count {
        let id = (ix + 1) as TrackId;
        let name: String = (0..name_lengths.sample(rng))
            .map(|_| char::from(b'a' + rng.gen_range(0u8..26)))
            .collect();
        catalog.add_track(Track {
            id,
            name: Arc::from(name),
            plays: plays.sample(rng) as u64,
            moods: [scores.sample(rng), scores.sample(rng), scores.sample(rng)],
            playlist: None,
        });
        assignments.push((id, rng.gen_range(1..=playlist_count) as PlaylistId));
    }

    for &(track, playlist) in assignments.iter().take(seeded) {
        catalog.assign(track, playlist);
    }

    TestCatalog {
        catalog,
        assignments,
        seeded,
    }
}

/// Sanity check for the generator itself
pub fn count_assigned(catalog: &Catalog) -> usize {
    catalog
        .tracks
        .values()
        .filter(|track| track.playlist.is_some())
        .count()
}
