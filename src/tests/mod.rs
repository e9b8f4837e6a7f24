#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::base::{Mood, MoodScore, PlayCount, PlaylistId, RankedTrack, Track, TrackId};
    use crate::blend::{Blend, BlendLimits};
    use crate::catalog::Catalog;

    /// Initialize the logger
    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn track(id: TrackId, name: &str, plays: PlayCount, moods: [MoodScore; 3]) -> Track {
        Track {
            id,
            name: Arc::from(name),
            plays,
            moods,
            playlist: None,
        }
    }

    fn catalog_of(tracks: Vec<Track>, assignments: &[(TrackId, PlaylistId)]) -> Catalog {
        let mut catalog = Catalog::new();
        for track in tracks {
            catalog.add_track(track);
        }
        for &(track, playlist) in assignments {
            catalog.assign(track, playlist);
        }
        catalog
    }

    fn limits(per_playlist: usize, capacities: [usize; 3]) -> BlendLimits {
        BlendLimits {
            per_playlist,
            capacities,
        }
    }

    #[test]
    fn test_ranked_order() {
        let entry = |track, name: &str, score| RankedTrack {
            track,
            playlist: 1,
            score,
            name: Arc::from(name),
        };

        // Higher score wins
        assert!(entry(4, "zzz", 60) > entry(1, "alpha", 50));
        // Equal scores: the smaller name wins
        assert!(entry(1, "alpha", 50) > entry(2, "beta", 50));
        // Equal scores and names: the smaller id wins
        assert!(entry(1, "alpha", 50) > entry(3, "alpha", 50));
        assert!(entry(1, "alpha", 50) == entry(1, "alpha", 50));
    }

    #[test]
    fn test_initial_fill_and_ask() {
        init_logger();
        let mut catalog = catalog_of(
            vec![
                track(1, "amber", 100, [50, 5, 5]),
                track(2, "beryl", 90, [40, 6, 50]),
                track(3, "coral", 80, [30, 7, 40]),
                track(4, "dune", 70, [20, 8, 30]),
            ],
            &[(1, 1), (2, 1), (3, 2), (4, 2)],
        );
        let blend = Blend::new(&mut catalog, &limits(1, [1, 2, 2]));

        assert!(blend.members(Mood::Heartache).contains(&1));
        assert_eq!(blend.members(Mood::Heartache).len(), 1);

        // One slot per playlist: the runner-up of playlist 2 stays out
        assert!(blend.members(Mood::RoadTrip).contains(&4));
        assert!(blend.members(Mood::RoadTrip).contains(&2));
        assert_eq!(blend.members(Mood::RoadTrip).len(), 2);

        assert!(blend.members(Mood::Blissful).contains(&2));
        assert!(blend.members(Mood::Blissful).contains(&3));

        // The union is deduplicated and ordered by play counts
        assert_eq!(blend.ask(&catalog), vec![1, 2, 3, 4]);
        blend.validate(&catalog);
    }

    #[test]
    fn test_same_playlist_displacement() {
        init_logger();
        let mut catalog = catalog_of(
            vec![
                track(1, "weak", 10, [10, 10, 10]),
                track(2, "strong", 20, [20, 20, 20]),
            ],
            &[(1, 1)],
        );
        let mut blend = Blend::new(&mut catalog, &limits(1, [1, 1, 1]));
        assert!(blend.members(Mood::Heartache).contains(&1));

        let delta = blend.add(&mut catalog, 2, 1);
        for mood in Mood::ALL {
            assert_eq!(delta.added[mood.index()], Some(2));
            assert_eq!(delta.removed[mood.index()], Some(1));
            assert!(blend.members(mood).contains(&2));
            // The quota slot never left the playlist
            assert_eq!(catalog.playlist(1).granted(mood), 1);
        }
        blend.validate(&catalog);
    }

    #[test]
    fn test_quota_transfer() {
        init_logger();
        let mut catalog = catalog_of(
            vec![
                track(1, "weak", 10, [10, 10, 10]),
                track(2, "strong", 20, [20, 20, 20]),
            ],
            &[(1, 1)],
        );
        let mut blend = Blend::new(&mut catalog, &limits(1, [1, 1, 1]));

        let delta = blend.add(&mut catalog, 2, 2);
        for mood in Mood::ALL {
            assert_eq!(delta.added[mood.index()], Some(2));
            assert_eq!(delta.removed[mood.index()], Some(1));
            assert_eq!(catalog.playlist(1).granted(mood), 0);
            assert_eq!(catalog.playlist(2).granted(mood), 1);
        }
        blend.validate(&catalog);
    }

    #[test]
    fn test_out_of_quota_keeps_global_weakest() {
        init_logger();
        let mut catalog = catalog_of(
            vec![
                track(1, "alpha", 40, [30, 30, 30]),
                track(2, "beta", 30, [20, 20, 20]),
                track(3, "coral", 20, [10, 10, 10]),
                track(4, "delta", 10, [40, 40, 40]),
            ],
            &[(1, 1), (3, 2)],
        );
        let mut blend = Blend::new(&mut catalog, &limits(1, [2, 2, 2]));
        assert!(blend.members(Mood::Heartache).contains(&1));
        assert!(blend.members(Mood::Heartache).contains(&3));

        // Track 2 beats the global weakest but its playlist is out of quota
        // and it does not beat its own playlist's incumbent
        let delta = blend.add(&mut catalog, 2, 1);
        for mood in Mood::ALL {
            assert_eq!(delta.added[mood.index()], None);
            assert_eq!(delta.removed[mood.index()], None);
        }
        blend.validate(&catalog);

        // Track 4 does beat the incumbent of its playlist; the global
        // weakest still keeps its seat
        let delta = blend.add(&mut catalog, 4, 1);
        for mood in Mood::ALL {
            assert_eq!(delta.added[mood.index()], Some(4));
            assert_eq!(delta.removed[mood.index()], Some(1));
            assert!(blend.members(mood).contains(&3));
        }
        blend.validate(&catalog);
    }

    #[test]
    fn test_refill_blocked_by_quota() {
        init_logger();
        let mut catalog = catalog_of(
            vec![
                track(1, "alpha", 40, [30, 30, 30]),
                track(2, "beta", 30, [20, 20, 20]),
                track(3, "coral", 20, [10, 10, 10]),
            ],
            &[(1, 1), (2, 1), (3, 2)],
        );
        let mut blend = Blend::new(&mut catalog, &limits(1, [2, 2, 2]));
        assert!(blend.members(Mood::Heartache).contains(&1));
        assert!(blend.members(Mood::Heartache).contains(&3));

        // The freed slot stays empty: the only candidate is out of quota
        let delta = blend.remove(&mut catalog, 3);
        for mood in Mood::ALL {
            assert_eq!(delta.removed[mood.index()], Some(3));
            assert_eq!(delta.added[mood.index()], None);
        }
        blend.validate(&catalog);

        // Its quota slot freed, playlist 1 finally places its second track
        let delta = blend.remove(&mut catalog, 1);
        for mood in Mood::ALL {
            assert_eq!(delta.removed[mood.index()], Some(1));
            assert_eq!(delta.added[mood.index()], Some(2));
        }
        assert_eq!(blend.ask(&catalog), vec![2]);
        blend.validate(&catalog);
    }

    #[test]
    fn test_zero_capacity_mood() {
        init_logger();
        let mut catalog = catalog_of(
            vec![track(1, "amber", 100, [50, 50, 50])],
            &[(1, 1)],
        );
        let blend = Blend::new(&mut catalog, &limits(1, [0, 1, 1]));

        assert!(blend.members(Mood::Heartache).is_empty());
        assert!(blend.members(Mood::RoadTrip).contains(&1));
        assert_eq!(blend.ask(&catalog), vec![1]);
        blend.validate(&catalog);
    }

    #[test]
    fn test_ask_breaks_play_count_ties_by_name() {
        init_logger();
        let mut catalog = catalog_of(
            vec![
                track(1, "c", 3, [10, 10, 10]),
                track(2, "b", 10, [20, 20, 20]),
                track(3, "a", 10, [30, 30, 30]),
            ],
            &[(1, 1), (2, 1), (3, 1)],
        );
        let blend = Blend::new(&mut catalog, &limits(3, [3, 3, 3]));

        assert_eq!(blend.ask(&catalog), vec![3, 2, 1]);
        blend.validate(&catalog);
    }

    #[test]
    fn test_name_breaks_score_ties_in_selection() {
        init_logger();
        let mut catalog = catalog_of(
            vec![
                track(1, "beta", 5, [50, 50, 50]),
                track(2, "alpha", 5, [50, 50, 50]),
            ],
            &[(1, 1), (2, 1)],
        );
        let blend = Blend::new(&mut catalog, &limits(2, [1, 1, 1]));

        for mood in Mood::ALL {
            assert!(blend.members(mood).contains(&2));
            assert_eq!(blend.members(mood).len(), 1);
        }
        blend.validate(&catalog);
    }

    #[test]
    #[should_panic(expected = "already part of the blend")]
    fn test_double_add_panics() {
        let mut catalog = catalog_of(vec![track(1, "amber", 1, [1, 1, 1])], &[(1, 1)]);
        let mut blend = Blend::new(&mut catalog, &limits(1, [1, 1, 1]));
        blend.add(&mut catalog, 1, 1);
    }

    #[test]
    #[should_panic(expected = "not part of the blend")]
    fn test_remove_absent_panics() {
        let mut catalog = catalog_of(
            vec![track(1, "amber", 1, [1, 1, 1]), track(2, "beryl", 1, [1, 1, 1])],
            &[(1, 1)],
        );
        let mut blend = Blend::new(&mut catalog, &limits(1, [1, 1, 1]));
        blend.remove(&mut catalog, 2);
    }
}
