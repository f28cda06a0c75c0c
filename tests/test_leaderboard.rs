use rand::Rng;
use skip_index::leaderboard::{Leaderboard, ScoreKey};
use skip_index::skiplist::IndexConfig;
use skip_index::Error;
use std::collections::BTreeMap;

const NUM_OF_OPERATIONS: usize = 10_000;

#[test]
fn int_test_leaderboard() {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let config = IndexConfig {
        seed: Some([2, 3, 5, 7]),
        ..IndexConfig::default()
    };
    let mut board = Leaderboard::with_config(&config).unwrap();
    let mut expected: BTreeMap<String, u32> = BTreeMap::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let name = format!("player{}", rng.gen_range(0, 500));
        let score = rng.gen_range(0, 1000);

        match rng.gen_range(0, 3) {
            0 => {
                let result = board.add_player(&name, score);
                if expected.contains_key(&name) {
                    assert_eq!(result, Err(Error::DuplicatePlayer(name.clone())));
                } else {
                    assert_eq!(result, Ok(()));
                    expected.insert(name.clone(), score);
                }
            },
            1 => match expected.remove(&name) {
                Some(old) => assert_eq!(board.remove_player(&name), Ok(old)),
                None => assert!(board.remove_player(&name).is_err()),
            },
            _ => match expected.get_mut(&name) {
                Some(old) => {
                    assert_eq!(board.update_score(&name, score), Ok(*old));
                    *old = score;
                },
                None => assert!(board.update_score(&name, score).is_err()),
            },
        }

        assert_eq!(board.score(&name), expected.get(&name).cloned());
        assert_eq!(board.len(), expected.len());
    }

    let mut standings: Vec<ScoreKey> = expected
        .iter()
        .map(|(name, score)| ScoreKey::new(name.as_str(), *score))
        .collect();
    standings.sort();

    assert_eq!(board.iter().cloned().collect::<Vec<ScoreKey>>(), standings);

    let top: Vec<ScoreKey> = board.top(10).into_iter().cloned().collect();
    let expected_top: Vec<ScoreKey> = standings.iter().rev().take(10).cloned().collect();
    assert_eq!(top, expected_top);

    for (position, standing) in standings.iter().enumerate() {
        assert_eq!(board.rank(&standing.name), Some(standings.len() - position));
    }
}
