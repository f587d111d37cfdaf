//! Unit tests for the move operators: gain accounting, feasibility
//! gates, inverse laws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cvrp_ls::local_search::cross_exchange::CrossExchange;
use cvrp_ls::local_search::exchange::Exchange;
use cvrp_ls::local_search::intra_or_opt::IntraOrOpt;
use cvrp_ls::local_search::operator::{Operator, SearchContext};
use cvrp_ls::local_search::or_opt::OrOpt;
use cvrp_ls::local_search::relocate::Relocate;
use cvrp_ls::local_search::reverse_two_opt::ReverseTwoOpt;
use cvrp_ls::local_search::two_opt::TwoOpt;
use cvrp_ls::solution::{solution_cost, RawSolution};
use cvrp_ls::solution_state::SolutionState;
use cvrp_ls::{Amount, Input, Job, Matrix, SkillSet, Vehicle};

/// Random asymmetric instance: `jobs` jobs over `jobs + 2` locations, two
/// round-trip vehicles based at locations 0 and 1.
fn random_input(rng: &mut StdRng, jobs: usize, capacity: i64) -> Input {
    let size = jobs + 2;
    let rows: Vec<Vec<u64>> = (0..size)
        .map(|i| {
            (0..size)
                .map(|j| if i == j { 0 } else { rng.gen_range(1..50) })
                .collect()
        })
        .collect();
    let matrix = Matrix::new(rows).unwrap();

    let jobs: Vec<Job> = (0..jobs)
        .map(|j| Job::new(j + 2, SkillSet::new(), Amount::new(vec![1])))
        .collect();
    let vehicles = vec![
        Vehicle::new(Some(0), Some(0), Amount::new(vec![capacity]), SkillSet::new()),
        Vehicle::new(Some(1), Some(1), Amount::new(vec![capacity]), SkillSet::new()),
    ];

    Input::new(matrix, jobs, vehicles).unwrap()
}

/// Check that a computed gain equals the cost difference realized by
/// applying the move. Returns the mutated solution when the move is
/// valid.
fn check_gain(input: &Input, sol: &RawSolution, op: &mut dyn Operator) -> Option<RawSolution> {
    let mut state = SolutionState::new(input);
    state.refresh(sol, input);

    let gain;
    {
        let ctx = SearchContext::new(input, sol, &state);
        if !op.is_valid(&ctx) {
            return None;
        }
        op.compute_gain(&ctx);
        gain = op.gain();
    }

    let mut mutated = sol.clone();
    op.apply(&mut mutated);

    let before = solution_cost(input, sol) as i64;
    let after = solution_cost(input, &mutated) as i64;
    assert_eq!(
        gain,
        before - after,
        "{} gain mismatch: stored {}, realized {}",
        op.name(),
        gain,
        before - after
    );

    Some(mutated)
}

#[test]
fn test_all_operator_gains_match_realized_cost_change() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..10 {
        let input = random_input(&mut rng, 8, 100);
        let sol: RawSolution = vec![vec![0, 1, 2, 3, 4], vec![5, 6, 7]];
        let (len1, len2) = (sol[0].len(), sol[1].len());

        for s in 0..len1 {
            for t in s + 1..len1 {
                check_gain(&input, &sol, &mut Exchange::new(0, s, t));
            }
        }
        for length in [2, 3] {
            for s in 0..=len1 - length {
                for t in 0..=len1 - length {
                    if t != s {
                        check_gain(&input, &sol, &mut IntraOrOpt::new(0, s, t, length));
                    }
                }
            }
        }
        for s in 0..len1 {
            for t in 0..len2 {
                check_gain(&input, &sol, &mut CrossExchange::new(0, s, 1, t));
            }
        }
        for s in 0..len1 {
            for t in 0..=len2 {
                check_gain(&input, &sol, &mut Relocate::new(0, s, 1, t));
            }
        }
        for length in [2, 3] {
            for s in 0..=len1 - length {
                for t in 0..=len2 {
                    check_gain(&input, &sol, &mut OrOpt::new(0, s, 1, t, length));
                }
            }
        }
        for s in 0..=len1 {
            for t in 0..=len2 {
                if s != len1 || t != len2 {
                    check_gain(&input, &sol, &mut TwoOpt::new(0, s, 1, t));
                }
            }
        }
        for s in 0..len1 {
            for t in 0..len2 {
                check_gain(&input, &sol, &mut ReverseTwoOpt::new(0, s, 1, t));
            }
        }
    }
}

#[test]
fn test_relocate_respects_capacity() {
    let mut rng = StdRng::seed_from_u64(11);
    // Capacity 3 and every amount 1: a vehicle already carrying three
    // jobs cannot take a fourth.
    let input = random_input(&mut rng, 6, 3);
    let sol: RawSolution = vec![vec![0, 1, 2], vec![3, 4, 5]];

    let mut state = SolutionState::new(&input);
    state.refresh(&sol, &input);
    let ctx = SearchContext::new(&input, &sol, &state);

    let relocate = Relocate::new(0, 0, 1, 0);
    assert!(!relocate.is_valid(&ctx));
}

#[test]
fn test_cross_exchange_respects_skills() {
    let matrix = Matrix::new(vec![
        vec![0, 4, 4, 4],
        vec![4, 0, 4, 4],
        vec![4, 4, 0, 4],
        vec![4, 4, 4, 0],
    ])
    .unwrap();

    let mut welding = SkillSet::with_capacity(1);
    welding.insert(0);

    let jobs = vec![
        Job::new(1, welding.clone(), Amount::new(vec![1])),
        Job::new(2, SkillSet::new(), Amount::new(vec![1])),
        Job::new(3, SkillSet::new(), Amount::new(vec![1])),
    ];
    let vehicles = vec![
        Vehicle::new(Some(0), Some(0), Amount::new(vec![5]), welding),
        Vehicle::new(Some(0), Some(0), Amount::new(vec![5]), SkillSet::new()),
    ];
    let input = Input::new(matrix, jobs, vehicles).unwrap();

    let sol: RawSolution = vec![vec![0, 1], vec![2]];
    let mut state = SolutionState::new(&input);
    state.refresh(&sol, &input);
    let ctx = SearchContext::new(&input, &sol, &state);

    // Moving the welding job onto the unskilled vehicle is rejected...
    assert!(!CrossExchange::new(0, 0, 1, 0).is_valid(&ctx));
    // ...while the unconstrained stop may swap freely.
    assert!(CrossExchange::new(0, 1, 1, 0).is_valid(&ctx));
}

#[test]
fn test_relocate_then_inverse_restores_solution() {
    let mut rng = StdRng::seed_from_u64(23);
    let input = random_input(&mut rng, 6, 100);
    let sol: RawSolution = vec![vec![0, 1, 2], vec![3, 4, 5]];
    let original_cost = solution_cost(&input, &sol);

    let moved = check_gain(&input, &sol, &mut Relocate::new(0, 1, 1, 2)).unwrap();
    let restored = check_gain(&input, &moved, &mut Relocate::new(1, 2, 0, 1)).unwrap();

    assert_eq!(restored, sol);
    assert_eq!(solution_cost(&input, &restored), original_cost);
}

#[test]
fn test_exchange_is_self_inverse() {
    let mut rng = StdRng::seed_from_u64(29);
    let input = random_input(&mut rng, 5, 100);
    let sol: RawSolution = vec![vec![0, 1, 2, 3, 4], Vec::new()];

    let swapped = check_gain(&input, &sol, &mut Exchange::new(0, 1, 3)).unwrap();
    let restored = check_gain(&input, &swapped, &mut Exchange::new(0, 1, 3)).unwrap();

    assert_eq!(restored, sol);
}

#[test]
fn test_two_opt_is_self_inverse_at_same_cuts() {
    let mut rng = StdRng::seed_from_u64(31);
    let input = random_input(&mut rng, 7, 100);
    let sol: RawSolution = vec![vec![0, 1, 2, 3], vec![4, 5, 6]];

    let swapped = check_gain(&input, &sol, &mut TwoOpt::new(0, 2, 1, 1)).unwrap();
    let restored = check_gain(&input, &swapped, &mut TwoOpt::new(0, 2, 1, 1)).unwrap();

    assert_eq!(restored, sol);
}

#[test]
fn test_two_opt_between_empty_routes_has_zero_gain() {
    let mut rng = StdRng::seed_from_u64(37);
    let input = random_input(&mut rng, 2, 100);
    let sol: RawSolution = vec![Vec::new(), Vec::new()];

    let mut state = SolutionState::new(&input);
    state.refresh(&sol, &input);
    let ctx = SearchContext::new(&input, &sol, &state);

    let mut op = TwoOpt::new(0, 0, 1, 0);
    assert!(op.is_valid(&ctx));
    op.compute_gain(&ctx);
    assert_eq!(op.gain(), 0);
}

#[test]
fn test_or_opt_moves_whole_chain() {
    let mut rng = StdRng::seed_from_u64(41);
    let input = random_input(&mut rng, 6, 100);
    let sol: RawSolution = vec![vec![0, 1, 2, 3], vec![4, 5]];

    let mut op = OrOpt::new(0, 1, 1, 1, 2);
    let moved = check_gain(&input, &sol, &mut op).unwrap();

    assert_eq!(moved[0], vec![0, 3]);
    assert_eq!(moved[1], vec![4, 1, 2, 5]);
}

#[test]
fn test_reverse_two_opt_reverses_both_pieces() {
    let mut rng = StdRng::seed_from_u64(43);
    let input = random_input(&mut rng, 7, 100);
    let sol: RawSolution = vec![vec![0, 1, 2, 3], vec![4, 5, 6]];

    let mut op = ReverseTwoOpt::new(0, 1, 1, 1);
    let moved = check_gain(&input, &sol, &mut op).unwrap();

    // Source keeps [0, 1] and gains the reversed target head [5, 4];
    // target becomes the reversed source tail [3, 2] plus its own [6].
    assert_eq!(moved[0], vec![0, 1, 5, 4]);
    assert_eq!(moved[1], vec![3, 2, 6]);
}
