//! Basic example of running the CVRP local-search engine.

use cvrp_ls::{Amount, Config, Input, Job, LocalSearch, Matrix, SkillSet, Vehicle};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Ten jobs on a 5 x 2 grid, one depot at the origin, Manhattan costs.
    let mut locations = vec![(0i64, 0i64)];
    for row in 0..2 {
        for col in 0..5 {
            locations.push((10 * (col + 1), 10 * row));
        }
    }

    let rows: Vec<Vec<u64>> = locations
        .iter()
        .map(|&(x1, y1)| {
            locations
                .iter()
                .map(|&(x2, y2)| ((x1 - x2).abs() + (y1 - y2).abs()) as u64)
                .collect()
        })
        .collect();
    let matrix = Matrix::new(rows)?;

    let jobs: Vec<Job> = (1..=10)
        .map(|index| Job::new(index, SkillSet::new(), Amount::new(vec![1])))
        .collect();

    // Three vehicles based at the depot, each with room for four jobs.
    let vehicles: Vec<Vehicle> = (0..3)
        .map(|_| Vehicle::new(Some(0), Some(0), Amount::new(vec![4]), SkillSet::new()))
        .collect();

    let input = Input::new(matrix, jobs, vehicles)?;

    // Start from an empty assignment and let the engine build and refine
    // the routes.
    let mut solution = vec![Vec::new(); 3];
    let mut engine = LocalSearch::new(&input, &mut solution, Config::new())?;

    engine.set_log_callback(Box::new(|event| {
        println!(
            "step {:>3}  {:<16} gain {:>6}  cost {:>6}",
            event.iteration, event.operator_name, event.gain, event.new_cost
        );
    }));

    engine.run();
    let indicators = engine.indicators();
    drop(engine);

    println!();
    println!("unassigned: {}", indicators.unassigned);
    println!("total cost: {}", indicators.cost);
    println!("vehicles used: {}", indicators.used_vehicles);
    for (v, route) in solution.iter().enumerate() {
        println!("route {}: {:?}", v, route);
    }

    Ok(())
}
