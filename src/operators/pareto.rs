//! Pareto utilities
//!
//! Non-dominated sorting and crowding distance (Deb et al., 2002), shared by NSGA-II
//! replacement and the Pareto archivers.

use std::cmp::Ordering;

use crate::error::EvoResult;
use crate::population::individual::Individual;

/// Fast non-dominated sorting
///
/// Returns fronts of indices into `individuals`; front 0 holds the non-dominated ones,
/// front `k + 1` those dominated only by members of fronts `0..=k`.
pub fn fast_non_dominated_sort<C>(individuals: &[Individual<C>]) -> EvoResult<Vec<Vec<usize>>> {
    let n = individuals.len();
    if n == 0 {
        return Ok(vec![]);
    }

    // domination_count[i] = number of individuals that dominate i
    let mut domination_count = vec![0usize; n];
    // dominated_set[i] = individuals that i dominates
    let mut dominated_set: Vec<Vec<usize>> = vec![vec![]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            match individuals[i].compare(&individuals[j])? {
                Some(Ordering::Greater) => {
                    dominated_set[i].push(j);
                    domination_count[j] += 1;
                }
                Some(Ordering::Less) => {
                    dominated_set[j].push(i);
                    domination_count[i] += 1;
                }
                _ => {}
            }
        }
    }

    let mut fronts: Vec<Vec<usize>> = vec![];
    let mut current_front: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    while !current_front.is_empty() {
        let mut next_front = vec![];
        for &i in &current_front {
            for &j in &dominated_set[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next_front.push(j);
                }
            }
        }
        next_front.sort_unstable();

        fronts.push(current_front);
        current_front = next_front;
    }

    Ok(fronts)
}

/// Crowding distance of each member of `front`, in front order
///
/// Per objective, each interior member accumulates the normalized distance between its
/// two neighbours; boundary members get infinity.
pub fn crowding_distance<C>(individuals: &[Individual<C>], front: &[usize]) -> EvoResult<Vec<f64>> {
    let n = front.len();
    if n <= 2 {
        return Ok(vec![f64::INFINITY; n]);
    }

    let objectives = front
        .iter()
        .map(|&i| individuals[i].fitness().map(|f| f.objectives()))
        .collect::<EvoResult<Vec<&[f64]>>>()?;
    let num_objectives = objectives[0].len();
    let mut distance = vec![0.0; n];

    for obj in 0..num_objectives {
        let mut sorted: Vec<usize> = (0..n).collect();
        sorted.sort_by(|&a, &b| objectives[a][obj].total_cmp(&objectives[b][obj]));

        distance[sorted[0]] = f64::INFINITY;
        distance[sorted[n - 1]] = f64::INFINITY;

        let obj_min = objectives[sorted[0]][obj];
        let obj_max = objectives[sorted[n - 1]][obj];
        let obj_range = obj_max - obj_min;

        if obj_range > 0.0 {
            for k in 1..(n - 1) {
                let prev_val = objectives[sorted[k - 1]][obj];
                let next_val = objectives[sorted[k + 1]][obj];
                distance[sorted[k]] += (next_val - prev_val) / obj_range;
            }
        }
    }

    Ok(distance)
}
