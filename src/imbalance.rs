// This file has code from https://github.com/LIHPC-Computational-Geometry/coupe (See NOTICE.md)
use num_traits::ToPrimitive;

/// Total vertex weight held by each part. Part ids at or above `num_parts` are ignored.
pub fn compute_parts_load<W>(part_ids: &[usize], num_parts: usize, weights: &[W]) -> Vec<f64>
where
    W: ToPrimitive,
{
    let mut loads = vec![0.0; num_parts];

    for (&part, weight) in part_ids.iter().zip(weights) {
        if part < num_parts {
            loads[part] += weight.to_f64().unwrap_or(0.0);
        }
    }

    loads
}

/// Largest relative deviation of a part load above the ideal load `total / num_parts`.
pub fn compute_imbalance_from_part_loads(part_loads: &[f64]) -> f64 {
    if part_loads.is_empty() {
        return 0.0;
    }

    let total_weight: f64 = part_loads.iter().sum();
    let ideal_part_weight = total_weight / part_loads.len() as f64;
    if ideal_part_weight == 0.0 {
        return 0.0;
    }

    part_loads
        .iter()
        .map(|part_weight| (part_weight - ideal_part_weight) / ideal_part_weight)
        .fold(0.0f64, |acc, deviation| acc.max(deviation))
}

/// Imbalance of a partition, 0 when every part carries the same weight.
pub fn imbalance<W>(num_parts: usize, part_ids: &[usize], weights: &[W]) -> f64
where
    W: ToPrimitive,
{
    if num_parts == 0 {
        return 0.0;
    }

    let part_loads = compute_parts_load(part_ids, num_parts, weights);

    compute_imbalance_from_part_loads(&part_loads)
}

/// Imbalance of a partition where every vertex weighs one.
pub fn unit_imbalance(num_parts: usize, part_ids: &[usize]) -> f64 {
    imbalance(num_parts, part_ids, &vec![1u32; part_ids.len()])
}
