//! Mid-rank tie-aware ranking, shared by the nonparametric tests.

/// Assign ranks 1..n by ascending value; tied values receive the average of
/// the ranks their block spans (three-way tie for positions 4, 5, 6 all get
/// rank 5). Ranks come back in input positions. Assignment is stable under
/// equal keys.
#[must_use]
pub fn rank_with_ties(data: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut ranks = vec![0.0; data.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        #[allow(clippy::float_cmp)]
        while j + 1 < order.len() && data[order[j]] == data[order[j + 1]] {
            j += 1;
        }
        // Ranks i+1..=j+1 average to (i + j) / 2 + 1.
        #[allow(clippy::cast_precision_loss)]
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}
