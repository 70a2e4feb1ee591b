use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Resample budget for finding two distinct parents for one crossover slot
pub const MAX_PAIR_ATTEMPTS: usize = 100;

/// Crossover parent pool built from a fitness ranking.
///
/// Holds population indices of the top `best` and bottom `worst` ranked genomes.
/// Low performers are included on purpose to keep diversity in the next generation.
pub struct GenePool {
    members: Vec<usize>,
    dist: Option<Uniform<usize>>,
}

impl GenePool {
    /// `ranking` lists population indices ordered by fitness, best first
    pub fn new(ranking: &[usize], best: usize, worst: usize) -> Self {
        let best = best.min(ranking.len());
        let worst = worst.min(ranking.len());

        let mut members = ranking[..best].to_vec();
        members.extend(ranking.iter().rev().take(worst));

        let dist = Uniform::new(0, members.len()).ok();
        Self { members, dist }
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Draw two distinct population indices, or `None` if none turned up within the attempt budget
    pub fn pick_pair<R: Rng>(&self, rng: &mut R) -> Option<(usize, usize)> {
        let dist = self.dist.as_ref()?;

        for _ in 0..MAX_PAIR_ATTEMPTS {
            let a = self.members[dist.sample(rng)];
            let b = self.members[dist.sample(rng)];
            if a != b {
                return Some((a, b));
            }
        }

        None
    }
}
