//! Lazy k-combination generators.
//!
//! [`Combinations`] enumerates the k-subsets of `0..n` in lexicographic order
//! without materializing them; [`Subsets`] chains the sizes `1..=n` so that
//! inclusion-exclusion can stop after any number of terms.

/// All k-combinations of `0..n`, lexicographically.
///
/// ```
/// use fta_rs::combination::Combinations;
///
/// let all: Vec<_> = Combinations::new(4, 2).collect();
/// assert_eq!(all.len(), 6);
/// assert_eq!(all[0], vec![0, 1]);
/// assert_eq!(all[5], vec![2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            exhausted: k > n,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.indices.len()
    }

    /// Rewinds the generator to the first combination.
    pub fn restart(&mut self) {
        let k = self.k();
        for (i, x) in self.indices.iter_mut().enumerate() {
            *x = i;
        }
        self.started = false;
        self.exhausted = k > self.n;
    }

    /// Advances `indices` to the next combination in place.
    fn advance(&mut self) -> bool {
        let k = self.k();
        // Rightmost position that can still be incremented.
        let Some(i) = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) else {
            return false;
        };
        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        true
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
        } else if !self.advance() {
            self.exhausted = true;
            return None;
        }
        Some(self.indices.clone())
    }
}

/// Every non-empty subset of `0..n`, by increasing size.
#[derive(Debug, Clone)]
pub struct Subsets {
    n: usize,
    current: Combinations,
}

impl Subsets {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            current: Combinations::new(n, 1),
        }
    }
}

impl Iterator for Subsets {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(c) = self.current.next() {
                return Some(c);
            }
            let k = self.current.k() + 1;
            if k > self.n {
                return None;
            }
            self.current = Combinations::new(self.n, k);
        }
    }
}

/// Binomial coefficient, saturating at `usize::MAX`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: usize = 1;
    for i in 0..k {
        match result.checked_mul(n - i) {
            Some(r) => result = r / (i + 1),
            None => return usize::MAX,
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_combinations_3_of_5() {
        let all: Vec<_> = Combinations::new(5, 3).collect();
        assert_eq!(all.len(), 10);
        assert_eq!(all.first(), Some(&vec![0, 1, 2]));
        assert_eq!(all.last(), Some(&vec![2, 3, 4]));
        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(all, sorted);
    }

    #[test]
    fn test_combinations_edge_cases() {
        assert_eq!(Combinations::new(3, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        assert_eq!(Combinations::new(3, 3).collect::<Vec<_>>(), vec![vec![0, 1, 2]]);
        assert_eq!(Combinations::new(2, 3).count(), 0);
        assert_eq!(Combinations::new(0, 0).count(), 1);
    }

    #[test]
    fn test_restart() {
        let mut c = Combinations::new(4, 2);
        assert_eq!(c.next(), Some(vec![0, 1]));
        assert_eq!(c.next(), Some(vec![0, 2]));
        c.restart();
        assert_eq!(c.next(), Some(vec![0, 1]));
        assert_eq!(c.count(), 5);
    }

    #[test]
    fn test_subsets_by_size() {
        let all: Vec<_> = Subsets::new(3).collect();
        assert_eq!(
            all,
            vec![
                vec![0],
                vec![1],
                vec![2],
                vec![0, 1],
                vec![0, 2],
                vec![1, 2],
                vec![0, 1, 2],
            ]
        );
        assert_eq!(Subsets::new(0).count(), 0);
        assert_eq!(Subsets::new(10).count(), (1 << 10) - 1);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(10, 0), 1);
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(binomial(52, 5), 2_598_960);
        for n in 0..12 {
            for k in 0..=n {
                assert_eq!(binomial(n, k), Combinations::new(n, k).count());
            }
        }
    }
}
