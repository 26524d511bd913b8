/// Walker alias table for O(1) sampling of a discrete distribution.
pub struct AliasTable {
    props: Vec<f32>,
    u: Vec<f32>,
    k: Vec<usize>,
}

impl AliasTable {
    /// `weights` need not be normalized but must contain at least one positive entry.
    pub fn new(weights: &[f32]) -> Self {
        let n = weights.len();
        let sum: f32 = weights.iter().sum();
        let props: Vec<f32> = weights.iter().map(|w| *w / sum).collect();

        let mut u: Vec<f32> = props.iter().map(|prop| *prop * n as f32).collect();
        let mut k: Vec<usize> = (0..n).collect();

        let mut poor: Vec<usize> = (0..n).filter(|i| u[*i] < 1.0).collect();
        let mut rich: Vec<usize> = (0..n).filter(|i| u[*i] >= 1.0).collect();
        while !poor.is_empty() && !rich.is_empty() {
            let (p, r) = match (poor.pop(), rich.pop()) {
                (Some(p), Some(r)) => (p, r),
                _ => break,
            };
            k[p] = r;
            u[r] -= 1.0 - u[p];
            if u[r] < 1.0 {
                poor.push(r);
            } else {
                rich.push(r);
            }
        }
        // leftovers only differ from 1 by rounding
        for i in poor.into_iter().chain(rich) {
            u[i] = 1.0;
        }

        Self { props, u, k }
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Maps a uniform `rand` in [0, 1) to (index, probability of index).
    pub fn sample(&self, rand: f32) -> (usize, f32) {
        let temp = rand * self.props.len() as f32;
        let x = (temp as usize).min(self.props.len() - 1);
        let y = temp - x as f32;
        if y < self.u[x] {
            (x, self.props[x])
        } else {
            (self.k[x], self.props[self.k[x]])
        }
    }

    pub fn probability(&self, index: usize) -> f32 {
        self.props[index]
    }
}
