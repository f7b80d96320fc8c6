//! The histogram result: buckets keyed by their lower bound, in ascending
//! bucket order.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Smallest value the bucket can hold.
    pub label: f64,
    pub count: u64,
}

impl Bucket {
    fn new(label: f64, count: u64) -> Self {
        Self { label, count }
    }
}

impl From<(f64, u64)> for Bucket {
    fn from((label, count): (f64, u64)) -> Self {
        Self::new(label, count)
    }
}

/// An ordered mapping from bucket label to frequency.
///
/// Float labels can't be hashed, so the mapping is kept as a list in
/// insertion order, which is ascending bucket index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    buckets: Vec<Bucket>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, label: f64, count: u64) {
        self.buckets.push(Bucket::new(label, count));
    }

    /// Frequency of the bucket labelled exactly `label`.
    pub fn get(&self, label: f64) -> Option<u64> {
        self.buckets
            .iter()
            .find(|b| b.label == label)
            .map(|b| b.count)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bucket> {
        self.buckets.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = f64> + '_ {
        self.buckets.iter().map(|b| b.label)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Rows counted across all buckets.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// `(label, count)` pairs in bucket order.
    pub fn to_pairs(&self) -> Vec<(f64, u64)> {
        self.buckets.iter().map(|b| (b.label, b.count)).collect()
    }
}

impl FromIterator<(f64, u64)> for Histogram {
    fn from_iter<T: IntoIterator<Item = (f64, u64)>>(iter: T) -> Self {
        Self {
            buckets: iter.into_iter().map(Bucket::from).collect(),
        }
    }
}

impl IntoIterator for Histogram {
    type Item = Bucket;
    type IntoIter = std::vec::IntoIter<Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

impl<'a> IntoIterator for &'a Histogram {
    type Item = &'a Bucket;
    type IntoIter = std::slice::Iter<'a, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}
