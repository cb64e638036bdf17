use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use crate::bucket::Bucket;

/// Key used for the grand total in flattened count maps.
pub const TOTAL_KEY: &str = "TOTAL";

/// Per-bucket row counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketCounts {
    counts: [usize; Bucket::COUNT],
    total: usize,
}

impl BucketCounts {
    pub fn record(&mut self, bucket: Bucket) {
        self.counts[bucket.index()] += 1;
        self.total += 1;
    }

    pub fn get(&self, bucket: Bucket) -> usize {
        self.counts[bucket.index()]
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Non-empty buckets in canonical order.
    pub fn non_empty(&self) -> impl Iterator<Item = (Bucket, usize)> + '_ {
        Bucket::ALL
            .into_iter()
            .map(|bucket| (bucket, self.get(bucket)))
            .filter(|(_, count)| *count > 0)
    }

    /// Bucket label to count, plus [`TOTAL_KEY`].
    pub fn to_map(&self) -> BTreeMap<String, usize> {
        let mut map: BTreeMap<String, usize> = self
            .non_empty()
            .map(|(bucket, count)| (bucket.label().to_string(), count))
            .collect();
        map.insert(TOTAL_KEY.to_string(), self.total);
        map
    }
}

impl FromIterator<Bucket> for BucketCounts {
    fn from_iter<I: IntoIterator<Item = Bucket>>(iter: I) -> Self {
        let mut counts = BucketCounts::default();
        for bucket in iter {
            counts.record(bucket);
        }
        counts
    }
}

impl Serialize for BucketCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (bucket, count) in self.non_empty() {
            map.serialize_entry(bucket.label(), &count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sum_to_total() {
        let counts: BucketCounts = [
            Bucket::AsciiCn,
            Bucket::ComCn,
            Bucket::AsciiCn,
            Bucket::Unclassified,
        ]
        .into_iter()
        .collect();

        let sum: usize = counts.non_empty().map(|(_, count)| count).sum();
        assert_eq!(sum, counts.total());
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.get(Bucket::AsciiCn), 2);
        assert_eq!(counts.get(Bucket::IdnIdn), 0);
    }

    #[test]
    fn non_empty_follows_canonical_order() {
        let counts: BucketCounts = [Bucket::Unclassified, Bucket::OrgCn, Bucket::IdnIdn]
            .into_iter()
            .collect();
        let order: Vec<Bucket> = counts.non_empty().map(|(bucket, _)| bucket).collect();
        assert_eq!(
            order,
            vec![Bucket::IdnIdn, Bucket::OrgCn, Bucket::Unclassified]
        );
    }

    #[test]
    fn map_carries_total() {
        let counts: BucketCounts = [Bucket::NetCn, Bucket::NetCn].into_iter().collect();
        let map = counts.to_map();
        assert_eq!(map.get(".NET.CN"), Some(&2));
        assert_eq!(map.get(TOTAL_KEY), Some(&2));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn serializes_non_empty_buckets_only() {
        let counts: BucketCounts = [Bucket::IdnCn].into_iter().collect();
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"IDN.CN":1}"#);
    }
}
