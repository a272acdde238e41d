// src/pipeline/aggregate.rs

//! Merge and staleness filtering.
//!
//! ## Conflict policy
//!
//! When two sources report the same identity key, the record with more
//! populated fields wins. Ties go to the record whose SHA-256 fingerprint
//! (over its JSON form) is smaller, so the merge does not depend on the
//! order fetchers finished in.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::models::{FilterConfig, Item, Repository};

/// SHA-256 of the record's JSON form, hex encoded.
pub fn fingerprint<T: Item>(item: &T) -> String {
    let bytes = serde_json::to_vec(item).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

/// Whether `candidate` should replace `current` for the same key.
fn prefer<T: Item>(candidate: &T, current: &T) -> bool {
    match candidate.completeness().cmp(&current.completeness()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => fingerprint(candidate) < fingerprint(current),
    }
}

/// Merge per-source batches into one collection with unique keys, sorted
/// by identity key.
pub fn merge<T: Item>(batches: Vec<Vec<T>>) -> Vec<T> {
    let mut by_key: BTreeMap<String, T> = BTreeMap::new();
    for item in batches.into_iter().flatten() {
        let key = item.identity_key();
        let replace = by_key
            .get(&key)
            .is_none_or(|current| prefer(&item, current));
        if replace {
            by_key.insert(key, item);
        }
    }
    by_key.into_values().collect()
}

/// Items that can be dropped for being stale.
pub trait Freshness: Item {
    fn is_fresh(&self, criteria: &FilterConfig, now: DateTime<Utc>) -> bool;
}

impl Freshness for Repository {
    fn is_fresh(&self, criteria: &FilterConfig, now: DateTime<Utc>) -> bool {
        if self.trend_metrics.stars_24h < criteria.min_stars_growth {
            return false;
        }
        if let Some(last_commit) = self.last_commit {
            if (now - last_commit).num_days() > criteria.max_days_since_commit {
                return false;
            }
        }
        if criteria.requires_documentation && !self.has_docs {
            return false;
        }
        self.relevance_score >= criteria.min_relevance_score
    }
}

/// Sort by relevance, highest first. Ties keep key order.
pub fn sort_by_relevance<T: Item>(items: &mut [T]) {
    items.sort_by(|a, b| b.relevance().total_cmp(&a.relevance()));
}

/// Drop stale items, never going below `criteria.min_results`.
///
/// Small collections pass through untouched. When filtering would leave
/// fewer than the floor, the floor's worth of most relevant items is kept
/// instead, re-sorted by key.
pub fn retain_fresh<T: Freshness>(items: Vec<T>, criteria: &FilterConfig, now: DateTime<Utc>) -> Vec<T> {
    if items.len() < criteria.min_results {
        return items;
    }

    let fresh: Vec<T> = items
        .iter()
        .filter(|item| item.is_fresh(criteria, now))
        .cloned()
        .collect();
    if fresh.len() >= criteria.min_results {
        return fresh;
    }

    log::debug!(
        "Staleness filter kept {} of {}; keeping the {} most relevant instead",
        fresh.len(),
        items.len(),
        criteria.min_results
    );
    let mut ranked = items;
    sort_by_relevance(&mut ranked);
    ranked.truncate(criteria.min_results);
    ranked.sort_by_key(|item| item.identity_key());
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashSet;

    fn repo(name: &str) -> Repository {
        Repository::new(name, "test", DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }

    fn criteria(min_results: usize) -> FilterConfig {
        FilterConfig {
            min_results,
            ..FilterConfig::default()
        }
    }

    #[test]
    fn test_merge_keys_are_unique_and_sorted() {
        let merged = merge(vec![
            vec![repo("b/two"), repo("a/one")],
            vec![repo("a/one"), repo("c/three")],
        ]);
        let keys: Vec<_> = merged.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(keys, vec!["a/one", "b/two", "c/three"]);

        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_merge_prefers_more_complete_record() {
        let sparse = repo("a/one");
        let mut rich = repo("a/one");
        rich.description = "An LLM toolkit".into();
        rich.stars = 10;

        let merged = merge(vec![vec![rich.clone()], vec![sparse]]);
        assert_eq!(merged, vec![rich]);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let mut left = repo("a/one");
        left.source = "GitHub Trending".into();
        left.stars = 5;
        let mut right = repo("a/one");
        right.source = "GitHub Search".into();
        right.forks = 5;
        let other = repo("z/last");

        let ab = merge(vec![vec![left.clone(), other.clone()], vec![right.clone()]]);
        let ba = merge(vec![vec![right], vec![other, left]]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_retain_fresh_small_input_untouched() {
        let now = Utc::now();
        let mut stale = repo("a/old");
        stale.last_commit = Some(now - Duration::days(400));

        let kept = retain_fresh(vec![stale], &criteria(50), now);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_retain_fresh_drops_stale_items() {
        let now = Utc::now();
        let mut items = Vec::new();
        for i in 0..6 {
            let mut r = repo(&format!("o/r{i}"));
            r.relevance_score = 0.5;
            r.last_commit = Some(now - Duration::days(if i == 0 { 365 } else { 1 }));
            items.push(r);
        }

        let kept = retain_fresh(items, &criteria(3), now);
        assert_eq!(kept.len(), 5);
        assert!(kept.iter().all(|r| r.name != "o/r0"));
    }

    #[test]
    fn test_retain_fresh_floor_keeps_most_relevant() {
        let now = Utc::now();
        let mut items = Vec::new();
        for i in 0..5 {
            let mut r = repo(&format!("o/r{i}"));
            r.relevance_score = f64::from(i) / 10.0;
            r.last_commit = Some(now - Duration::days(365));
            items.push(r);
        }

        let kept = retain_fresh(items, &criteria(3), now);
        let names: Vec<_> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["o/r2", "o/r3", "o/r4"]);
    }

    /// Four relevant, recently committed repositories.
    fn fresh_batch(now: DateTime<Utc>) -> Vec<Repository> {
        (0..4)
            .map(|i| {
                let mut r = repo(&format!("o/r{i}"));
                r.relevance_score = 0.5;
                r.last_commit = Some(now - Duration::days(1));
                r.has_docs = true;
                r.trend_metrics.stars_24h = 20;
                r
            })
            .collect()
    }

    #[test]
    fn test_retain_fresh_min_stars_growth() {
        let now = Utc::now();
        let mut items = fresh_batch(now);
        items[1].trend_metrics.stars_24h = 3;

        let filter = FilterConfig {
            min_stars_growth: 10,
            ..criteria(2)
        };
        let kept = retain_fresh(items, &filter, now);
        let names: Vec<_> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["o/r0", "o/r2", "o/r3"]);
    }

    #[test]
    fn test_retain_fresh_requires_documentation() {
        let now = Utc::now();
        let mut items = fresh_batch(now);
        items[0].has_docs = false;
        items[3].has_docs = false;

        let lenient = retain_fresh(items.clone(), &criteria(2), now);
        assert_eq!(lenient.len(), 4);

        let filter = FilterConfig {
            requires_documentation: true,
            ..criteria(2)
        };
        let kept = retain_fresh(items, &filter, now);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.has_docs));
    }

    #[test]
    fn test_retain_fresh_min_relevance_score() {
        let now = Utc::now();
        let mut items = fresh_batch(now);
        items[2].relevance_score = 0.2;

        let filter = FilterConfig {
            min_relevance_score: 0.3,
            ..criteria(2)
        };
        let kept = retain_fresh(items, &filter, now);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|r| r.name != "o/r2"));
    }

    #[test]
    fn test_retain_fresh_at_exact_floor_keeps_everything() {
        let now = Utc::now();
        let mut items = fresh_batch(now);
        items[0].last_commit = Some(now - Duration::days(400));

        let kept = retain_fresh(items.clone(), &criteria(4), now);
        assert_eq!(kept, items);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let r = repo("a/one");
        assert_eq!(fingerprint(&r), fingerprint(&r.clone()));
        assert_eq!(fingerprint(&r).len(), 64);
    }
}
