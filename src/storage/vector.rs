//! HNSW-backed vector index: a brute-force cosine scan for small projects,
//! with an HNSW index built on demand once a project's symbol count
//! crosses `Config::hnsw_threshold`.

use super::cosine_similarity;
use hnsw_rs::prelude::*;

const HNSW_MAX_LAYERS: usize = 16;
const MAX_NB_CONNECTION: usize = 32;
const EF_CONSTRUCTION: usize = 400;

pub struct HnswVectorStore {
    dimension: usize,
    ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
    index: Option<Hnsw<'static, f32, DistCosine>>,
}

impl HnswVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ids: Vec::new(),
            vectors: Vec::new(),
            index: None,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Loads a project's full embedding set, replacing whatever was cached.
    /// Builds the HNSW graph only when `threshold` is crossed; below it,
    /// [`HnswVectorStore::search`] falls back to a brute-force scan.
    pub fn load(&mut self, entries: Vec<(String, Vec<f32>)>, threshold: usize) {
        self.ids.clear();
        self.vectors.clear();
        self.index = None;
        for (id, vector) in entries {
            if vector.len() != self.dimension {
                continue;
            }
            self.ids.push(id);
            self.vectors.push(vector);
        }
        if self.ids.len() >= threshold && !self.ids.is_empty() {
            self.build_index();
        }
    }

    fn build_index(&mut self) {
        let nb_elem = self.vectors.len();
        let mut hnsw = Hnsw::<'static, f32, DistCosine>::new(
            MAX_NB_CONNECTION,
            nb_elem,
            HNSW_MAX_LAYERS,
            EF_CONSTRUCTION,
            DistCosine {},
        );
        let data: Vec<(&Vec<f32>, usize)> = self.vectors.iter().zip(0..nb_elem).collect();
        hnsw.parallel_insert(&data);
        hnsw.set_searching_mode(true);
        self.index = Some(hnsw);
    }

    pub fn search(&self, query: &[f32], limit: usize) -> Vec<(String, f32)> {
        if query.len() != self.dimension || self.ids.is_empty() {
            return Vec::new();
        }
        match &self.index {
            Some(hnsw) => {
                let ef_search = (limit * 2).max(50);
                let mut results: Vec<(String, f32)> = hnsw
                    .search(query, limit, ef_search)
                    .into_iter()
                    .filter_map(|n| {
                        let id = self.ids.get(n.d_id)?;
                        let vector = self.vectors.get(n.d_id)?;
                        Some((id.clone(), cosine_similarity(query, vector)))
                    })
                    .collect();
                results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                results
            }
            None => self.brute_force(query, limit),
        }
    }

    fn brute_force(&self, query: &[f32], limit: usize) -> Vec<(String, f32)> {
        let mut results: Vec<(String, f32)> = self
            .ids
            .iter()
            .zip(self.vectors.iter())
            .map(|(id, v)| (id.clone(), cosine_similarity(query, v)))
            .collect();
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brute_force_orders_by_similarity() {
        let mut store = HnswVectorStore::new(2);
        store.load(
            vec![
                ("a".to_string(), vec![1.0, 0.0]),
                ("b".to_string(), vec![0.0, 1.0]),
            ],
            1000,
        );
        let hits = store.search(&[1.0, 0.0], 2);
        assert_eq!(hits[0].0, "a");
    }

    #[test]
    fn hnsw_path_used_above_threshold() {
        let mut store = HnswVectorStore::new(2);
        let entries: Vec<(String, Vec<f32>)> = (0..10).map(|i| (format!("s{i}"), vec![i as f32, 1.0])).collect();
        store.load(entries, 5);
        assert!(store.index.is_some());
        let hits = store.search(&[9.0, 1.0], 1);
        assert_eq!(hits[0].0, "s9");
    }
}
</content>
