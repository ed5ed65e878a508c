//! Depth-keyed mesh memoization.
//!
//! Callers that build meshes for many depths (the cone-search planner walks
//! through fallback depths, set extraction picks a depth per radius) share a
//! [`MeshCache`] explicitly instead of reaching for process-wide state.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::Mesh;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: RwLock<HashMap<u8, Mesh>>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mesh for `depth`, building and remembering it on first use.
    pub fn get(&self, depth: u8) -> Result<Mesh> {
        if let Some(mesh) = self.meshes.read().get(&depth) {
            return Ok(*mesh);
        }
        let mesh = Mesh::new(depth)?;
        self.meshes.write().entry(depth).or_insert(mesh);
        Ok(mesh)
    }

    pub fn len(&self) -> usize {
        self.meshes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_memoizes() {
        let cache = MeshCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get(10).unwrap().depth(), 10);
        assert_eq!(cache.get(10).unwrap().depth(), 10);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalid_depth_not_cached() {
        let cache = MeshCache::new();
        assert!(cache.get(30).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(MeshCache::new());
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get(10 + i % 4).unwrap().depth())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap() >= 10);
        }
        assert_eq!(cache.len(), 4);
    }
}
