use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use uuid::Uuid;

use crate::voxel_grid::VoxelGrid;

/// 上传的网格及其创建时间
pub struct StoredGrid {
    pub grid: VoxelGrid,
    /// 创建时间，用于 TTL 过期检查
    pub created_at: Instant,
}

/// 上传网格的内存存储，按 grid_id 索引
pub struct GridStore {
    grids: RwLock<HashMap<String, Arc<StoredGrid>>>,
    /// TTL（Time-To-Live）默认过期时间：30 分钟
    default_ttl: Duration,
}

impl GridStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(30 * 60))
    }

    /// 创建带自定义 TTL 的 GridStore
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            grids: RwLock::new(HashMap::new()),
            default_ttl: ttl,
        }
    }

    pub fn insert(&self, grid: VoxelGrid) -> String {
        let grid_id = Uuid::new_v4().to_string();
        let stored = StoredGrid {
            grid,
            created_at: Instant::now(),
        };
        self.grids.write().insert(grid_id.clone(), Arc::new(stored));
        grid_id
    }

    /// 返回 Arc，调用方积分时不持有锁
    pub fn get(&self, grid_id: &str) -> Option<Arc<StoredGrid>> {
        self.grids.read().get(grid_id).cloned()
    }

    pub fn remove(&self, grid_id: &str) -> Option<Arc<StoredGrid>> {
        self.grids.write().remove(grid_id)
    }

    /// 清理过期的网格
    /// 返回清理的网格数量
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut grids = self.grids.write();
        let before_count = grids.len();

        grids.retain(|_, stored| now.duration_since(stored.created_at) < self.default_ttl);

        before_count - grids.len()
    }

    /// 获取当前网格数量
    pub fn grid_count(&self) -> usize {
        self.grids.read().len()
    }

    /// 获取默认 TTL
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel_grid::VoxelData;

    fn grid() -> VoxelGrid {
        VoxelGrid::new(vec![1, 1, 2], VoxelData::Real(vec![1.0, 2.0])).unwrap()
    }

    #[test]
    fn insert_get_remove() {
        let store = GridStore::new();
        let id = store.insert(grid());
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(store.grid_count(), 1);
        assert_eq!(store.get(&id).unwrap().grid.shape(), &[1, 1, 2]);

        assert!(store.remove(&id).is_some());
        assert!(store.get(&id).is_none());
        assert!(store.remove(&id).is_none());
    }

    #[test]
    fn ids_are_unique() {
        let store = GridStore::new();
        let a = store.insert(grid());
        let b = store.insert(grid());
        assert_ne!(a, b);
        assert_eq!(store.grid_count(), 2);
    }

    #[test]
    fn expired_grids_are_cleaned_up() {
        let store = GridStore::with_ttl(Duration::ZERO);
        store.insert(grid());
        store.insert(grid());
        assert_eq!(store.cleanup_expired(), 2);
        assert_eq!(store.grid_count(), 0);
    }

    #[test]
    fn fresh_grids_survive_cleanup() {
        let store = GridStore::new();
        let id = store.insert(grid());
        assert_eq!(store.cleanup_expired(), 0);
        assert!(store.get(&id).is_some());
        assert_eq!(store.default_ttl(), Duration::from_secs(1800));
    }

    #[test]
    fn held_grid_outlives_removal() {
        let store = GridStore::new();
        let id = store.insert(grid());
        let held = store.get(&id).unwrap();
        store.remove(&id);
        assert_eq!(held.grid.element_count(), 2);
    }
}
