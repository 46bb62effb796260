// ==========================================
// 人力资源管理系统 - 参照数据目录
// ==========================================
// 依据: Import_Pipeline_Spec_v0.4_Integrated.md - 2. 参照数据缓存
// ==========================================
// 职责: 按类目惰性加载规范参照集,进程内按管道运行实例缓存
// 红线: 显式 load/clear 生命周期,禁止隐藏全局状态;
//       clear 整体失效,不做部分失效
// ==========================================

use crate::importer::countries::ISO_COUNTRIES;
use crate::importer::error::ImportError;
use crate::importer::fuzzy::ReferenceCandidate;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

// ==========================================
// ReferenceCategory - 参照类目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceCategory {
    Country,        // 内置 ISO-3166 表
    Currency,       // 参照库 ref_currency 表
    Lookup(String), // 参照库 ref_lookup 表,按类目分组
}

// ==========================================
// ReferenceDataRepository Trait
// ==========================================
// 用途: 参照数据访问接口
// 实现者: ReferenceDataRepositoryImpl（rusqlite）
#[async_trait]
pub trait ReferenceDataRepository: Send + Sync {
    /// 读取全部币种
    async fn list_currencies(&self) -> Result<Vec<ReferenceCandidate>, ImportError>;

    /// 读取指定类目的查找编码
    ///
    /// # 参数
    /// - category: 查找类目(如 "employment_type")
    async fn list_lookup_codes(
        &self,
        category: &str,
    ) -> Result<Vec<ReferenceCandidate>, ImportError>;
}

// ==========================================
// ReferenceDataCatalog - 参照数据目录(缓存)
// ==========================================
// 并发约定: 同一类目的并发 load 合并为一次底层读取
// (整表互斥锁跨越读取过程,即单航道模式)
pub struct ReferenceDataCatalog {
    repo: Arc<dyn ReferenceDataRepository>,
    cache: Mutex<HashMap<ReferenceCategory, Arc<Vec<ReferenceCandidate>>>>,
}

impl ReferenceDataCatalog {
    pub fn new(repo: Arc<dyn ReferenceDataRepository>) -> Self {
        Self {
            repo,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// 加载类目参照集(按类目缓存,目录生命周期内至多读库一次)
    pub async fn load(
        &self,
        category: &ReferenceCategory,
    ) -> Result<Arc<Vec<ReferenceCandidate>>, ImportError> {
        let mut cache = self.cache.lock().await;

        if let Some(hit) = cache.get(category) {
            return Ok(Arc::clone(hit));
        }

        let loaded = match category {
            ReferenceCategory::Country => ISO_COUNTRIES
                .iter()
                .map(|(code, name)| ReferenceCandidate::new(code, name))
                .collect(),
            ReferenceCategory::Currency => self.repo.list_currencies().await?,
            ReferenceCategory::Lookup(name) => self.repo.list_lookup_codes(name).await?,
        };

        let entry = Arc::new(loaded);
        cache.insert(category.clone(), Arc::clone(&entry));
        Ok(entry)
    }

    /// 清空全部缓存类目(独立校验轮次之间调用)
    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRepo {
        currency_fetches: AtomicUsize,
        lookup_fetches: AtomicUsize,
    }

    impl CountingRepo {
        fn new() -> Self {
            Self {
                currency_fetches: AtomicUsize::new(0),
                lookup_fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReferenceDataRepository for CountingRepo {
        async fn list_currencies(&self) -> Result<Vec<ReferenceCandidate>, ImportError> {
            self.currency_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                ReferenceCandidate::new("USD", "US Dollar"),
                ReferenceCandidate::new("EUR", "Euro"),
            ])
        }

        async fn list_lookup_codes(
            &self,
            _category: &str,
        ) -> Result<Vec<ReferenceCandidate>, ImportError> {
            self.lookup_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ReferenceCandidate::new("FT", "Full Time")])
        }
    }

    #[tokio::test]
    async fn test_load_memoizes_per_category() {
        let repo = Arc::new(CountingRepo::new());
        let catalog = ReferenceDataCatalog::new(Arc::clone(&repo) as Arc<dyn ReferenceDataRepository>);

        catalog.load(&ReferenceCategory::Currency).await.unwrap();
        catalog.load(&ReferenceCategory::Currency).await.unwrap();
        catalog.load(&ReferenceCategory::Currency).await.unwrap();

        // 类目生命周期内至多一次底层读取
        assert_eq!(repo.currency_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_drops_whole_cache() {
        let repo = Arc::new(CountingRepo::new());
        let catalog = ReferenceDataCatalog::new(Arc::clone(&repo) as Arc<dyn ReferenceDataRepository>);

        catalog.load(&ReferenceCategory::Currency).await.unwrap();
        catalog
            .load(&ReferenceCategory::Lookup("employment_type".to_string()))
            .await
            .unwrap();
        catalog.clear().await;
        catalog.load(&ReferenceCategory::Currency).await.unwrap();
        catalog
            .load(&ReferenceCategory::Lookup("employment_type".to_string()))
            .await
            .unwrap();

        assert_eq!(repo.currency_fetches.load(Ordering::SeqCst), 2);
        assert_eq!(repo.lookup_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_country_category_is_builtin() {
        let repo = Arc::new(CountingRepo::new());
        let catalog = ReferenceDataCatalog::new(Arc::clone(&repo) as Arc<dyn ReferenceDataRepository>);

        let countries = catalog.load(&ReferenceCategory::Country).await.unwrap();
        assert!(countries.iter().any(|c| c.code == "US"));
        // 国家表内置,不触发底层读取
        assert_eq!(repo.currency_fetches.load(Ordering::SeqCst), 0);
        assert_eq!(repo.lookup_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_distinct_lookup_categories_cached_separately() {
        let repo = Arc::new(CountingRepo::new());
        let catalog = ReferenceDataCatalog::new(Arc::clone(&repo) as Arc<dyn ReferenceDataRepository>);

        catalog
            .load(&ReferenceCategory::Lookup("employment_type".to_string()))
            .await
            .unwrap();
        catalog
            .load(&ReferenceCategory::Lookup("cost_center".to_string()))
            .await
            .unwrap();

        assert_eq!(repo.lookup_fetches.load(Ordering::SeqCst), 2);
    }
}
