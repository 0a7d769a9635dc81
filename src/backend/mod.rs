//! 证据库模块：软件包/版本的存储接口与内存实现
pub mod model;
pub mod memory;
pub mod loader;

use std::collections::BTreeSet;

use crate::error::RsgResult;

pub use self::model::{Entity, SoftwarePackage, SoftwareVersion};
pub use self::memory::InMemoryStore;
pub use self::loader::StoreLoader;

/// 证据库接口
///
/// 任意具体存储（关系型、嵌入式、内存）都可以实现该接口。
/// 所有方法只借用 `&self`，实现方自行负责内部同步。
pub trait EvidenceStore: Send + Sync {
    /// 更新版本的索引标记，返回状态是否发生变化
    fn mark_indexed(&self, version: &SoftwareVersion, indexed: bool) -> RsgResult<bool>;

    /// 获取软件包的全部版本
    fn retrieve_versions(
        &self,
        package: &SoftwarePackage,
        indexed_only: bool,
    ) -> RsgResult<BTreeSet<SoftwareVersion>>;

    /// 按名称（忽略大小写）查找软件包
    fn retrieve_packages_by_name(&self, name: &str) -> RsgResult<BTreeSet<SoftwarePackage>>;

    /// 插入或更新实体，返回是否发生变化
    fn store(&self, entity: Entity) -> RsgResult<bool>;
}
