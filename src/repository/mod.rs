// ==========================================
// 设备时间损失 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供汇总存储接口的实现, 屏蔽数据来源细节
// ==========================================

pub mod summary_repo;

// 重导出核心仓储
pub use summary_repo::InMemorySummaryStore;
