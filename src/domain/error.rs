// ==========================================
// 设备时间损失 - 损失计算错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 全部直接上抛给 compute_loss 的调用方, 内部不重试
// ==========================================

use thiserror::Error;

/// 损失计算错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LossError {
    // ===== 协作方缺失 =====
    #[error("设备未定义工作日历: equipment={equipment}")]
    MissingSchedule { equipment: String },

    #[error("设备/物料未定义设计速度: equipment={equipment}, material={material}")]
    MissingDesignSpeed { equipment: String, material: String },

    // ===== 计算前置条件 =====
    #[error("设计速度未设置, 无法将产量换算为时间")]
    UnsetReferenceRate,

    #[error("单位换算无效: {from} -> {to}")]
    InvalidConversion { from: String, to: String },

    // ===== 协作方故障 =====
    #[error("汇总数据读取失败: {0}")]
    SummaryStore(String),
}

/// Result 类型别名
pub type LossResult<T> = Result<T, LossError>;
