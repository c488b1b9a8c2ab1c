// ==========================================
// 制造成本估算系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: MHR 缺配置必须报错，不允许静默取默认值
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimationError {
    /// 机床名称在参考数据中不存在
    #[error("机床不存在: name='{0}'")]
    MachineNotFound(String),

    /// 尺寸既不满足回转体也不满足箱体要求，或其他输入非法
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 工序+负荷+机床组合在两级查找后均无机时费率
    #[error(
        "机时费率未配置: operation={operation}, duty={duty}, machine={machine}（请在 MHR 配置表中补充对应行）"
    )]
    MhrNotConfigured {
        operation: String,
        duty: String,
        machine: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type EstimationResult<T> = Result<T, EstimationError>;
