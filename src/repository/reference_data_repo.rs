// ==========================================
// 制造成本估算系统 - 参考数据读取 Trait
// ==========================================
// 职责: 定义估算引擎所需的参考数据读取接口（不包含实现）
// 红线: 只读；不含业务逻辑（名称归一化/打分在引擎层）
// ==========================================

use crate::domain::reference::{Duty, Machine, MhrRecord, MhrRow, OperationType};
use crate::repository::error::RepositoryResult;

// ==========================================
// ReferenceDataReader Trait
// ==========================================
// 实现者: ReferenceDataRepository（SQLite）
pub trait ReferenceDataReader: Send + Sync {
    /// 按名称精确查找机床（区分大小写，多条取 id 最小者）
    fn find_machine_by_name(&self, name: &str) -> RepositoryResult<Option<Machine>>;

    /// 列出全部负荷等级字典
    fn list_duties(&self) -> RepositoryResult<Vec<Duty>>;

    /// 按名称查找工序（去首尾空白、不区分大小写）
    fn find_operation_type_by_name(&self, name: &str) -> RepositoryResult<Option<OperationType>>;

    /// 按 (工序, 负荷, 机床) 查找机时费率配置，存在重复时取第一条
    fn find_mhr(
        &self,
        op_type_id: i64,
        duty_id: i64,
        machine_id: i64,
    ) -> RepositoryResult<Option<MhrRecord>>;

    /// 列出工序名匹配的全部机时费率配置（关联工序/负荷/机床名称）
    ///
    /// - 工序名去首尾空白、不区分大小写；同名工序的配置一并返回
    /// - 顺序: 按 mhr.id 升序（模糊匹配平分时以此为先后）
    fn list_mhr_by_operation_name(&self, operation: &str) -> RepositoryResult<Vec<MhrRow>>;
}
