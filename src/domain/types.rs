// ==========================================
// 制造成本估算系统 - 领域类型定义
// ==========================================
// 职责: 负荷等级 / 机床类别 / 零件形状 / 材料 / 工序
// 红线: 负荷等级是"等级制",只升不降
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 负荷等级 (Duty Category)
// ==========================================
// 顺序: Light < Medium < Heavy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyCategory {
    Light,  // 轻载
    Medium, // 中载
    Heavy,  // 重载
}

impl DutyCategory {
    /// 按 [light, medium, heavy] 顺序上调一级，到 heavy 封顶
    pub fn bump(self) -> Self {
        match self {
            DutyCategory::Light => DutyCategory::Medium,
            DutyCategory::Medium | DutyCategory::Heavy => DutyCategory::Heavy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DutyCategory::Light => "light",
            DutyCategory::Medium => "medium",
            DutyCategory::Heavy => "heavy",
        }
    }

    /// 宽松解析（兼容 "Medium duty" / "HEAVY_DUTY" / " light " 等写法）
    pub fn parse_normalized(s: &str) -> Option<Self> {
        match normalize_name(s).as_str() {
            "light" => Some(DutyCategory::Light),
            "medium" => Some(DutyCategory::Medium),
            "heavy" => Some(DutyCategory::Heavy),
            _ => None,
        }
    }
}

impl fmt::Display for DutyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 机床类别 (Machine Category)
// ==========================================
// 说明: 数据库中不单独存储，由机床名称推断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineCategory {
    Conventional, // 普通机床
    #[serde(rename = "cnc_3axis")]
    Cnc3Axis, // 三轴数控
    #[serde(rename = "cnc_5axis")]
    Cnc5Axis, // 五轴数控
    Spm,      // 专用机床
}

impl MachineCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineCategory::Conventional => "conventional",
            MachineCategory::Cnc3Axis => "cnc_3axis",
            MachineCategory::Cnc5Axis => "cnc_5axis",
            MachineCategory::Spm => "spm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "conventional" => Some(MachineCategory::Conventional),
            "cnc_3axis" => Some(MachineCategory::Cnc3Axis),
            "cnc_5axis" => Some(MachineCategory::Cnc5Axis),
            "spm" => Some(MachineCategory::Spm),
            _ => None,
        }
    }
}

impl fmt::Display for MachineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 零件形状 (Shape)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Round,       // 回转体: 直径 + 长度
    Rectangular, // 箱体/板件: 长 + 宽 + 高
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Round => write!(f, "round"),
            Shape::Rectangular => write!(f, "rectangular"),
        }
    }
}

// ==========================================
// 材料 (Material)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Aluminium,
    Steel,
    Titanium,
}

impl MaterialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialKind::Aluminium => "aluminium",
            MaterialKind::Steel => "steel",
            MaterialKind::Titanium => "titanium",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 工序 (Operation Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Turning,
    Milling,
    Drilling,
    Grinding,
    Boring,
    HeatTreatment,
    Welding,
    SurfaceTreatment,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Turning => "turning",
            OperationKind::Milling => "milling",
            OperationKind::Drilling => "drilling",
            OperationKind::Grinding => "grinding",
            OperationKind::Boring => "boring",
            OperationKind::HeatTreatment => "heat_treatment",
            OperationKind::Welding => "welding",
            OperationKind::SurfaceTreatment => "surface_treatment",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 名称归一化
// ==========================================

/// 名称归一化（用于工序/负荷/机床名称的宽松比对）
///
/// 规则（顺序执行）:
/// 1) 去首尾空白、转小写
/// 2) "_" / "-" 替换为空格
/// 3) 合并连续空白
/// 4) 去掉结尾的 " duty"
pub fn normalize_name(s: &str) -> String {
    let lowered = s.trim().to_lowercase().replace(['_', '-'], " ");
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.strip_suffix(" duty") {
        Some(stripped) => stripped.to_string(),
        None => collapsed,
    }
}
