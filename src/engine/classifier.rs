// ==========================================
// 制造成本估算系统 - 负荷等级判定引擎
// ==========================================
// 红线: 负荷等级单调（尺寸变大/材料变硬/工序变重 → 等级只升不降）
// ==========================================
// 职责: 识别零件形状 + 判定负荷等级 (light/medium/heavy)
// 输入: 形状 + 尺寸 + 材料 + 工序
// 输出: DutyClassification（等级 + 判定依据 + 调整因子）
// ==========================================

use crate::domain::cost::{Dimensions, DutyBasis, DutyClassification, PartGeometry};
use crate::domain::types::{DutyCategory, Shape};
use crate::engine::error::{EstimationError, EstimationResult};
use tracing::debug;

/// 圆周率取值（与历史报价口径一致，勿替换为 f64::consts::PI）
pub const PI_APPROX: f64 = 3.14159;

// ===== 几何阈值 (mm) =====
const RECT_LIGHT_MAX_DIM: f64 = 750.0;
const RECT_MEDIUM_MAX_DIM: f64 = 1500.0;
const ROUND_LIGHT_DIAMETER: f64 = 100.0;
const ROUND_LIGHT_LENGTH: f64 = 300.0;
const ROUND_MEDIUM_DIAMETER: f64 = 300.0;
const ROUND_MEDIUM_LENGTH: f64 = 1200.0;

// ===== 体积评分阈值 =====
const SCORE_LIGHT_BELOW: f64 = 5.0;
const SCORE_MEDIUM_BELOW: f64 = 20.0;

// ==========================================
// DutyClassifier - 负荷等级判定引擎
// ==========================================
pub struct DutyClassifier {}

impl DutyClassifier {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 形状识别
    // ==========================================

    /// 按尺寸字段识别零件形状，并计算体积
    ///
    /// 规则:
    /// 1) 有 diameter → 回转体（须同时有 length）
    /// 2) 有 breadth + height → 箱体（须同时有 length）
    /// 3) 其他 → InvalidInput
    pub fn detect_geometry(&self, dims: &Dimensions) -> EstimationResult<PartGeometry> {
        if let Some(diameter) = dims.diameter {
            let length = dims.length.ok_or_else(|| {
                EstimationError::InvalidInput("回转体零件须同时提供 diameter 与 length".to_string())
            })?;
            return Ok(PartGeometry {
                shape: Shape::Round,
                dimensions: Dimensions::round(diameter, length),
                volume: round_to(cylinder_volume(diameter, length), 2),
            });
        }

        if let (Some(breadth), Some(height)) = (dims.breadth, dims.height) {
            let length = dims.length.ok_or_else(|| {
                EstimationError::InvalidInput("箱体零件须同时提供 length、breadth 与 height".to_string())
            })?;
            return Ok(PartGeometry {
                shape: Shape::Rectangular,
                dimensions: Dimensions::rectangular(length, breadth, height),
                volume: round_to(length * breadth * height, 2),
            });
        }

        Err(EstimationError::InvalidInput(
            "尺寸无效: 回转体请提供 (diameter + length)，箱体请提供 (length + breadth + height)".to_string(),
        ))
    }

    // ==========================================
    // 负荷等级判定
    // ==========================================

    /// 判定负荷等级（仅返回等级）
    pub fn determine_duty_category(
        &self,
        shape: Shape,
        dims: &Dimensions,
        material: &str,
        operation: &str,
    ) -> DutyCategory {
        self.classify(shape, dims, material, operation).duty
    }

    /// 判定负荷等级（含判定依据）
    ///
    /// 顺序:
    /// 1) 几何阈值得出基础等级；尺寸字段不全时退化为体积评分
    /// 2) 材料抬升: steel/titanium 将 light 抬到 medium；titanium 在 medium 时再抬一级
    /// 3) 工序抬升: heat_treatment/welding 再抬一级（heavy 封顶）
    pub fn classify(
        &self,
        shape: Shape,
        dims: &Dimensions,
        material: &str,
        operation: &str,
    ) -> DutyClassification {
        let op = operation.trim().to_lowercase();
        let mat = material.trim().to_lowercase();

        let (base_duty, basis) = match geometry_base(shape, dims) {
            Some(duty) => (duty, DutyBasis::Geometry),
            None => {
                let score = volume_score(shape, dims, &mat, &op);
                (score_to_duty(score), DutyBasis::VolumeScore { score })
            }
        };

        let mut duty = base_duty;
        let mut factors = Vec::new();

        // 材料抬升（保守口径: 钢/钛不会降低等级）
        if mat == "steel" || mat == "titanium" {
            if duty == DutyCategory::Light {
                let before = duty;
                duty = duty.bump();
                factors.push(format!("material={}: {} -> {}", mat, before, duty));
            }
            if mat == "titanium" && duty == DutyCategory::Medium {
                let before = duty;
                duty = duty.bump();
                factors.push(format!("material={}: {} -> {}", mat, before, duty));
            }
        }

        // 工序抬升
        if op == "heat_treatment" || op == "welding" {
            let before = duty;
            duty = duty.bump();
            factors.push(format!("operation={}: {} -> {}", op, before, duty));
        }

        debug!(
            shape = %shape,
            material = %mat,
            operation = %op,
            base = %base_duty,
            duty = %duty,
            "负荷等级判定完成"
        );

        DutyClassification {
            duty,
            base_duty,
            basis,
            factors,
        }
    }
}

// ==========================================
// 内部规则
// ==========================================

/// 几何阈值判定；所需尺寸字段不全时返回 None
fn geometry_base(shape: Shape, dims: &Dimensions) -> Option<DutyCategory> {
    match shape {
        Shape::Rectangular => {
            let (length, breadth, height) = (dims.length?, dims.breadth?, dims.height?);
            let max_dim = length.max(breadth).max(height);
            Some(if max_dim <= RECT_LIGHT_MAX_DIM {
                DutyCategory::Light
            } else if max_dim <= RECT_MEDIUM_MAX_DIM {
                DutyCategory::Medium
            } else {
                DutyCategory::Heavy
            })
        }
        Shape::Round => {
            let (diameter, length) = (dims.diameter?, dims.length?);
            Some(
                if diameter <= ROUND_LIGHT_DIAMETER && length <= ROUND_LIGHT_LENGTH {
                    DutyCategory::Light
                } else if diameter <= ROUND_MEDIUM_DIAMETER && length <= ROUND_MEDIUM_LENGTH {
                    DutyCategory::Medium
                } else {
                    DutyCategory::Heavy
                },
            )
        }
    }
}

/// 体积评分 = 体积/1e6 × 材料系数 × 工序系数（缺失尺寸按 0 计）
fn volume_score(shape: Shape, dims: &Dimensions, material: &str, operation: &str) -> f64 {
    let volume = match shape {
        Shape::Round => cylinder_volume(dims.diameter.unwrap_or(0.0), dims.length.unwrap_or(0.0)),
        Shape::Rectangular => {
            dims.length.unwrap_or(0.0) * dims.breadth.unwrap_or(0.0) * dims.height.unwrap_or(0.0)
        }
    };
    (volume / 1_000_000.0) * material_factor(material) * operation_factor(operation)
}

fn score_to_duty(score: f64) -> DutyCategory {
    if score < SCORE_LIGHT_BELOW {
        DutyCategory::Light
    } else if score < SCORE_MEDIUM_BELOW {
        DutyCategory::Medium
    } else {
        DutyCategory::Heavy
    }
}

fn material_factor(material: &str) -> f64 {
    match material {
        "aluminium" => 1.0,
        "steel" => 3.0,
        "titanium" => 1.7,
        _ => 1.0,
    }
}

fn operation_factor(operation: &str) -> f64 {
    match operation {
        "turning" => 1.0,
        "milling" => 1.5,
        "drilling" => 0.8,
        "grinding" => 1.2,
        "boring" => 1.3,
        "heat_treatment" => 2.0,
        "welding" => 1.8,
        "surface_treatment" => 1.0,
        _ => 1.0,
    }
}

fn cylinder_volume(diameter: f64, length: f64) -> f64 {
    PI_APPROX * (diameter / 2.0).powi(2) * length
}

/// 按指定小数位舍入
///
/// 基于浮点数的精确十进制值舍入，恰好位于中点时取偶数（25.125 → 25.12）
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}
