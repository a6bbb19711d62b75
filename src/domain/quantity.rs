// ==========================================
// 设备时间损失 - 计量单位与数量
// ==========================================
// 用途: 产量、设计速度、时间的带单位数值
// 红线: 瀑布模型只通过 QuantityArithmetic 做单位运算, 不内嵌单位换算
// ==========================================

use crate::domain::error::{LossError, LossResult};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 时间单位
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    /// 折算为秒的系数
    pub fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3_600.0,
            TimeUnit::Day => 86_400.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TimeUnit::Second => "s",
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "s" | "sec" | "second" => Some(TimeUnit::Second),
            "min" | "minute" => Some(TimeUnit::Minute),
            "h" | "hr" | "hour" => Some(TimeUnit::Hour),
            "d" | "day" => Some(TimeUnit::Day),
            _ => None,
        }
    }
}

// ==========================================
// 物料单位 (计件 / 质量 / 体积)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialDimension {
    Count,
    Mass,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialUnit {
    Unit,       // 件
    Dozen,      // 打
    Kilogram,   // 千克
    Tonne,      // 吨
    Pound,      // 磅
    Litre,      // 升
    CubicMetre, // 立方米
}

impl MaterialUnit {
    pub fn dimension(&self) -> MaterialDimension {
        match self {
            MaterialUnit::Unit | MaterialUnit::Dozen => MaterialDimension::Count,
            MaterialUnit::Kilogram | MaterialUnit::Tonne | MaterialUnit::Pound => {
                MaterialDimension::Mass
            }
            MaterialUnit::Litre | MaterialUnit::CubicMetre => MaterialDimension::Volume,
        }
    }

    /// 折算为基准单位 (件 / 千克 / 升) 的系数
    pub fn base_factor(&self) -> f64 {
        match self {
            MaterialUnit::Unit => 1.0,
            MaterialUnit::Dozen => 12.0,
            MaterialUnit::Kilogram => 1.0,
            MaterialUnit::Tonne => 1_000.0,
            MaterialUnit::Pound => 0.453_592_37,
            MaterialUnit::Litre => 1.0,
            MaterialUnit::CubicMetre => 1_000.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            MaterialUnit::Unit => "unit",
            MaterialUnit::Dozen => "dozen",
            MaterialUnit::Kilogram => "kg",
            MaterialUnit::Tonne => "t",
            MaterialUnit::Pound => "lb",
            MaterialUnit::Litre => "l",
            MaterialUnit::CubicMetre => "m3",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "unit" | "units" | "ea" | "pcs" => Some(MaterialUnit::Unit),
            "dozen" | "dz" => Some(MaterialUnit::Dozen),
            "kg" => Some(MaterialUnit::Kilogram),
            "t" | "tonne" => Some(MaterialUnit::Tonne),
            "lb" => Some(MaterialUnit::Pound),
            "l" | "litre" | "liter" => Some(MaterialUnit::Litre),
            "m3" => Some(MaterialUnit::CubicMetre),
            _ => None,
        }
    }
}

// ==========================================
// 量纲
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Dimensionless,
    Time,
    Material(MaterialDimension),
    Rate(MaterialDimension), // 物料 / 时间
}

// ==========================================
// Unit - 计量单位
// ==========================================
// 序列化格式: 符号字符串, 如 "min", "kg", "unit/min"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    One,
    Time(TimeUnit),
    Material(MaterialUnit),
    Rate(MaterialUnit, TimeUnit),
}

impl Unit {
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::One => Dimension::Dimensionless,
            Unit::Time(_) => Dimension::Time,
            Unit::Material(m) => Dimension::Material(m.dimension()),
            Unit::Rate(m, _) => Dimension::Rate(m.dimension()),
        }
    }

    /// 折算为本量纲基准单位的系数
    pub fn base_factor(&self) -> f64 {
        match self {
            Unit::One => 1.0,
            Unit::Time(t) => t.seconds(),
            Unit::Material(m) => m.base_factor(),
            Unit::Rate(m, t) => m.base_factor() / t.seconds(),
        }
    }

    pub fn symbol(&self) -> String {
        match self {
            Unit::One => "1".to_string(),
            Unit::Time(t) => t.symbol().to_string(),
            Unit::Material(m) => m.symbol().to_string(),
            Unit::Rate(m, t) => format!("{}/{}", m.symbol(), t.symbol()),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if normalized == "1" || normalized.is_empty() {
            return Ok(Unit::One);
        }

        if let Some((numerator, denominator)) = normalized.split_once('/') {
            let material = MaterialUnit::parse(numerator.trim());
            let time = TimeUnit::parse(denominator.trim());
            return match (material, time) {
                (Some(m), Some(t)) => Ok(Unit::Rate(m, t)),
                _ => Err(format!("无法识别的速率单位: {}", s)),
            };
        }

        if let Some(t) = TimeUnit::parse(&normalized) {
            return Ok(Unit::Time(t));
        }
        if let Some(m) = MaterialUnit::parse(&normalized) {
            return Ok(Unit::Material(m));
        }
        Err(format!("无法识别的单位: {}", s))
    }
}

impl TryFrom<String> for Unit {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.symbol()
    }
}

// ==========================================
// Quantity - 带单位的数值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(amount: f64, unit: Unit) -> Self {
        Self { amount, unit }
    }

    /// 以秒为单位表示一段时长
    pub fn from_duration(duration: Duration) -> Self {
        Self::new(duration.num_milliseconds() as f64 / 1_000.0, Unit::Time(TimeUnit::Second))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

// ==========================================
// Trait: QuantityArithmetic
// ==========================================
// 用途: 瀑布模型与聚合器所需的单位运算能力 (注入)
// 实现者: StandardArithmetic
pub trait QuantityArithmetic: fmt::Debug + Send + Sync {
    /// a + b, 结果使用 a 的单位
    fn add(&self, a: &Quantity, b: &Quantity) -> LossResult<Quantity>;

    /// a - b, 结果使用 a 的单位
    fn subtract(&self, a: &Quantity, b: &Quantity) -> LossResult<Quantity>;

    fn multiply(&self, a: &Quantity, b: &Quantity) -> LossResult<Quantity>;

    fn divide(&self, a: &Quantity, b: &Quantity) -> LossResult<Quantity>;

    /// 换算到同量纲的目标单位
    fn convert(&self, quantity: &Quantity, target: Unit) -> LossResult<Quantity>;

    /// 换算为时长, 截断到整秒 (不足一秒的部分直接舍弃, 不做四舍五入)
    /// 非有限值或超出 Duration 表示范围时返回 InvalidConversion
    fn to_duration(&self, quantity: &Quantity) -> LossResult<Duration> {
        let out_of_range = || LossError::InvalidConversion {
            from: quantity.to_string(),
            to: "s".to_string(),
        };

        let seconds = self.convert(quantity, Unit::Time(TimeUnit::Second))?.amount.trunc();
        if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }
        Duration::try_seconds(seconds as i64).ok_or_else(out_of_range)
    }
}

// ==========================================
// StandardArithmetic - 标准单位制实现
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardArithmetic;

impl StandardArithmetic {
    pub fn new() -> Self {
        Self
    }

    fn invalid(a: &Quantity, b: impl fmt::Display) -> LossError {
        LossError::InvalidConversion {
            from: a.unit.symbol(),
            to: b.to_string(),
        }
    }

    /// 将数值换算到另一单位 (不校验量纲, 调用方保证)
    fn rescale(amount: f64, from: Unit, to: Unit) -> f64 {
        amount * from.base_factor() / to.base_factor()
    }
}

impl QuantityArithmetic for StandardArithmetic {
    fn add(&self, a: &Quantity, b: &Quantity) -> LossResult<Quantity> {
        let b = self.convert(b, a.unit)?;
        Ok(Quantity::new(a.amount + b.amount, a.unit))
    }

    fn subtract(&self, a: &Quantity, b: &Quantity) -> LossResult<Quantity> {
        let b = self.convert(b, a.unit)?;
        Ok(Quantity::new(a.amount - b.amount, a.unit))
    }

    fn multiply(&self, a: &Quantity, b: &Quantity) -> LossResult<Quantity> {
        match (a.unit, b.unit) {
            (Unit::One, _) => Ok(Quantity::new(a.amount * b.amount, b.unit)),
            (_, Unit::One) => Ok(Quantity::new(a.amount * b.amount, a.unit)),
            // 速率 × 时间 = 物料, 时间先换算到速率的时间单位
            (Unit::Rate(m, t), Unit::Time(_)) => {
                let time = Self::rescale(b.amount, b.unit, Unit::Time(t));
                Ok(Quantity::new(a.amount * time, Unit::Material(m)))
            }
            (Unit::Time(_), Unit::Rate(m, t)) => {
                let time = Self::rescale(a.amount, a.unit, Unit::Time(t));
                Ok(Quantity::new(time * b.amount, Unit::Material(m)))
            }
            _ => Err(Self::invalid(a, format!("×{}", b.unit))),
        }
    }

    fn divide(&self, a: &Quantity, b: &Quantity) -> LossResult<Quantity> {
        if b.amount == 0.0 {
            return Err(Self::invalid(a, format!("÷0 {}", b.unit)));
        }

        match (a.unit, b.unit) {
            (_, Unit::One) => Ok(Quantity::new(a.amount / b.amount, a.unit)),
            // 物料 ÷ 速率 = 时间 (速率的时间单位)
            (Unit::Material(m), Unit::Rate(rm, t)) if m.dimension() == rm.dimension() => {
                let material = Self::rescale(a.amount, a.unit, Unit::Material(rm));
                Ok(Quantity::new(material / b.amount, Unit::Time(t)))
            }
            // 物料 ÷ 时间 = 速率
            (Unit::Material(m), Unit::Time(t)) => {
                Ok(Quantity::new(a.amount / b.amount, Unit::Rate(m, t)))
            }
            // 同量纲相除 = 无量纲
            (x, y) if x.dimension() == y.dimension() => {
                let numerator = a.amount * x.base_factor();
                let denominator = b.amount * y.base_factor();
                Ok(Quantity::new(numerator / denominator, Unit::One))
            }
            _ => Err(Self::invalid(a, format!("÷{}", b.unit))),
        }
    }

    fn convert(&self, quantity: &Quantity, target: Unit) -> LossResult<Quantity> {
        if quantity.unit.dimension() != target.dimension() {
            return Err(Self::invalid(quantity, target));
        }
        Ok(Quantity::new(
            Self::rescale(quantity.amount, quantity.unit, target),
            target,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_minute(amount: f64) -> Quantity {
        Quantity::new(amount, Unit::Rate(MaterialUnit::Unit, TimeUnit::Minute))
    }

    fn units(amount: f64) -> Quantity {
        Quantity::new(amount, Unit::Material(MaterialUnit::Unit))
    }

    #[test]
    fn test_unit_symbol_parse() {
        assert_eq!("unit/min".parse::<Unit>(), Ok(Unit::Rate(MaterialUnit::Unit, TimeUnit::Minute)));
        assert_eq!("KG".parse::<Unit>(), Ok(Unit::Material(MaterialUnit::Kilogram)));
        assert_eq!("h".parse::<Unit>(), Ok(Unit::Time(TimeUnit::Hour)));
        assert!("furlong/fortnight".parse::<Unit>().is_err());
        assert_eq!(Unit::Rate(MaterialUnit::Tonne, TimeUnit::Hour).symbol(), "t/h");
    }

    #[test]
    fn test_unit_serde_as_symbol() {
        let q = per_minute(2.0);
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, r#"{"amount":2.0,"unit":"unit/min"}"#);
        let back: Quantity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn test_material_divided_by_rate_is_time() {
        let arithmetic = StandardArithmetic::new();
        let time = arithmetic.divide(&units(1000.0), &per_minute(2.0)).unwrap();
        assert_eq!(time.unit, Unit::Time(TimeUnit::Minute));
        assert_eq!(time.amount, 500.0);
        assert_eq!(arithmetic.to_duration(&time).unwrap(), Duration::minutes(500));
    }

    #[test]
    fn test_dozen_divided_by_unit_rate_converts_first() {
        let arithmetic = StandardArithmetic::new();
        let dozen = Quantity::new(1.0, Unit::Material(MaterialUnit::Dozen));
        let time = arithmetic.divide(&dozen, &per_minute(6.0)).unwrap();
        assert_eq!(time.amount, 2.0);
    }

    #[test]
    fn test_to_duration_truncates_sub_second() {
        let arithmetic = StandardArithmetic::new();
        // 7 件 ÷ 3 件/秒 = 2.333.. 秒 -> 2 秒
        let rate = Quantity::new(3.0, Unit::Rate(MaterialUnit::Unit, TimeUnit::Second));
        let time = arithmetic.divide(&units(7.0), &rate).unwrap();
        assert_eq!(arithmetic.to_duration(&time).unwrap(), Duration::seconds(2));

        // 截断而非四舍五入: 0.9 秒 -> 0
        let almost = Quantity::new(0.9, Unit::Time(TimeUnit::Second));
        assert_eq!(arithmetic.to_duration(&almost).unwrap(), Duration::zero());
    }

    #[test]
    fn test_to_duration_out_of_range_is_invalid_conversion() {
        let arithmetic = StandardArithmetic::new();
        // 超出 Duration 上限 (约 9.2e15 秒)
        for amount in [1e17, -1e17, 1e300, f64::INFINITY] {
            let time = Quantity::new(amount, Unit::Time(TimeUnit::Second));
            assert!(matches!(
                arithmetic.to_duration(&time),
                Err(LossError::InvalidConversion { to, .. }) if to == "s"
            ));
        }

        // 上限以内仍正常换算
        let days = Quantity::new(36_500.0, Unit::Time(TimeUnit::Day));
        assert_eq!(arithmetic.to_duration(&days).unwrap(), Duration::days(36_500));
    }

    #[test]
    fn test_rate_times_time_is_material() {
        let arithmetic = StandardArithmetic::new();
        let hour = Quantity::new(1.0, Unit::Time(TimeUnit::Hour));
        let produced = arithmetic.multiply(&per_minute(2.0), &hour).unwrap();
        assert_eq!(produced, units(120.0));

        let produced = arithmetic.multiply(&hour, &per_minute(2.0)).unwrap();
        assert_eq!(produced, units(120.0));
    }

    #[test]
    fn test_add_converts_to_left_unit() {
        let arithmetic = StandardArithmetic::new();
        let kg = Quantity::new(500.0, Unit::Material(MaterialUnit::Kilogram));
        let t = Quantity::new(2.0, Unit::Material(MaterialUnit::Tonne));
        let sum = arithmetic.add(&t, &kg).unwrap();
        assert_eq!(sum, Quantity::new(2.5, Unit::Material(MaterialUnit::Tonne)));
        let diff = arithmetic.subtract(&kg, &kg).unwrap();
        assert_eq!(diff.amount, 0.0);
    }

    #[test]
    fn test_incompatible_dimensions_fail() {
        let arithmetic = StandardArithmetic::new();
        let kg = Quantity::new(1.0, Unit::Material(MaterialUnit::Kilogram));
        assert!(matches!(
            arithmetic.add(&kg, &units(1.0)),
            Err(LossError::InvalidConversion { .. })
        ));
        assert!(matches!(
            arithmetic.divide(&kg, &per_minute(1.0)),
            Err(LossError::InvalidConversion { .. })
        ));
        assert!(matches!(
            arithmetic.to_duration(&kg),
            Err(LossError::InvalidConversion { .. })
        ));
    }

    #[test]
    fn test_divide_by_zero_rate_fails() {
        let arithmetic = StandardArithmetic::new();
        assert!(arithmetic.divide(&units(10.0), &per_minute(0.0)).is_err());
    }

    #[test]
    fn test_same_dimension_ratio_is_dimensionless() {
        let arithmetic = StandardArithmetic::new();
        let ratio = arithmetic
            .divide(&units(6.0), &Quantity::new(1.0, Unit::Material(MaterialUnit::Dozen)))
            .unwrap();
        assert_eq!(ratio, Quantity::new(0.5, Unit::One));
    }
}
