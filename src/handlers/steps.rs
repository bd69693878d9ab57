use serde::Deserialize;

use crate::error::ArgumentError;
use crate::integrator::Steps;

/// 查询参数中的步长，三个要么都给，要么都不给
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StepsQuery {
    pub dx: Option<f64>,
    pub dy: Option<f64>,
    pub dz: Option<f64>,
}

impl StepsQuery {
    /// 解析步长：全部缺省时使用文件自带的默认步长
    ///
    /// 零和负步长照常接受，NaN/Inf 视为参数错误。
    pub fn resolve(&self, default: Option<Steps>, source: &str) -> Result<Steps, ArgumentError> {
        let steps = match (self.dx, self.dy, self.dz) {
            (None, None, None) => {
                return default.ok_or_else(|| ArgumentError::NoDefaultSteps(source.to_string()));
            }
            (Some(dx), Some(dy), Some(dz)) => Steps::new(dx, dy, dz),
            (None, _, _) => return Err(ArgumentError::MissingStep("dx")),
            (_, None, _) => return Err(ArgumentError::MissingStep("dy")),
            (_, _, None) => return Err(ArgumentError::MissingStep("dz")),
        };

        for (name, value) in [("dx", steps.dx), ("dy", steps.dy), ("dz", steps.dz)] {
            if !value.is_finite() {
                return Err(ArgumentError::NonFiniteStep { name, value });
            }
        }
        Ok(steps)
    }
}
