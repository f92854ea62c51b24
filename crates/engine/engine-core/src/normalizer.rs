//! Min-max normalizer

use engine_api::{EngineError, NormalizationParameters, Result};

/// Normalize data to the [0, 1] range of the training series.
///
/// Fitted exactly once; afterwards the parameters are frozen and every
/// transform uses them unchanged.
#[derive(Debug, Clone, Default)]
pub struct MinMaxNormalizer {
    params: Option<NormalizationParameters>,
}

impl MinMaxNormalizer {
    pub fn new() -> Self {
        Self { params: None }
    }

    /// A normalizer restored from persisted parameters.
    pub fn from_parameters(params: NormalizationParameters) -> Self {
        Self {
            params: Some(params),
        }
    }

    /// Learn min and max from `data`.
    pub fn fit(&mut self, data: &[f64]) -> Result<NormalizationParameters> {
        if self.params.is_some() {
            return Err(EngineError::AlreadyFitted);
        }
        if let Some(i) = data.iter().position(|v| !v.is_finite()) {
            return Err(EngineError::InvalidData(format!(
                "value at position {i} is not finite: {}",
                data[i]
            )));
        }
        let params = NormalizationParameters::fit(data)?;
        self.params = Some(params);
        Ok(params)
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    pub fn parameters(&self) -> Result<NormalizationParameters> {
        self.params.ok_or(EngineError::NotFitted)
    }

    pub fn transform_value(&self, value: f64) -> Result<f64> {
        Ok(self.parameters()?.transform(value))
    }

    pub fn inverse_transform_value(&self, value: f64) -> Result<f64> {
        Ok(self.parameters()?.inverse_transform(value))
    }

    pub fn transform(&self, data: &[f64]) -> Result<Vec<f64>> {
        let params = self.parameters()?;
        Ok(data.iter().map(|&x| params.transform(x)).collect())
    }

    pub fn inverse_transform(&self, data: &[f64]) -> Result<Vec<f64>> {
        let params = self.parameters()?;
        Ok(data.iter().map(|&x| params.inverse_transform(x)).collect())
    }
}
