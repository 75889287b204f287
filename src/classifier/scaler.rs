use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::ModelError;
use crate::features::FEATURE_COUNT;

/// Per-feature standardization, frozen after fitting
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations.
    /// Columns with zero deviation keep a scale of 1.
    pub fn fit(data: &Array2<f64>) -> Result<Self, ModelError> {
        let mean = data
            .mean_axis(Axis(0))
            .ok_or(ModelError::EmptyTrainingSet)?;
        let scale = data
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std == 0.0 { 1.0 } else { std });

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        (data - &self.mean) / &self.scale
    }

    pub fn transform_row(&self, row: &[f64; FEATURE_COUNT]) -> Array1<f64> {
        (&ArrayView1::from(&row[..]) - &self.mean) / &self.scale
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}
