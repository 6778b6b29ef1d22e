//! Per-instrument analysis reports and the batch result

use crate::backtest::VarBacktest;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::models::{Distribution, GarchParams, ModelSelection};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use stat_math::Summary;
use std::fs;
use std::path::Path;

/// AIC of both candidate fits
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AicValues {
    pub normal: f64,
    pub t: f64,
}

/// Observation count and conditional volatility range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolatilitySummary {
    pub total_observations: usize,
    pub mean_volatility: f64,
    pub max_volatility: f64,
    pub min_volatility: f64,
}

/// Fitted parameters of the selected model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelParameters {
    #[serde(flatten)]
    pub params: GarchParams,
    pub log_likelihood: f64,
    pub persistence: f64,
    pub long_run_volatility: Option<f64>,
}

/// Everything computed for one instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub selected_model: Distribution,
    pub aic_values: AicValues,
    pub parameters: ModelParameters,
    pub volatility: Vec<f64>,
    pub volatility_index: Vec<String>,
    pub diagnostics: Diagnostics,
    pub var_backtest: VarBacktest,
    pub summary: VolatilitySummary,
}

impl AnalysisReport {
    /// Assemble a report from the selected model and its test results.
    ///
    /// `total_observations` is the length of the return series the model was
    /// fitted on.
    pub fn new(
        ticker: &str,
        selection: &ModelSelection,
        diagnostics: Diagnostics,
        var_backtest: VarBacktest,
        total_observations: usize,
    ) -> Result<Self> {
        let model = selection.model();
        let volatility = model.conditional_volatility();
        let stats = Summary::from_values(volatility.values())?;
        let params = *model.params();

        Ok(Self {
            ticker: ticker.to_string(),
            selected_model: selection.selected(),
            aic_values: AicValues {
                normal: selection.aic_normal(),
                t: selection.aic_student_t(),
            },
            parameters: ModelParameters {
                params,
                log_likelihood: model.log_likelihood(),
                persistence: params.persistence(),
                long_run_volatility: params.long_run_volatility(),
            },
            volatility: volatility.values().to_vec(),
            volatility_index: volatility.index_labels(),
            diagnostics,
            var_backtest,
            summary: VolatilitySummary {
                total_observations,
                mean_volatility: stats.mean,
                max_volatility: stats.max,
                min_volatility: stats.min,
            },
        })
    }
}

/// Result for one instrument: a full report or the reason it failed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InstrumentOutcome {
    Report(Box<AnalysisReport>),
    Failed { error: String },
}

impl InstrumentOutcome {
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            InstrumentOutcome::Report(report) => Some(report.as_ref()),
            InstrumentOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            InstrumentOutcome::Report(_) => None,
            InstrumentOutcome::Failed { error } => Some(error.as_str()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.report().is_some()
    }
}

/// Outcomes for a batch of instruments, in run order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    entries: Vec<(String, InstrumentOutcome)>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instrument: &str, outcome: InstrumentOutcome) {
        self.entries.push((instrument.to_string(), outcome));
    }

    pub fn get(&self, instrument: &str) -> Option<&InstrumentOutcome> {
        self.entries
            .iter()
            .find(|(id, _)| id == instrument)
            .map(|(_, outcome)| outcome)
    }

    /// Instrument ids in run order
    pub fn instruments(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InstrumentOutcome)> + '_ {
        self.entries.iter().map(|(id, outcome)| (id.as_str(), outcome))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of instruments with a full report
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_ok()).count()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the batch as pretty JSON, creating parent directories
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

impl Serialize for BatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (instrument, outcome) in &self.entries {
            map.serialize_entry(instrument, outcome)?;
        }
        map.end()
    }
}
