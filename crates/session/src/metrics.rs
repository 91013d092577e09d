use std::{collections::BTreeMap, iter::zip};

use log::warn;
use serde::Serialize;

use setpace_domain::{Exercise, MetricDefinition, SetMetricRecord};

/// Input grid of the tracking form, one row per set and one cell per per-set
/// metric.
///
/// The form holds the raw input text itself; rendering is a projection of
/// this state and submission never touches the rendered output.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsForm {
    exercise_metrics: Vec<MetricDefinition>,
    metrics: Vec<MetricDefinition>,
    rows: Vec<Vec<String>>,
}

impl MetricsForm {
    /// Create a form for an exercise, seeding each cell with the exercise's
    /// nominal value for the metric where one exists.
    #[must_use]
    pub fn new(exercise: &Exercise) -> Self {
        let row = exercise
            .set_metrics
            .iter()
            .map(|metric| {
                exercise
                    .nominal(metric)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();
        Self {
            exercise_metrics: exercise.exercise_metrics.clone(),
            metrics: exercise.set_metrics.clone(),
            rows: (0..u32::from(exercise.sets)).map(|_| row.clone()).collect(),
        }
    }

    /// Metrics tracked once per exercise, rendered as plain headers.
    #[must_use]
    pub fn exercise_metrics(&self) -> &[MetricDefinition] {
        &self.exercise_metrics
    }

    #[must_use]
    pub fn metrics(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Replace the raw input text of one cell. Out-of-range indices no-op.
    pub fn set_value(&mut self, set_idx: usize, metric_idx: usize, input: &str) {
        match self
            .rows
            .get_mut(set_idx)
            .and_then(|row| row.get_mut(metric_idx))
        {
            Some(cell) => *cell = input.to_string(),
            None => warn!("input for nonexistent form cell ({set_idx}, {metric_idx})"),
        }
    }

    /// Extract the current input values, one entry per set.
    ///
    /// Empty or unparsable cells yield 0. No range validation is performed.
    #[must_use]
    pub fn collect(&self) -> SetMetricRecord {
        self.rows
            .iter()
            .map(|row| {
                zip(&self.metrics, row)
                    .map(|(metric, cell)| (metric.name.clone(), parse_int(cell)))
                    .collect::<BTreeMap<_, _>>()
            })
            .collect()
    }

    #[must_use]
    pub fn view(&self) -> FormView {
        FormView {
            exercise_metrics: self
                .exercise_metrics
                .iter()
                .map(|m| m.name.as_ref().to_string())
                .collect(),
            metrics: self
                .metrics
                .iter()
                .map(|m| m.name.as_ref().to_string())
                .collect(),
            rows: self.rows.clone(),
        }
    }
}

/// Snapshot of the form for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    /// Headers for metrics tracked once per exercise.
    pub exercise_metrics: Vec<String>,
    pub metrics: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse the longest leading optionally-signed decimal integer, yielding 0
/// for empty or unparsable input.
fn parse_int(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = rest
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>();
    let value = digits.parse::<i64>().unwrap_or(0);
    if negative { -value } else { value }
}
