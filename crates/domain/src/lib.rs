#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use derive_more::{AsRef, Deref, Display, Into};
use thiserror::Error;

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.len();

        if len > 64 {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct SetCount(u32);

impl SetCount {
    pub fn new(value: u32) -> Result<Self, SetCountError> {
        if !(1..100).contains(&value) {
            return Err(SetCountError::OutOfRange);
        }

        Ok(Self(value))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SetCountError {
    #[error("Set count must be in the range 1 to 99")]
    OutOfRange,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Time(u32);

impl Time {
    pub fn new(value: u32) -> Result<Self, TimeError> {
        if !(0..1000).contains(&value) {
            return Err(TimeError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl From<Time> for i64 {
    fn from(value: Time) -> Self {
        i64::from(value.0)
    }
}

impl TryFrom<&str> for Time {
    type Error = TimeError;

    /// Parse a time from a plain number of seconds or a `MM:SS` duration.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if let Some((minutes, seconds)) = value.split_once(':') {
            let minutes = minutes.parse::<u32>().map_err(|_| TimeError::ParseError)?;
            let seconds = seconds.parse::<u32>().map_err(|_| TimeError::ParseError)?;
            let total = minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds))
                .ok_or(TimeError::OutOfRange)?;
            Time::new(total)
        } else {
            match value.parse::<u32>() {
                Ok(parsed_value) => Time::new(parsed_value),
                Err(_) => Err(TimeError::ParseError),
            }
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum TimeError {
    #[error("Time must be in the range 0 to 999 s")]
    OutOfRange,
    #[error("Time must be an integer or a MM:SS duration")]
    ParseError,
}

/// Target of a single set, either a rep count or a duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effort {
    Reps(Reps),
    Duration(Time),
}

impl Effort {
    #[must_use]
    pub fn is_time_based(self) -> bool {
        matches!(self, Effort::Duration(_))
    }
}

impl TryFrom<&str> for Effort {
    type Error = EffortError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.contains(':') {
            Ok(Effort::Duration(Time::try_from(value)?))
        } else {
            Ok(Effort::Reps(Reps::try_from(value)?))
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum EffortError {
    #[error(transparent)]
    Reps(#[from] RepsError),
    #[error(transparent)]
    Time(#[from] TimeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Kilograms,
    Meters,
    Seconds,
    Count,
}

impl Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Unit::Kilograms => "kg",
                Unit::Meters => "m",
                Unit::Seconds => "s",
                Unit::Count => "",
            }
        )
    }
}

/// A measurable quantity tracked once per exercise or once per set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    pub name: Name,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub name: Name,
    pub sets: SetCount,
    pub effort: Effort,
    pub rest: Time,
    pub equipment: Option<String>,
    pub video: Option<String>,
    pub notes: Option<String>,
    pub exercise_metrics: Vec<MetricDefinition>,
    pub set_metrics: Vec<MetricDefinition>,
}

impl Exercise {
    #[must_use]
    pub fn is_time_based(&self) -> bool {
        self.effort.is_time_based()
    }

    /// Nominal value used to seed the tracking form input for a metric.
    ///
    /// Metrics without a corresponding exercise field start out blank.
    #[must_use]
    pub fn nominal(&self, metric: &MetricDefinition) -> Option<i64> {
        match metric.name.as_ref().as_str() {
            "reps" => match self.effort {
                Effort::Reps(reps) => Some(i64::from(u32::from(reps))),
                Effort::Duration(time) => Some(i64::from(time)),
            },
            "rest" => Some(i64::from(self.rest)),
            _ => None,
        }
    }
}

/// Per-set metric values captured at the end of an exercise, one entry per
/// set in set order.
#[derive(Deref, Debug, Default, Clone, PartialEq, Eq)]
pub struct SetMetricRecord(Vec<BTreeMap<Name, i64>>);

impl From<Vec<BTreeMap<Name, i64>>> for SetMetricRecord {
    fn from(value: Vec<BTreeMap<Name, i64>>) -> Self {
        Self(value)
    }
}

impl FromIterator<BTreeMap<Name, i64>> for SetMetricRecord {
    fn from_iter<T: IntoIterator<Item = BTreeMap<Name, i64>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
