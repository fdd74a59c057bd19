use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::FieldError;

/// Ordered sequence of timestamps attached to a labeled array.
///
/// Always contains at least one instant; a single instant marks a
/// time-invariant array.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    times: Vec<DateTime<Utc>>,
}

/// Time selection criterion for label-based subsetting
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSel {
    /// Positional index (negative counts from the end)
    Index(i64),
    /// Positional index list
    Indices(Vec<i64>),
    /// Partial ISO label, e.g. "2018-01" or "2018-01-15 12:30"
    Label(String),
    /// Exact instant
    At(DateTime<Utc>),
    /// Inclusive label range; open bounds select from the start / to the end
    Range {
        start: Option<String>,
        end: Option<String>,
    },
    /// Instants taken from another array's time axis (exact matches)
    Steps(Vec<DateTime<Utc>>),
}

impl TimeAxis {
    /// Create a time axis from a list of timestamps
    pub fn new(times: Vec<DateTime<Utc>>) -> Result<Self, FieldError> {
        if times.is_empty() {
            return Err(FieldError::InvalidTime(
                "time axis must contain at least one timestamp".to_string(),
            ));
        }
        Ok(Self { times })
    }

    /// Single-instant (time-invariant) axis
    pub fn single(t: DateTime<Utc>) -> Self {
        Self { times: vec![t] }
    }

    /// Equidistant axis starting at `start` with `step_seconds` between steps
    pub fn equidistant(start: DateTime<Utc>, step_seconds: f64, n: usize) -> Result<Self, FieldError> {
        if n == 0 {
            return Err(FieldError::InvalidTime(
                "time axis must contain at least one timestamp".to_string(),
            ));
        }
        let step_ms = (step_seconds * 1000.0).round() as i64;
        let times = (0..n)
            .map(|i| start + Duration::milliseconds(step_ms * i as i64))
            .collect();
        Ok(Self { times })
    }

    /// Parse a datetime string in format "YYYY-MM-DD HH:MM:SS" (or with 'T')
    pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, FieldError> {
        let normalized = s.replace('T', " ");
        NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S")
            .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
            .map_err(|_| FieldError::InvalidTime(s.to_string()))
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn as_slice(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn get(&self, i: usize) -> Option<DateTime<Utc>> {
        self.times.get(i).copied()
    }

    /// First time instance
    pub fn start_time(&self) -> DateTime<Utc> {
        self.times[0]
    }

    /// Last time instance
    pub fn end_time(&self) -> DateTime<Utc> {
        self.times[self.times.len() - 1]
    }

    /// Is the axis equidistant in time?
    pub fn is_equidistant(&self) -> bool {
        if self.times.len() < 3 {
            return true;
        }
        let step = self.times[1] - self.times[0];
        self.times.windows(2).all(|w| w[1] - w[0] == step)
    }

    /// Time step in seconds if equidistant and at least two instants
    pub fn timestep(&self) -> Option<f64> {
        if self.times.len() > 1 && self.is_equidistant() {
            let dt = self.times[1] - self.times[0];
            Some(dt.num_milliseconds() as f64 / 1000.0)
        } else {
            None
        }
    }

    /// New axis keeping only the given positions
    pub fn select(&self, idx: &[usize]) -> Self {
        Self {
            times: idx.iter().map(|&i| self.times[i]).collect(),
        }
    }

    /// Axis reduced to its first instant (representative of an aggregation)
    pub fn first_only(&self) -> Self {
        Self {
            times: vec![self.times[0]],
        }
    }

    /// Times as fractional seconds since the Unix epoch
    pub fn as_epoch_seconds(&self) -> Vec<f64> {
        self.times
            .iter()
            .map(|t| t.timestamp_millis() as f64 / 1000.0)
            .collect()
    }

    /// Resolve a time criterion into positional indices.
    ///
    /// Label-based criteria that match nothing are an error ("No timesteps
    /// found"); positional criteria are bounds-checked.
    pub fn indices_for(&self, sel: &TimeSel) -> Result<Vec<usize>, FieldError> {
        match sel {
            TimeSel::Index(i) => Ok(vec![self.wrap_index(*i)?]),
            TimeSel::Indices(idx) => idx.iter().map(|&i| self.wrap_index(i)).collect(),
            TimeSel::Label(label) => {
                let (lo, hi) = parse_partial_label(label)?;
                self.in_window(lo, hi)
            }
            TimeSel::At(t) => {
                let idx: Vec<usize> = self
                    .times
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| *v == t)
                    .map(|(i, _)| i)
                    .collect();
                if idx.is_empty() {
                    Err(FieldError::NoTimestepsFound)
                } else {
                    Ok(idx)
                }
            }
            TimeSel::Range { start, end } => {
                let lo = match start {
                    Some(s) => parse_partial_label(s)?.0,
                    None => self.start_time(),
                };
                // label ranges are inclusive of the end label's whole window
                let hi = match end {
                    Some(s) => parse_partial_label(s)?.1,
                    None => self.end_time() + Duration::milliseconds(1),
                };
                self.in_window(lo, hi)
            }
            TimeSel::Steps(steps) => {
                let idx: Vec<usize> = self
                    .times
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| steps.contains(*v))
                    .map(|(i, _)| i)
                    .collect();
                if idx.is_empty() {
                    Err(FieldError::NoTimestepsFound)
                } else {
                    Ok(idx)
                }
            }
        }
    }

    fn in_window(&self, lo: DateTime<Utc>, hi: DateTime<Utc>) -> Result<Vec<usize>, FieldError> {
        let idx: Vec<usize> = self
            .times
            .iter()
            .enumerate()
            .filter(|(_, t)| **t >= lo && **t < hi)
            .map(|(i, _)| i)
            .collect();
        if idx.is_empty() {
            Err(FieldError::NoTimestepsFound)
        } else {
            Ok(idx)
        }
    }

    fn wrap_index(&self, i: i64) -> Result<usize, FieldError> {
        let len = self.times.len() as i64;
        let j = if i < 0 { i + len } else { i };
        if j < 0 || j >= len {
            Err(FieldError::IndexOutOfBounds { index: i, len: self.times.len() })
        } else {
            Ok(j as usize)
        }
    }
}

/// Parse a partial ISO timestamp into the half-open window it denotes.
///
/// Accepted shapes: "YYYY", "YYYY-MM", "YYYY-MM-DD", optionally followed by
/// "HH", "HH:MM" or "HH:MM:SS" (separated by a space or 'T'). The window end
/// is the start advanced by one unit of the finest given component.
pub fn parse_partial_label(label: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), FieldError> {
    let invalid = || FieldError::InvalidTime(label.to_string());

    let trimmed = label.trim();
    let normalized = trimmed.replace('T', " ");
    let mut parts = normalized.splitn(2, ' ');
    let date_part = parts.next().ok_or_else(invalid)?;
    let time_part = parts.next();

    let date_fields: Vec<&str> = date_part.split('-').collect();
    if date_fields.is_empty() || date_fields.len() > 3 {
        return Err(invalid());
    }

    let year: i32 = date_fields[0].parse().map_err(|_| invalid())?;
    let month: u32 = if date_fields.len() > 1 {
        date_fields[1].parse().map_err(|_| invalid())?
    } else {
        1
    };
    let day: u32 = if date_fields.len() > 2 {
        date_fields[2].parse().map_err(|_| invalid())?
    } else {
        1
    };

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

    if let Some(tp) = time_part {
        if date_fields.len() != 3 {
            return Err(invalid());
        }
        let time_fields: Vec<&str> = tp.split(':').collect();
        if time_fields.is_empty() || time_fields.len() > 3 {
            return Err(invalid());
        }
        let hour: u32 = time_fields[0].parse().map_err(|_| invalid())?;
        let minute: u32 = if time_fields.len() > 1 {
            time_fields[1].parse().map_err(|_| invalid())?
        } else {
            0
        };
        let second: u32 = if time_fields.len() > 2 {
            time_fields[2].parse().map_err(|_| invalid())?
        } else {
            0
        };
        let start = date.and_hms_opt(hour, minute, second).ok_or_else(invalid)?;
        let start = DateTime::<Utc>::from_naive_utc_and_offset(start, Utc);
        let span = match time_fields.len() {
            1 => Duration::hours(1),
            2 => Duration::minutes(1),
            _ => Duration::seconds(1),
        };
        return Ok((start, start + span));
    }

    let start = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    let start = DateTime::<Utc>::from_naive_utc_and_offset(start, Utc);
    let end = match date_fields.len() {
        1 => NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(invalid)?,
        2 => {
            let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
            NaiveDate::from_ymd_opt(ny, nm, 1).ok_or_else(invalid)?
        }
        _ => date.succ_opt().ok_or_else(invalid)?,
    };
    let end = DateTime::<Utc>::from_naive_utc_and_offset(
        end.and_hms_opt(0, 0, 0).ok_or_else(invalid)?,
        Utc,
    );
    Ok((start, end))
}
