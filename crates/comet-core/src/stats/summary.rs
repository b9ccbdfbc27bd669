use tracing::debug;

use crate::comet::{Comet, CometStatus, Grouping, StatusSet};

use super::field::{FieldStats, MeasurementField};

/// Summary statistics of the measured comets whose status is in `statuses`.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationSummary {
    pub statuses: StatusSet,
    /// Comets in the population.
    pub count: usize,
    /// Comets of any status that carry measurements.
    pub measurable_count: usize,
    pub invalid_size_count: usize,
    /// One entry per field of [`MeasurementField::ALL`], `None` for an
    /// empty population.
    pub fields: Vec<(MeasurementField, Option<FieldStats>)>,
}

impl PopulationSummary {
    pub fn field(&self, field: MeasurementField) -> Option<&FieldStats> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, stats)| stats.as_ref())
    }
}

pub fn summarize(comets: &[&Comet], statuses: StatusSet) -> PopulationSummary {
    let population: Vec<_> = comets
        .iter()
        .filter(|c| statuses.contains(c.status))
        .filter_map(|c| c.measurements.as_ref())
        .collect();

    let measurable_count = comets
        .iter()
        .filter(|c| c.can_calculate_stats() && c.measurements.is_some())
        .count();
    let invalid_size_count = comets
        .iter()
        .filter(|c| c.status == CometStatus::InvalidSize)
        .count();

    let fields = MeasurementField::ALL
        .iter()
        .map(|&field| {
            let values: Vec<f64> = population.iter().map(|m| field.value(m)).collect();
            (field, FieldStats::from_values(&values))
        })
        .collect();

    debug!(count = population.len(), measurable_count, "Population summarized");

    PopulationSummary {
        statuses,
        count: population.len(),
        measurable_count,
        invalid_size_count,
        fields,
    }
}

/// Summaries for the four report groupings, in report order.
pub fn summarize_groupings(comets: &[&Comet]) -> Vec<(Grouping, PopulationSummary)> {
    Grouping::ALL
        .iter()
        .map(|&g| (g, summarize(comets, g.statuses())))
        .collect()
}
