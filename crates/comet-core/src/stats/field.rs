use crate::analysis::Measurements;

/// The sixteen reported measurement columns, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeasurementField {
    CometLength,
    HeadLength,
    TailLength,
    HeadArea,
    TailArea,
    CometArea,
    HeadIntensity,
    TailIntensity,
    CometIntensity,
    HeadDna,
    TailDna,
    CometDna,
    HeadDnaPercent,
    TailDnaPercent,
    TailMoment,
    TailOliveMoment,
}

impl MeasurementField {
    pub const ALL: [MeasurementField; 16] = [
        Self::CometLength,
        Self::HeadLength,
        Self::TailLength,
        Self::HeadArea,
        Self::TailArea,
        Self::CometArea,
        Self::HeadIntensity,
        Self::TailIntensity,
        Self::CometIntensity,
        Self::HeadDna,
        Self::TailDna,
        Self::CometDna,
        Self::HeadDnaPercent,
        Self::TailDnaPercent,
        Self::TailMoment,
        Self::TailOliveMoment,
    ];

    /// Column header used in the CSV report.
    pub fn header(self) -> &'static str {
        match self {
            Self::CometLength => "Length",
            Self::HeadLength => "HeadLength",
            Self::TailLength => "TailLength",
            Self::HeadArea => "HeadArea",
            Self::TailArea => "TailArea",
            Self::CometArea => "CometArea",
            Self::HeadIntensity => "HeadIntensity",
            Self::TailIntensity => "TailIntensity",
            Self::CometIntensity => "CometIntensity",
            Self::HeadDna => "HeadDNA",
            Self::TailDna => "TailDNA",
            Self::CometDna => "CometDNA",
            Self::HeadDnaPercent => "HeadDNA%",
            Self::TailDnaPercent => "TailDNA%",
            Self::TailMoment => "TailMoment",
            Self::TailOliveMoment => "TailOliveMoment",
        }
    }

    pub fn value(self, m: &Measurements) -> f64 {
        match self {
            Self::CometLength => m.comet_length,
            Self::HeadLength => m.head_length,
            Self::TailLength => m.tail_length,
            Self::HeadArea => m.head_area,
            Self::TailArea => m.tail_area,
            Self::CometArea => m.comet_area,
            Self::HeadIntensity => m.head_intensity,
            Self::TailIntensity => m.tail_intensity,
            Self::CometIntensity => m.comet_intensity,
            Self::HeadDna => m.head_dna,
            Self::TailDna => m.tail_dna,
            Self::CometDna => m.comet_dna,
            Self::HeadDnaPercent => m.head_dna_percent,
            Self::TailDnaPercent => m.tail_dna_percent,
            Self::TailMoment => m.tail_moment,
            Self::TailOliveMoment => m.tail_olive_moment,
        }
    }
}

impl std::fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Descriptive statistics of one measurement over a population.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; 0 for a single value.
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

impl FieldStats {
    /// Statistics of `values`, or `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let sum_sq: f64 = sorted.iter().map(|v| v * v).sum();
        let mean = sum / n as f64;

        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        let stddev = if n > 1 {
            ((sum_sq - sum * sum / n as f64) / (n - 1) as f64)
                .max(0.0)
                .sqrt()
        } else {
            0.0
        };

        Some(Self {
            count: n,
            mean,
            median,
            stddev,
            min: sorted[0],
            max: sorted[n - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_count_median_interpolates() {
        let stats = FieldStats::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_single_value_has_zero_stddev() {
        let stats = FieldStats::from_values(&[7.5]).unwrap();
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.mean, 7.5);
        assert_eq!(stats.median, 7.5);
    }

    #[test]
    fn test_empty_values() {
        assert!(FieldStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_headers_are_unique() {
        let mut headers: Vec<_> = MeasurementField::ALL.iter().map(|f| f.header()).collect();
        headers.sort();
        headers.dedup();
        assert_eq!(headers.len(), 16);
    }
}
