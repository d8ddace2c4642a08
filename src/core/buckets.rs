//! Discrete colour buckets for heatmap and correlation cells.
//!
//! Each kind of value has an ordered rule table; the first matching rule wins,
//! which pins down which bucket a boundary value lands in.

/// Which rule table to classify against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
    Correlation,
    PeriodicReturn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    NoData,

    // Correlation
    SelfCorrelation,
    StrongPositive,
    ModeratePositive,
    WeakPositive,
    StrongNegative,
    ModerateNegative,
    WeakNegative,
    NearZero,

    // Periodic return, most negative first
    DeepLoss,
    LargeLoss,
    ModerateLoss,
    SmallLoss,
    Zero,
    SmallGain,
    ModerateGain,
    LargeGain,
    DeepGain,
}

/// A single comparison against a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    Equal(f64),
    Above(f64),
    Below(f64),
    AtMost(f64),
    Always,
}

impl Predicate {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Predicate::Equal(t) => value == t,
            Predicate::Above(t) => value > t,
            Predicate::Below(t) => value < t,
            Predicate::AtMost(t) => value <= t,
            Predicate::Always => true,
        }
    }
}

pub const CORRELATION_RULES: &[(Predicate, Bucket)] = &[
    (Predicate::Equal(1.0), Bucket::SelfCorrelation),
    (Predicate::Above(0.8), Bucket::StrongPositive),
    (Predicate::Above(0.5), Bucket::ModeratePositive),
    (Predicate::Above(0.2), Bucket::WeakPositive),
    (Predicate::Below(-0.8), Bucket::StrongNegative),
    (Predicate::Below(-0.5), Bucket::ModerateNegative),
    (Predicate::Below(-0.2), Bucket::WeakNegative),
    (Predicate::Always, Bucket::NearZero),
];

pub const PERIODIC_RETURN_RULES: &[(Predicate, Bucket)] = &[
    (Predicate::AtMost(-0.10), Bucket::DeepLoss),
    (Predicate::AtMost(-0.05), Bucket::LargeLoss),
    (Predicate::AtMost(-0.02), Bucket::ModerateLoss),
    (Predicate::Below(0.0), Bucket::SmallLoss),
    (Predicate::Equal(0.0), Bucket::Zero),
    (Predicate::Below(0.02), Bucket::SmallGain),
    (Predicate::Below(0.05), Bucket::ModerateGain),
    (Predicate::Below(0.10), Bucket::LargeGain),
    (Predicate::Always, Bucket::DeepGain),
];

impl BucketKind {
    pub fn rules(&self) -> &'static [(Predicate, Bucket)] {
        match self {
            BucketKind::Correlation => CORRELATION_RULES,
            BucketKind::PeriodicReturn => PERIODIC_RETURN_RULES,
        }
    }
}

pub fn classify(value: Option<f64>, kind: BucketKind) -> Bucket {
    let Some(value) = value else {
        return Bucket::NoData;
    };
    kind.rules()
        .iter()
        .find(|(predicate, _)| predicate.matches(value))
        .map_or(Bucket::NoData, |(_, bucket)| *bucket)
}
