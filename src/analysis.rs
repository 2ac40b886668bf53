// Comparative analysis over the persisted tidy dataset

pub mod chart;
pub mod comparative;

pub use chart::ChartSeries;
pub use comparative::{
    event_impact, pivot_by_month_across_years, ImpactStats, InsufficientBaselineData,
    MonthlyPivot,
};
