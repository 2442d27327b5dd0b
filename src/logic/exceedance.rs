use crate::models::{
    ClimateSeries, DailyRecord, OddsReport, OddsResult, ThresholdSet, WeatherSummary,
};
use chrono::{Datelike, NaiveDate};

/// Ordinal day of the year, 1-366.
///
/// Matching is on this ordinal rather than on month and day, so after
/// February 28 a leap year lines up with the following day of a common
/// year, and day 366 only ever matches other leap years.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Records from every year that fall on the same day of the year as `target`.
pub fn matching_records(series: &ClimateSeries, target: NaiveDate) -> Vec<DailyRecord> {
    let target_day = day_of_year(target);
    series
        .records()
        .filter(|record| day_of_year(record.date) == target_day)
        .collect()
}

/// Historical odds of each requested threshold being crossed on `target`'s day of the year.
pub fn compute_odds(
    series: &ClimateSeries,
    target: NaiveDate,
    thresholds: &ThresholdSet,
) -> OddsReport {
    let rows = matching_records(series, target);
    tracing::debug!(
        "{} historical days match day {} of the year",
        rows.len(),
        day_of_year(target)
    );

    // No matches report 0% rather than dividing by zero
    let denominator = rows.len().max(1) as f64;

    let results = thresholds
        .iter()
        .map(|(category, threshold)| {
            let count = rows
                .iter()
                .filter(|row| category.is_exceeded_by(row, threshold))
                .count();
            let percent = (100.0 * count as f64 / denominator).clamp(0.0, 100.0);
            OddsResult::new(category, threshold, percent)
        })
        .collect();

    OddsReport {
        results,
        summary: summarize(&rows),
    }
}

/// Mean conditions over the rows, or `None` when there are no rows.
pub fn summarize(rows: &[DailyRecord]) -> Option<WeatherSummary> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;
    let mean = |f: fn(&DailyRecord) -> f64| rows.iter().map(f).sum::<f64>() / n;

    Some(WeatherSummary {
        avg_high_c: mean(|r| r.max_temp_c),
        avg_low_c: mean(|r| r.min_temp_c),
        avg_precip_mm: mean(|r| r.precipitation_mm),
        avg_wind_kph: mean(|r| r.wind_speed_kph),
    })
}
