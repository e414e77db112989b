/**
 * Analytics Rollup
 * Pure aggregation over daily counter rows: totals, week-over-week change,
 * and the 7-day chart series
 */
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// One day's counters as fetched from the store.
#[derive(Debug, Clone)]
pub struct DayCounters {
    pub date: NaiveDate,
    pub page_views: i64,
    pub project_clicks: i64,
    pub unique_visitors: i64,
}

/// Counter totals over a span of days.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterTotals {
    pub page_views: i64,
    pub project_clicks: i64,
    pub unique_visitors: i64,
}

/// Percent change of each metric, trailing 7 days vs the 7 before.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekComparison {
    pub views_change: f64,
    pub clicks_change: f64,
}

/// Day-by-day series for the dashboard chart, oldest first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub page_views: Vec<i64>,
    pub project_clicks: Vec<i64>,
}

/// Days charted by `chart_series`.
pub const CHART_DAYS: i64 = 7;

/// Sum every counter across `rows`.
pub fn totals(rows: &[DayCounters]) -> CounterTotals {
    rows.iter().fold(CounterTotals::default(), |acc, day| CounterTotals {
        page_views: acc.page_views + day.page_views,
        project_clicks: acc.project_clicks + day.project_clicks,
        unique_visitors: acc.unique_visitors + day.unique_visitors,
    })
}

/// `(recent - previous) / previous * 100`, rounded to one decimal.
///
/// Defined as 0 when the previous period recorded nothing, so a first week
/// of traffic reads as 0% rather than infinity.
pub fn percent_change(recent: i64, previous: i64) -> f64 {
    if previous <= 0 {
        return 0.0;
    }
    let raw = (recent - previous) as f64 / previous as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Compare the trailing 7 days against the 7 before them.
pub fn week_over_week(rows: &[DayCounters], today: NaiveDate) -> WeekComparison {
    let seven_days_ago = today - Duration::days(7);
    let fourteen_days_ago = today - Duration::days(14);

    let recent: Vec<&DayCounters> = rows.iter().filter(|d| d.date >= seven_days_ago).collect();
    let previous: Vec<&DayCounters> = rows
        .iter()
        .filter(|d| d.date < seven_days_ago && d.date >= fourteen_days_ago)
        .collect();

    let sum = |days: &[&DayCounters], f: fn(&DayCounters) -> i64| -> i64 {
        days.iter().map(|d| f(d)).sum()
    };

    WeekComparison {
        views_change: percent_change(
            sum(&recent, |d| d.page_views),
            sum(&previous, |d| d.page_views),
        ),
        clicks_change: percent_change(
            sum(&recent, |d| d.project_clicks),
            sum(&previous, |d| d.project_clicks),
        ),
    }
}

/// The last 7 days as chart-ready parallel arrays, oldest to newest.
/// Days with no recorded row chart as zero.
pub fn chart_series(rows: &[DayCounters], today: NaiveDate) -> ChartSeries {
    let mut labels = Vec::with_capacity(CHART_DAYS as usize);
    let mut page_views = Vec::with_capacity(CHART_DAYS as usize);
    let mut project_clicks = Vec::with_capacity(CHART_DAYS as usize);

    for i in (0..CHART_DAYS).rev() {
        let date = today - Duration::days(i);
        let day = rows.iter().find(|d| d.date == date);

        labels.push(date.format("%a").to_string());
        page_views.push(day.map_or(0, |d| d.page_views));
        project_clicks.push(day.map_or(0, |d| d.project_clicks));
    }

    ChartSeries {
        labels,
        page_views,
        project_clicks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: NaiveDate, views: i64, clicks: i64) -> DayCounters {
        DayCounters {
            date,
            page_views: views,
            project_clicks: clicks,
            unique_visitors: 0,
        }
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_totals_sums_all_rows() {
        let rows = vec![
            day(d("2024-06-01"), 10, 2),
            day(d("2024-06-02"), 5, 1),
            day(d("2024-06-03"), 0, 4),
        ];
        let t = totals(&rows);
        assert_eq!(t.page_views, 15);
        assert_eq!(t.project_clicks, 7);
    }

    #[test]
    fn test_totals_of_nothing_is_zero() {
        assert_eq!(totals(&[]), CounterTotals::default());
    }

    #[test]
    fn test_percent_change_rounds_to_one_decimal() {
        // (10 - 3) / 3 * 100 = 233.333...
        assert_eq!(percent_change(10, 3), 233.3);
        assert_eq!(percent_change(150, 100), 50.0);
        assert_eq!(percent_change(50, 100), -50.0);
    }

    #[test]
    fn test_percent_change_zero_base_is_zero_not_infinity() {
        assert_eq!(percent_change(42, 0), 0.0);
        assert_eq!(percent_change(0, 0), 0.0);
    }

    #[test]
    fn test_week_over_week_splits_on_boundary() {
        let today = d("2024-06-15");
        let rows = vec![
            // Previous window: [today-14, today-7)
            day(d("2024-06-01"), 100, 10),
            day(d("2024-06-07"), 100, 10),
            // Recent window: [today-7, today]
            day(d("2024-06-08"), 150, 5),
            day(d("2024-06-15"), 150, 5),
        ];
        let cmp = week_over_week(&rows, today);
        assert_eq!(cmp.views_change, 50.0);
        assert_eq!(cmp.clicks_change, -50.0);
    }

    #[test]
    fn test_week_over_week_empty_previous_is_zero() {
        let today = d("2024-06-15");
        let rows = vec![day(d("2024-06-14"), 500, 50)];
        let cmp = week_over_week(&rows, today);
        assert_eq!(cmp.views_change, 0.0);
        assert_eq!(cmp.clicks_change, 0.0);
    }

    #[test]
    fn test_chart_series_zero_fills_missing_days() {
        let today = d("2024-06-15");
        let rows = vec![day(d("2024-06-15"), 7, 3), day(d("2024-06-12"), 2, 1)];
        let chart = chart_series(&rows, today);

        assert_eq!(chart.labels.len(), 7);
        assert_eq!(chart.page_views, vec![0, 0, 0, 2, 0, 0, 7]);
        assert_eq!(chart.project_clicks, vec![0, 0, 0, 1, 0, 0, 3]);
    }

    #[test]
    fn test_chart_series_runs_oldest_to_newest() {
        // 2024-06-15 is a Saturday, so the series starts the Sunday before.
        let chart = chart_series(&[], d("2024-06-15"));
        assert_eq!(
            chart.labels,
            vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
    }

    #[test]
    fn test_chart_series_ignores_days_outside_window() {
        let today = d("2024-06-15");
        let rows = vec![day(d("2024-06-01"), 99, 99)];
        let chart = chart_series(&rows, today);
        assert!(chart.page_views.iter().all(|&v| v == 0));
    }
}
