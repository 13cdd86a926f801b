use std::collections::BTreeMap;

use crate::{ChartPoint, PredictedPoint, PricePoint, TradingDate};

/// Combines a historical series and an optional prediction into one timeline.
///
/// Historical closes become `actual` values. A predicted point on an existing
/// date is merged into that row; one after the last row is appended; any other
/// predicted point is dropped. The output is ascending with one row per date,
/// and is empty whenever `historical` is empty.
pub fn merge(historical: &[PricePoint], predicted: Option<&[PredictedPoint]>) -> Vec<ChartPoint> {
    if historical.is_empty() {
        return Vec::new();
    }

    let mut rows: BTreeMap<TradingDate, ChartPoint> = historical
        .iter()
        .map(|point| {
            (
                point.date,
                ChartPoint {
                    date: point.date,
                    actual: Some(point.close),
                    predicted: None,
                },
            )
        })
        .collect();

    for point in predicted.unwrap_or_default() {
        if let Some(row) = rows.get_mut(&point.date) {
            row.predicted = Some(point.predicted_close);
            continue;
        }

        let after_last = rows
            .last_key_value()
            .is_some_and(|(last, _)| point.date > *last);
        if after_last {
            rows.insert(
                point.date,
                ChartPoint {
                    date: point.date,
                    actual: None,
                    predicted: Some(point.predicted_close),
                },
            );
        }
    }

    rows.into_values().collect()
}
