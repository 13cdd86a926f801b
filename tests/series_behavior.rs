use stockcast_core::{
    merge_chart, HistoricalParams, Horizon, PredictionParams, SeriesGenerator, Symbol,
    TradingDate, ValidationError,
};

fn anchor() -> TradingDate {
    TradingDate::parse("2024-03-31").expect("anchor date")
}

fn symbol(value: &str) -> Symbol {
    Symbol::parse(value).expect("valid symbol")
}

#[test]
fn historical_then_prediction_forms_one_continuous_chart() {
    // Given: a seeded generator anchored on a fixed day
    let mut generator = SeriesGenerator::with_seed(42).anchored_at(anchor());
    let aapl = symbol("AAPL");

    // When: a default history and a 7-day prediction are generated and merged
    let history = generator
        .generate_historical(&aapl, 175.0, HistoricalParams::default())
        .expect("history");
    let last = history.last().expect("non-empty history");
    let horizon = Horizon::new(7).expect("horizon");
    let prediction = generator
        .generate_prediction(&aapl, last.close, last.date, PredictionParams::new(horizon))
        .expect("prediction");
    let chart = merge_chart(&history, Some(&prediction));

    // Then: the chart carries every historical day followed by every predicted day
    assert_eq!(history.len(), 91);
    assert_eq!(history[0].date, anchor().offset_days(-90));
    assert_eq!(last.date, anchor());
    assert_eq!(prediction[0].date, anchor().offset_days(1));
    assert_eq!(chart.len(), history.len() + prediction.len());

    let (actual, predicted): (Vec<_>, Vec<_>) = chart.iter().partition(|row| row.actual.is_some());
    assert_eq!(actual.len(), 91);
    assert!(predicted.iter().all(|row| row.predicted.is_some()));
    assert!(chart.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[test]
fn seeded_generators_replay_the_same_series() {
    // Given: two generators sharing seed and anchor
    let params = HistoricalParams::default();
    let tcs = symbol("TCS.BSE");

    // When: both generate the same request
    let first = SeriesGenerator::with_seed(9)
        .anchored_at(anchor())
        .generate_historical(&tcs, 3_500.0, params)
        .expect("first");
    let second = SeriesGenerator::with_seed(9)
        .anchored_at(anchor())
        .generate_historical(&tcs, 3_500.0, params)
        .expect("second");

    // Then: the series are identical
    assert_eq!(first, second);
}

#[test]
fn every_generated_bar_respects_its_price_envelope() {
    let mut generator = SeriesGenerator::with_seed(1).anchored_at(anchor());
    let params = HistoricalParams {
        lookback_days: 365,
        daily_volatility: 0.05,
    };

    let history = generator
        .generate_historical(&symbol("TSLA"), 240.0, params)
        .expect("history");

    for bar in &history {
        assert!(bar.high >= bar.open.max(bar.close));
        assert!(bar.low <= bar.open.min(bar.close));
        assert!(bar.volume >= 1_000_000 && bar.volume < 11_000_000);
    }
}

#[test]
fn out_of_range_inputs_are_rejected() {
    let mut generator = SeriesGenerator::with_seed(3).anchored_at(anchor());

    assert_eq!(
        Horizon::new(31),
        Err(ValidationError::HorizonOutOfRange { days: 31 })
    );
    assert_eq!(
        Horizon::new(0),
        Err(ValidationError::HorizonOutOfRange { days: 0 })
    );

    let error = generator
        .generate_historical(&symbol("MSFT"), -1.0, HistoricalParams::default())
        .expect_err("negative base price");
    assert_eq!(
        error,
        ValidationError::NonPositiveValue {
            field: "base_price"
        }
    );
}

#[test]
fn chart_without_history_is_empty() {
    let horizon = Horizon::new(3).expect("horizon");
    let prediction = SeriesGenerator::with_seed(5)
        .generate_prediction(&symbol("AAPL"), 10.0, anchor(), PredictionParams::new(horizon))
        .expect("prediction");

    assert!(merge_chart(&[], Some(&prediction)).is_empty());
}

#[test]
fn prediction_noise_has_no_upward_bias() {
    // Given: many independently seeded one-day predictions from 100.0
    let tsla = symbol("TSLA");
    let horizon = Horizon::new(1).expect("horizon");
    let runs = 2_000_u64;

    // When: the first-step moves are averaged
    let total_move: f64 = (0..runs)
        .map(|seed| {
            let mut generator = SeriesGenerator::with_seed(seed).anchored_at(anchor());
            let prediction = generator
                .generate_prediction(&tsla, 100.0, anchor(), PredictionParams::new(horizon))
                .expect("prediction");
            prediction[0].predicted_close - 100.0
        })
        .sum();
    let mean_move = total_move / runs as f64;

    // Then: up and down trends cancel and the noise is centred on zero
    assert!(mean_move.abs() < 0.15, "mean first-step move was {mean_move}");
}
