use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sales_forecast::{
    encode, generate, EncodingTable, Observation, QuantityRegressor, TrainedQuantityModel,
    TrainingConfig, FORECAST_HORIZON,
};

fn observation(year: i32, month: u32, product: &str, quantity: f64) -> Observation {
    Observation {
        month: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
        product: product.to_string(),
        quantity,
    }
}

fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

fn train(
    observations: &[Observation],
    config: TrainingConfig,
) -> (TrainedQuantityModel, EncodingTable) {
    let (features, targets, table) = encode(observations).unwrap();
    let model = QuantityRegressor::new(config)
        .unwrap()
        .fit(&features, &targets, |_| {})
        .unwrap();
    (model, table)
}

fn quick_config() -> TrainingConfig {
    TrainingConfig {
        epochs: 20,
        ..TrainingConfig::default()
    }
}

#[test]
fn test_forecast_covers_six_months_per_product() {
    let observations = vec![
        observation(2024, 1, "Widget", 100.0),
        observation(2024, 2, "Widget", 120.0),
        observation(2024, 1, "Gadget", 50.0),
    ];
    let (model, table) = train(&observations, quick_config());

    let predictions = generate(&model, &table, month(2024, 2)).unwrap();

    assert_eq!(predictions.len(), 2 * FORECAST_HORIZON);

    // Grouped by product in first-seen order, ascending month inside a group
    assert!(predictions[..6].iter().all(|p| p.product == "Widget"));
    assert!(predictions[6..].iter().all(|p| p.product == "Gadget"));

    let widget_months: Vec<NaiveDate> = predictions[..6].iter().map(|p| p.month).collect();
    let expected: Vec<NaiveDate> = (3..=8).map(|m| month(2024, m)).collect();
    assert_eq!(widget_months, expected);

    let gadget_months: Vec<NaiveDate> = predictions[6..].iter().map(|p| p.month).collect();
    assert_eq!(gadget_months, expected);
}

#[test]
fn test_forecast_rolls_over_the_year_boundary() {
    let observations = vec![
        observation(2024, 11, "Widget", 90.0),
        observation(2024, 12, "Widget", 110.0),
    ];
    let (model, table) = train(&observations, quick_config());

    let predictions = generate(&model, &table, month(2024, 12)).unwrap();

    let months: Vec<NaiveDate> = predictions.iter().map(|p| p.month).collect();
    let expected: Vec<NaiveDate> = (1..=6).map(|m| month(2025, m)).collect();
    assert_eq!(months, expected);
}

#[test]
fn test_negative_raw_outputs_clamp_to_zero() {
    // Negative quantities are admitted upstream and pull the raw output well
    // below zero; generated rows clamp at zero
    let observations = vec![
        observation(2024, 1, "Widget", -800.0),
        observation(2024, 2, "Widget", -900.0),
        observation(2024, 3, "Widget", -1000.0),
    ];
    let config = TrainingConfig {
        epochs: 500,
        dropout: 0.0,
        ..TrainingConfig::default()
    };
    let (model, table) = train(&observations, config);

    let predictions = generate(&model, &table, month(2024, 3)).unwrap();

    assert_eq!(predictions.len(), FORECAST_HORIZON);
    assert!(predictions.iter().all(|p| p.predicted_quantity == 0));
}

#[test]
fn test_forecast_uses_the_captured_table_products() {
    let observations = vec![
        observation(2024, 1, "Widget", 100.0),
        observation(2024, 1, "Gadget", 50.0),
        observation(2024, 2, "Sprocket", 70.0),
    ];
    let (model, table) = train(&observations, quick_config());

    let predictions = generate(&model, &table, month(2024, 2)).unwrap();

    let products: Vec<&str> = predictions
        .iter()
        .map(|p| p.product.as_str())
        .step_by(FORECAST_HORIZON)
        .collect();
    assert_eq!(products, ["Widget", "Gadget", "Sprocket"]);
}
