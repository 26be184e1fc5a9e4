use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sales_forecast::{ForecastError, PipelineSession, TrainingConfig, FORECAST_HORIZON};

fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

fn sample_csv() -> &'static str {
    "date,product,quantity\n\
     2024-01,Widget,100\n\
     2024-02,Widget,120\n\
     2024-01,Gadget,50\n"
}

#[test]
fn test_full_pipeline_workflow() {
    // 1. Load the raw CSV text
    let mut session = PipelineSession::new();
    let loaded = session.load_csv(sample_csv()).unwrap();
    assert_eq!(loaded, 3);
    assert!(!session.is_trained());

    // 2. Train with the pipeline's fixed settings
    session.train().unwrap();
    assert!(session.is_trained());
    assert_eq!(session.encoding().unwrap().products().len(), 2);

    // 3. Two products over two observed months yield 12 predictions
    // spanning 2024-03 through 2024-08
    let predictions = session.forecast().unwrap();
    assert_eq!(predictions.len(), 2 * FORECAST_HORIZON);

    let widget_months: Vec<NaiveDate> = predictions
        .iter()
        .filter(|p| p.product == "Widget")
        .map(|p| p.month)
        .collect();
    assert_eq!(widget_months.len(), 6);
    assert_eq!(widget_months[0], month(2024, 3));
    assert_eq!(widget_months[5], month(2024, 8));

    let gadget_count = predictions.iter().filter(|p| p.product == "Gadget").count();
    assert_eq!(gadget_count, 6);
}

#[test]
fn test_forecast_requires_a_trained_model() {
    let mut session = PipelineSession::new();
    session.load_csv(sample_csv()).unwrap();

    let err = session.forecast().unwrap_err();
    assert!(matches!(err, ForecastError::Training(_)));
}

#[test]
fn test_training_requires_observations() {
    let mut session = PipelineSession::new();
    let err = session.train().unwrap_err();
    assert!(matches!(err, ForecastError::Encoding(_)));
}

#[test]
fn test_failed_reload_preserves_existing_state() {
    let mut session = PipelineSession::new();
    session.load_csv(sample_csv()).unwrap();
    session
        .train_with(
            TrainingConfig {
                epochs: 20,
                ..TrainingConfig::default()
            },
            |_| {},
        )
        .unwrap();

    // Nothing in this file survives parsing, so the session keeps its state
    let err = session
        .load_csv("date,product,quantity\nbad-date,42,x\n")
        .unwrap_err();
    assert!(matches!(err, ForecastError::Parse(_)));
    assert!(session.is_trained());
    assert_eq!(session.observations().len(), 3);
}

#[test]
fn test_successful_reload_discards_the_model() {
    let mut session = PipelineSession::new();
    session.load_csv(sample_csv()).unwrap();
    session
        .train_with(
            TrainingConfig {
                epochs: 20,
                ..TrainingConfig::default()
            },
            |_| {},
        )
        .unwrap();
    assert!(session.is_trained());

    session
        .load_csv("date,product,quantity\n2025-01,Widget,80\n")
        .unwrap();
    assert!(!session.is_trained());
    assert!(session.encoding().is_none());
}

#[test]
fn test_background_training_streams_progress() {
    let mut session = PipelineSession::new();
    session.load_csv(sample_csv()).unwrap();

    let config = TrainingConfig {
        epochs: 40,
        ..TrainingConfig::default()
    };
    let handle = session.start_training(config).unwrap();

    // The channel closes once the worker finishes
    let epochs: Vec<usize> = handle.progress().iter().map(|p| p.epoch).collect();
    assert_eq!(epochs, vec![10, 20, 30, 40]);

    session.finish_training(handle).unwrap();
    assert!(session.is_trained());
    assert_eq!(session.forecast().unwrap().len(), 2 * FORECAST_HORIZON);
}

#[test]
fn test_cancelled_training_leaves_the_session_untrained() {
    let mut session = PipelineSession::new();
    session.load_csv(sample_csv()).unwrap();

    let config = TrainingConfig {
        epochs: 1_000_000,
        ..TrainingConfig::default()
    };
    let handle = session.start_training(config).unwrap();

    // Wait for the first event so the run is demonstrably underway
    let first = handle.progress().recv().unwrap();
    assert_eq!(first.epoch, 10);

    handle.cancel();
    let err = session.finish_training(handle).unwrap_err();
    assert!(matches!(err, ForecastError::Cancelled));
    assert!(!session.is_trained());
}

#[test]
fn test_prediction_rows_serialize_for_the_presentation_layer() {
    let mut session = PipelineSession::new();
    session.load_csv(sample_csv()).unwrap();
    session
        .train_with(
            TrainingConfig {
                epochs: 20,
                ..TrainingConfig::default()
            },
            |_| {},
        )
        .unwrap();

    let predictions = session.forecast().unwrap();
    let row = serde_json::to_value(&predictions[0]).unwrap();

    assert_eq!(row["month"], "2024-03-01");
    assert_eq!(row["product"], "Widget");
    assert!(row["predicted_quantity"].is_u64());
}
