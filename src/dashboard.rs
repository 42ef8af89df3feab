//! The two dashboards, each a loaded model plus its static dataset.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use crate::config_loader::{PriceConfig, SatisfactionConfig};
use crate::dataset::{Dataset, TableSlice};
use crate::errors::{DashError, DashResult};
use crate::feature_row::AlignmentReport;
use crate::form::{Form, FormInput};
use crate::inference::{Inference, Predictor};
use crate::model::{load_model, TrainedModel};
use crate::prediction::{PredictionResponse, PredictionResult};
use crate::price::{PriceAdapter, PriceInput};
use crate::satisfaction::{
    SatisfactionEncoding, ServiceRatingsAdapter, ServiceRatingsInput, TravelComboAdapter,
    TravelComboInput,
};
use crate::schema::ExpectedSchema;
use crate::trends::{columns, PriceTrends, SatisfactionTrends};

pub struct PriceDashboard {
    predictor: Predictor<PriceAdapter>,
    dataset: Dataset,
    trends: PriceTrends,
    band: f64,
}

/// Filters for the raw flight table; absent fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightQuery {
    pub airline: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub month: Option<i64>,
    pub day: Option<i64>,
}

impl PriceDashboard {
    pub fn load(config: &PriceConfig) -> DashResult<Self> {
        let model = load_model(&config.model)?;
        let dataset = Dataset::load(&config.dataset)?;
        Self::new(model, dataset, config.band)
    }

    pub fn new(model: Arc<dyn TrainedModel>, dataset: Dataset, band: f64) -> DashResult<Self> {
        if model.task().is_classification() {
            return Err(DashError::config(format!(
                "model '{}' is a classifier, the price dashboard needs a regressor",
                model.model_id()
            )));
        }
        let trends = PriceTrends::compute(&dataset)?;
        info!(model_id = model.model_id(), rows = dataset.len(), "Price dashboard ready");

        Ok(Self {
            predictor: Predictor::new(PriceAdapter, model),
            dataset,
            trends,
            band,
        })
    }

    pub fn model_id(&self) -> &str {
        self.predictor.model().model_id()
    }

    pub fn schema(&self) -> &ExpectedSchema {
        self.predictor.schema()
    }

    pub fn form(&self) -> Form {
        PriceInput::form()
    }

    pub fn alignment(&self) -> AlignmentReport {
        self.predictor.alignment()
    }

    pub fn trends(&self) -> &PriceTrends {
        &self.trends
    }

    pub fn predict(&self, input: PriceInput) -> DashResult<PredictionResponse> {
        let Inference { row, output } = self.predictor.predict(input)?;
        let result = PredictionResult::price(output, self.band)?;
        Ok(PredictionResponse::new(self.model_id(), result, row))
    }

    pub fn flights(&self, query: &FlightQuery) -> DashResult<TableSlice> {
        let mut predicates = Vec::new();
        if let Some(airline) = &query.airline {
            predicates.push((columns::AIRLINE, airline.clone()));
        }
        if let Some(source) = &query.source {
            predicates.push((columns::SOURCE, source.clone()));
        }
        if let Some(destination) = &query.destination {
            predicates.push((columns::DESTINATION, destination.clone()));
        }
        if let Some(month) = query.month {
            predicates.push((columns::JOURNEY_MONTH, month.to_string()));
        }
        if let Some(day) = query.day {
            predicates.push((columns::JOURNEY_DAY, day.to_string()));
        }
        self.dataset.filter(&predicates)
    }
}

enum SatisfactionPredictor {
    TravelCombo(Predictor<TravelComboAdapter>),
    ServiceRatings(Predictor<ServiceRatingsAdapter>),
}

pub struct SatisfactionDashboard {
    encoding: SatisfactionEncoding,
    predictor: SatisfactionPredictor,
    trends: SatisfactionTrends,
}

impl SatisfactionDashboard {
    pub fn load(config: &SatisfactionConfig) -> DashResult<Self> {
        let model = load_model(&config.model)?;
        let dataset = Dataset::load(&config.dataset)?;
        Self::new(config.encoding, model, &dataset, config.histogram_bins)
    }

    pub fn new(
        encoding: SatisfactionEncoding,
        model: Arc<dyn TrainedModel>,
        dataset: &Dataset,
        histogram_bins: usize,
    ) -> DashResult<Self> {
        if !model.task().is_classification() {
            return Err(DashError::config(format!(
                "model '{}' is a regressor, the satisfaction dashboard needs a classifier",
                model.model_id()
            )));
        }
        let trends = SatisfactionTrends::compute(dataset, histogram_bins)?;
        info!(
            model_id = model.model_id(),
            encoding = %encoding,
            rows = dataset.len(),
            "Satisfaction dashboard ready"
        );

        let predictor = match encoding {
            SatisfactionEncoding::TravelCombo => {
                SatisfactionPredictor::TravelCombo(Predictor::new(TravelComboAdapter, model))
            }
            SatisfactionEncoding::ServiceRatings => {
                SatisfactionPredictor::ServiceRatings(Predictor::new(ServiceRatingsAdapter, model))
            }
        };

        Ok(Self {
            encoding,
            predictor,
            trends,
        })
    }

    pub fn encoding(&self) -> SatisfactionEncoding {
        self.encoding
    }

    fn model(&self) -> &dyn TrainedModel {
        match &self.predictor {
            SatisfactionPredictor::TravelCombo(p) => p.model(),
            SatisfactionPredictor::ServiceRatings(p) => p.model(),
        }
    }

    pub fn model_id(&self) -> &str {
        self.model().model_id()
    }

    pub fn schema(&self) -> &ExpectedSchema {
        self.model().expected_schema()
    }

    pub fn form(&self) -> Form {
        match self.encoding {
            SatisfactionEncoding::TravelCombo => TravelComboInput::form(),
            SatisfactionEncoding::ServiceRatings => ServiceRatingsInput::form(),
        }
    }

    pub fn alignment(&self) -> AlignmentReport {
        match &self.predictor {
            SatisfactionPredictor::TravelCombo(p) => p.alignment(),
            SatisfactionPredictor::ServiceRatings(p) => p.alignment(),
        }
    }

    pub fn trends(&self) -> &SatisfactionTrends {
        &self.trends
    }

    /// The body shape depends on the configured encoding, so it arrives as
    /// untyped JSON and is decoded here.
    pub fn predict(&self, body: serde_json::Value) -> DashResult<PredictionResponse> {
        let Inference { row, output } = match &self.predictor {
            SatisfactionPredictor::TravelCombo(p) => p.predict(decode_input(body)?)?,
            SatisfactionPredictor::ServiceRatings(p) => p.predict(decode_input(body)?)?,
        };
        let result = PredictionResult::satisfaction(output)?;
        Ok(PredictionResponse::new(self.model_id(), result, row))
    }
}

fn decode_input<T: DeserializeOwned>(body: serde_json::Value) -> DashResult<T> {
    serde_json::from_value(body).map_err(|e| DashError::validation("body", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearModel, Task};
    use crate::prediction::SATISFIED;
    use crate::price::Source;

    const FLIGHTS: &str = "\
Airline,Source,Destination,Total_Stops,Journey_Month,Journey_Day,Duration_mins,Price
IndiGo,Delhi,Cochin,1,6,1,170,4000
IndiGo,Delhi,Cochin,0,6,2,150,6000
Air India,Kolkata,Banglore,2,12,1,400,9000
";

    const PASSENGERS: &str = "\
Gender,Age,Flight Distance,satisfaction
Male,20,100,satisfied
Female,30,200,neutral or dissatisfied
";

    fn schema(names: &[&str]) -> ExpectedSchema {
        ExpectedSchema::from_artifact("m", Some(names.iter().map(|s| s.to_string()).collect()))
            .unwrap()
    }

    fn price_dashboard() -> PriceDashboard {
        let model = LinearModel::new(
            "price-linear".into(),
            Task::Regression,
            schema(&["Total_Stops", "IndiGo", "Duration_mins"]),
            1000.0,
            vec![500.0, 250.0, 10.0],
        )
        .unwrap();
        let dataset = Dataset::from_reader("flights", FLIGHTS.as_bytes()).unwrap();
        PriceDashboard::new(Arc::new(model), dataset, 0.1).unwrap()
    }

    #[test]
    fn price_prediction_renders_band() {
        let dash = price_dashboard();
        let input = PriceInput {
            total_stops: crate::price::TotalStops::One,
            airline: crate::price::Airline::IndiGo,
            duration_mins: 100,
            ..PriceInput::default()
        };
        let response = dash.predict(input).unwrap();
        // 1000 + 500 + 250 + 1000
        match response.result {
            PredictionResult::Price { value, low, high, .. } => {
                assert_eq!(value, 2750.0);
                assert!((low - 2475.0).abs() < 1e-9);
                assert!((high - 3025.0).abs() < 1e-9);
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(response.features.columns(), dash.schema().columns());
    }

    #[test]
    fn price_rejects_same_source_and_destination() {
        let dash = price_dashboard();
        let input = PriceInput {
            source: Source::Delhi,
            destination: crate::price::Destination::Delhi,
            ..PriceInput::default()
        };
        assert!(matches!(
            dash.predict(input).unwrap_err(),
            DashError::Validation { .. }
        ));
    }

    #[test]
    fn flights_filter_by_query() {
        let dash = price_dashboard();
        let slice = dash
            .flights(&FlightQuery {
                airline: Some("IndiGo".into()),
                month: Some(6),
                day: Some(2),
                ..FlightQuery::default()
            })
            .unwrap();
        assert_eq!(slice.rows.len(), 1);
        assert_eq!(slice.rows[0][7], "6000");
    }

    #[test]
    fn task_mismatch_is_a_configuration_error() {
        let classifier = LinearModel::new(
            "clf".into(),
            Task::Classification { threshold: 0.5 },
            schema(&["Total_Stops"]),
            0.0,
            vec![1.0],
        )
        .unwrap();
        let dataset = Dataset::from_reader("flights", FLIGHTS.as_bytes()).unwrap();
        let err = PriceDashboard::new(Arc::new(classifier), dataset, 0.1)
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn satisfaction_decodes_body_for_configured_encoding() {
        let model = LinearModel::new(
            "sat-linear".into(),
            Task::Classification { threshold: 0.5 },
            schema(&["Service Score", "Is Delayed"]),
            -2.0,
            vec![1.0, -3.0],
        )
        .unwrap();
        let dataset = Dataset::from_reader("passengers", PASSENGERS.as_bytes()).unwrap();
        let dash = SatisfactionDashboard::new(
            SatisfactionEncoding::TravelCombo,
            Arc::new(model),
            &dataset,
            4,
        )
        .unwrap();
        assert_eq!(dash.form().controls.len(), 8);

        let response = dash
            .predict(serde_json::json!({ "service_score": 5, "total_delay": 0 }))
            .unwrap();
        assert_eq!(response.result.rendered(), SATISFIED);

        let err = dash
            .predict(serde_json::json!({ "gender": "Robot" }))
            .unwrap_err();
        assert!(matches!(err, DashError::Validation { .. }));
        assert!(dash.alignment().filled.is_empty());
    }

    #[test]
    fn service_ratings_encoding_predicts_through_dashboard() {
        let model = LinearModel::new(
            "sat-ratings".into(),
            Task::Classification { threshold: 0.5 },
            schema(&[
                "Seat comfort",
                "Age",
                "Customer Type_disloyal Customer",
                "Type of Travel_Personal Travel",
                "Class_Eco Plus",
            ]),
            -1.0,
            vec![1.0, 0.0, -1.0, -1.0, 0.0],
        )
        .unwrap();
        let dataset = Dataset::from_reader("passengers", PASSENGERS.as_bytes()).unwrap();
        let dash = SatisfactionDashboard::new(
            SatisfactionEncoding::ServiceRatings,
            Arc::new(model),
            &dataset,
            4,
        )
        .unwrap();
        assert_eq!(dash.encoding(), SatisfactionEncoding::ServiceRatings);
        assert_eq!(dash.form().controls.len(), 21);
        assert!(dash.alignment().filled.is_empty());

        let response = dash
            .predict(serde_json::json!({
                "customer_type": "Disloyal Customer",
                "type_of_travel": "Personal travel",
                "travel_class": "Eco Plus",
                "seat_comfort": 9,
                "age": 250
            }))
            .unwrap();
        let features = &response.features;
        assert_eq!(features.get("Seat comfort"), Some(5.0));
        assert_eq!(features.get("Age"), Some(100.0));
        assert_eq!(features.get("Customer Type_disloyal Customer"), Some(1.0));
        assert_eq!(features.get("Type of Travel_Personal Travel"), Some(1.0));
        assert_eq!(features.get("Class_Eco Plus"), Some(1.0));
        // -1 + 5 - 1 - 1
        assert_eq!(response.result.rendered(), SATISFIED);
    }

    #[test]
    fn encoding_that_misses_model_columns_is_reported() {
        let model = LinearModel::new(
            "sat-combo".into(),
            Task::Classification { threshold: 0.5 },
            schema(&["Service Score", "Is Delayed", "Age"]),
            0.0,
            vec![1.0, -1.0, 0.0],
        )
        .unwrap();
        let dataset = Dataset::from_reader("passengers", PASSENGERS.as_bytes()).unwrap();
        let dash = SatisfactionDashboard::new(
            SatisfactionEncoding::ServiceRatings,
            Arc::new(model),
            &dataset,
            4,
        )
        .unwrap();

        let alignment = dash.alignment();
        assert_eq!(alignment.filled, ["Service Score", "Is Delayed"]);
        assert!(alignment.dropped.contains(&"Seat comfort".to_string()));
    }
}
