//! Flight price dashboard: inputs, form and feature adapter.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::adapter::FeatureAdapter;
use crate::errors::{DashError, DashResult};
use crate::feature_row::ComputedColumns;
use crate::form::{category, Bounds, Category, Control, Form, FormInput};

category!(
    /// Carriers present in the training data; each is a bare column name.
    Airline {
        AirAsia => "Air Asia",
        AirIndia => "Air India",
        GoAir => "GoAir",
        IndiGo => "IndiGo",
        JetAirways => "Jet Airways",
        JetAirwaysBusiness => "Jet Airways Business",
        MultipleCarriers => "Multiple carriers",
        MultipleCarriersPremiumEconomy => "Multiple carriers Premium economy",
        SpiceJet => "SpiceJet",
        Trujet => "Trujet",
        Vistara => "Vistara",
        VistaraPremiumEconomy => "Vistara Premium economy",
    }
);

category!(Source {
    Banglore => "Banglore",
    Chennai => "Chennai",
    Delhi => "Delhi",
    Kolkata => "Kolkata",
    Mumbai => "Mumbai",
});

category!(Destination {
    Cochin => "Cochin",
    Delhi => "Delhi",
    Hyderabad => "Hyderabad",
    Kolkata => "Kolkata",
    NewDelhi => "New Delhi",
});

category!(TotalStops {
    Zero => "0",
    One => "1",
    Two => "2",
    Three => "3",
    Four => "4",
});

impl TotalStops {
    pub fn count(&self) -> i64 {
        match self {
            TotalStops::Zero => 0,
            TotalStops::One => 1,
            TotalStops::Two => 2,
            TotalStops::Three => 3,
            TotalStops::Four => 4,
        }
    }
}

pub const JOURNEY_MONTH: Bounds = Bounds::new(1, 12, 6);
pub const JOURNEY_DAY: Bounds = Bounds::new(1, 31, 15);
pub const DEP_HOUR: Bounds = Bounds::new(0, 23, 12);
pub const DEP_MINUTE: Bounds = Bounds::new(0, 59, 30);
pub const ARRIVAL_HOUR: Bounds = Bounds::new(0, 23, 15);
pub const ARRIVAL_MINUTE: Bounds = Bounds::new(0, 59, 45);
pub const DURATION_MINS: Bounds = Bounds::new(30, 1440, 120);
pub const PRICE_PER_MINUTE: Bounds = Bounds::new(1, 500, 10);

/// Route columns exist in the training data but are never derived from input.
pub const ROUTE_COLUMNS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceInput {
    pub airline: Airline,
    pub source: Source,
    pub destination: Destination,
    pub total_stops: TotalStops,
    pub journey_month: i64,
    pub journey_day: i64,
    pub dep_hour: i64,
    pub dep_minute: i64,
    pub arrival_hour: i64,
    pub arrival_minute: i64,
    pub duration_mins: i64,
    pub price_per_minute: i64,
}

impl Default for PriceInput {
    /// The form's initial state: journey date defaults to today.
    fn default() -> Self {
        let today = Local::now();
        Self {
            airline: Airline::AirAsia,
            source: Source::Banglore,
            destination: Destination::Cochin,
            total_stops: TotalStops::Zero,
            journey_month: today.month() as i64,
            journey_day: today.day() as i64,
            dep_hour: DEP_HOUR.default,
            dep_minute: DEP_MINUTE.default,
            arrival_hour: ARRIVAL_HOUR.default,
            arrival_minute: ARRIVAL_MINUTE.default,
            duration_mins: DURATION_MINS.default,
            price_per_minute: PRICE_PER_MINUTE.default,
        }
    }
}

impl FormInput for PriceInput {
    fn form() -> Form {
        let today = Local::now();
        let month = Bounds {
            default: today.month() as i64,
            ..JOURNEY_MONTH
        };
        let day = Bounds {
            default: today.day() as i64,
            ..JOURNEY_DAY
        };

        Form {
            title: "Flight Parameters",
            submit: "Predict Flight Price",
            controls: vec![
                Control::select("airline", "Airline", Airline::AirAsia),
                Control::select("source", "Source", Source::Banglore),
                Control::select("destination", "Destination", Destination::Cochin)
                    .excluding("source"),
                Control::select("total_stops", "Total Stops", TotalStops::Zero),
                Control::slider("journey_month", "Month", month),
                Control::slider("journey_day", "Day", day),
                Control::slider("dep_hour", "Departure Hour", DEP_HOUR),
                Control::slider("dep_minute", "Departure Minute", DEP_MINUTE),
                Control::slider("arrival_hour", "Arrival Hour", ARRIVAL_HOUR),
                Control::slider("arrival_minute", "Arrival Minute", ARRIVAL_MINUTE),
                Control::slider("duration_mins", "Flight Duration (in mins)", DURATION_MINS),
                Control::slider("price_per_minute", "Price per Minute", PRICE_PER_MINUTE),
            ],
        }
    }

    fn collect(self) -> DashResult<Self> {
        // The destination select never offers the selected source.
        if self.source.label() == self.destination.label() {
            return Err(DashError::validation(
                "destination",
                format!("destination must differ from source '{}'", self.source.label()),
            ));
        }

        Ok(Self {
            journey_month: JOURNEY_MONTH.clamp(self.journey_month),
            journey_day: JOURNEY_DAY.clamp(self.journey_day),
            dep_hour: DEP_HOUR.clamp(self.dep_hour),
            dep_minute: DEP_MINUTE.clamp(self.dep_minute),
            arrival_hour: ARRIVAL_HOUR.clamp(self.arrival_hour),
            arrival_minute: ARRIVAL_MINUTE.clamp(self.arrival_minute),
            duration_mins: DURATION_MINS.clamp(self.duration_mins),
            price_per_minute: PRICE_PER_MINUTE.clamp(self.price_per_minute),
            ..self
        })
    }
}

/// Column layout of the flight price regressor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceAdapter;

impl FeatureAdapter for PriceAdapter {
    type Input = PriceInput;

    fn name(&self) -> &'static str {
        "flight_price"
    }

    fn compute(&self, input: &PriceInput) -> ComputedColumns {
        let mut columns = ComputedColumns::new();
        columns
            .set_int("Journey_Month", input.journey_month)
            .set_int("Journey_Day", input.journey_day)
            .set_int("Dep_Hour", input.dep_hour)
            .set_int("Dep_Minute", input.dep_minute)
            .set_int("Arrival_Hour", input.arrival_hour)
            .set_int("Arrival_Minute", input.arrival_minute)
            .set_int("Duration_mins", input.duration_mins)
            .set_int("Price_per_minute", input.price_per_minute)
            .set_int("Total_Stops", input.total_stops.count())
            .one_hot("", input.airline)
            .one_hot("Source_", input.source)
            .one_hot("Destination_", input.destination);

        for i in 1..=ROUTE_COLUMNS {
            columns.set(format!("Route{i}"), 0.0);
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_city_route_is_rejected() {
        let input = PriceInput {
            source: Source::Delhi,
            destination: Destination::Delhi,
            ..PriceInput::default()
        };
        let err = input.collect().unwrap_err();
        assert!(matches!(err, DashError::Validation { .. }));
    }

    #[test]
    fn collect_clamps_sliders() {
        let input = PriceInput {
            journey_month: 14,
            dep_minute: -3,
            duration_mins: 5,
            price_per_minute: 9000,
            ..PriceInput::default()
        }
        .collect()
        .unwrap();
        assert_eq!(input.journey_month, 12);
        assert_eq!(input.dep_minute, 0);
        assert_eq!(input.duration_mins, 30);
        assert_eq!(input.price_per_minute, 500);
    }

    #[test]
    fn partial_json_falls_back_to_form_defaults() {
        let input: PriceInput =
            serde_json::from_str(r#"{"airline":"IndiGo","total_stops":"2"}"#).unwrap();
        assert_eq!(input.airline, Airline::IndiGo);
        assert_eq!(input.total_stops, TotalStops::Two);
        assert_eq!(input.duration_mins, DURATION_MINS.default);
        assert_eq!(input.source, Source::Banglore);
    }

    #[test]
    fn unknown_airline_is_rejected_by_deserialization() {
        assert!(serde_json::from_str::<PriceInput>(r#"{"airline":"Pan Am"}"#).is_err());
    }

    #[test]
    fn form_lists_every_control() {
        let form = PriceInput::form();
        let names: Vec<_> = form.controls.iter().map(Control::name).collect();
        assert_eq!(names.len(), 12);
        assert!(names.contains(&"destination"));
        assert!(names.contains(&"price_per_minute"));
    }
}
