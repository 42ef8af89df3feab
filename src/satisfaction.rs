//! Passenger satisfaction dashboards.
//!
//! Two encodings of the same questionnaire exist, each fit to a different
//! model. They are kept as separate adapters and chosen by configuration:
//!
//! - `travel_combo`: a single service score, an age bucket, an "is delayed"
//!   flag and a combined travel-purpose/class one-hot group.
//! - `service_ratings`: raw age plus fourteen individual service ratings and
//!   per-field one-hot groups.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adapter::FeatureAdapter;
use crate::errors::DashResult;
use crate::feature_row::ComputedColumns;
use crate::form::{category, Bounds, Category, Control, Form, FormInput};

category!(Gender {
    Male => "Male",
    Female => "Female",
});

category!(CustomerType {
    Loyal => "Loyal Customer",
    Disloyal => "disloyal Customer" | "Disloyal Customer",
});

category!(TravelPurpose {
    Business => "Business travel",
    Personal => "Personal Travel" | "Personal travel",
});

category!(TravelClass {
    Business => "Business",
    Eco => "Eco",
    EcoPlus => "Eco Plus",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionEncoding {
    TravelCombo,
    ServiceRatings,
}

impl fmt::Display for SatisfactionEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SatisfactionEncoding::TravelCombo => write!(f, "travel_combo"),
            SatisfactionEncoding::ServiceRatings => write!(f, "service_ratings"),
        }
    }
}

/// Age buckets used by the travel-combo model, encoded 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgeGroup {
    Teen,
    YoungAdult,
    Adult,
    Senior,
}

impl AgeGroup {
    pub fn of(age: i64) -> Self {
        match age {
            a if a < 20 => AgeGroup::Teen,
            a if a < 35 => AgeGroup::YoungAdult,
            a if a < 60 => AgeGroup::Adult,
            _ => AgeGroup::Senior,
        }
    }

    pub fn code(&self) -> i64 {
        *self as i64
    }
}

// ---------------------------------------------------------------------------
// travel_combo
// ---------------------------------------------------------------------------

pub const COMBO_AGE: Bounds = Bounds::new(5, 100, 30);
pub const COMBO_FLIGHT_DISTANCE: Bounds = Bounds::new(30, 5000, 500);
pub const TOTAL_DELAY: Bounds = Bounds::new(0, 1000, 10);
pub const SERVICE_SCORE: Bounds = Bounds::new(0, 5, 4);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelComboInput {
    pub gender: Gender,
    pub customer_type: CustomerType,
    pub travel_purpose: TravelPurpose,
    pub travel_class: TravelClass,
    pub age: i64,
    pub flight_distance: i64,
    pub total_delay: i64,
    pub service_score: i64,
}

impl Default for TravelComboInput {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            customer_type: CustomerType::Loyal,
            travel_purpose: TravelPurpose::Business,
            travel_class: TravelClass::Business,
            age: COMBO_AGE.default,
            flight_distance: COMBO_FLIGHT_DISTANCE.default,
            total_delay: TOTAL_DELAY.default,
            service_score: SERVICE_SCORE.default,
        }
    }
}

impl FormInput for TravelComboInput {
    fn form() -> Form {
        Form {
            title: "User Input Features",
            submit: "Predict Satisfaction",
            controls: vec![
                Control::select("gender", "Gender", Gender::Male),
                Control::select("customer_type", "Customer Type", CustomerType::Loyal),
                Control::select("travel_purpose", "Travel Purpose", TravelPurpose::Business),
                Control::select("travel_class", "Class", TravelClass::Business),
                Control::slider("age", "Age", COMBO_AGE),
                Control::slider("flight_distance", "Flight Distance", COMBO_FLIGHT_DISTANCE),
                Control::slider("total_delay", "Total Delay (mins)", TOTAL_DELAY),
                Control::slider("service_score", "Service Score (0-5)", SERVICE_SCORE),
            ],
        }
    }

    fn collect(self) -> DashResult<Self> {
        Ok(Self {
            age: COMBO_AGE.clamp(self.age),
            flight_distance: COMBO_FLIGHT_DISTANCE.clamp(self.flight_distance),
            total_delay: TOTAL_DELAY.clamp(self.total_delay),
            service_score: SERVICE_SCORE.clamp(self.service_score),
            ..self
        })
    }
}

pub const TRAVEL_COMBO_PREFIX: &str = "Travel Purpose Class_";

pub fn travel_combo_column(purpose: TravelPurpose, class: TravelClass) -> String {
    format!("{TRAVEL_COMBO_PREFIX}{} - {}", purpose.label(), class.label())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TravelComboAdapter;

impl FeatureAdapter for TravelComboAdapter {
    type Input = TravelComboInput;

    fn name(&self) -> &'static str {
        "satisfaction_travel_combo"
    }

    fn compute(&self, input: &TravelComboInput) -> ComputedColumns {
        let mut columns = ComputedColumns::new();
        columns
            .set_int("Flight Distance", input.flight_distance)
            .set_int("Total Delay", input.total_delay)
            .set_flag("Is Delayed", input.total_delay > 0)
            .set_int("Age Group", AgeGroup::of(input.age).code())
            .set_int("Service Score", input.service_score)
            .one_hot("Gender_", input.gender)
            .one_hot("Customer Type_", input.customer_type);

        for purpose in TravelPurpose::ALL {
            for class in TravelClass::ALL {
                columns.set_flag(
                    travel_combo_column(*purpose, *class),
                    *purpose == input.travel_purpose && *class == input.travel_class,
                );
            }
        }
        columns
    }
}

// ---------------------------------------------------------------------------
// service_ratings
// ---------------------------------------------------------------------------

pub const RATINGS_AGE: Bounds = Bounds::new(1, 100, 30);
pub const RATINGS_FLIGHT_DISTANCE: Bounds = Bounds::new(0, 10000, 500);
pub const RATING: Bounds = Bounds::new(0, 5, 3);

/// Form field name, label, and model column of each service rating.
pub const SERVICE_RATING_FIELDS: [(&str, &str, &str); 14] = [
    ("ease_online_booking", "Ease of Online Booking", "Ease of Online booking"),
    ("inflight_wifi_service", "Inflight Wi-Fi Service", "Inflight wifi service"),
    ("inflight_entertainment", "Inflight Entertainment", "Inflight entertainment"),
    ("departure_arrival_time", "Departure/Arrival Time", "Departure/Arrival time convenient"),
    ("seat_comfort", "Seat Comfort", "Seat comfort"),
    ("cleanliness", "Cleanliness", "Cleanliness"),
    ("baggage_handling", "Baggage Handling", "Baggage handling"),
    ("checkin_service", "Check-in Service", "Checkin service"),
    ("gate_location", "Gate Location", "Gate location"),
    ("food_drink", "Food and Drink", "Food and drink"),
    ("onboard_service", "On-board Service", "On-board service"),
    ("leg_room_service", "Leg Room Service", "Leg room service"),
    ("online_boarding", "Online boarding", "Online boarding"),
    ("inflight_service", "Inflight Service", "Inflight service"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRatings {
    pub ease_online_booking: i64,
    pub inflight_wifi_service: i64,
    pub inflight_entertainment: i64,
    pub departure_arrival_time: i64,
    pub seat_comfort: i64,
    pub cleanliness: i64,
    pub baggage_handling: i64,
    pub checkin_service: i64,
    pub gate_location: i64,
    pub food_drink: i64,
    pub onboard_service: i64,
    pub leg_room_service: i64,
    pub online_boarding: i64,
    pub inflight_service: i64,
}

impl Default for ServiceRatings {
    fn default() -> Self {
        Self::uniform(RATING.default)
    }
}

impl ServiceRatings {
    pub fn uniform(score: i64) -> Self {
        Self {
            ease_online_booking: score,
            inflight_wifi_service: score,
            inflight_entertainment: score,
            departure_arrival_time: score,
            seat_comfort: score,
            cleanliness: score,
            baggage_handling: score,
            checkin_service: score,
            gate_location: score,
            food_drink: score,
            onboard_service: score,
            leg_room_service: score,
            online_boarding: score,
            inflight_service: score,
        }
    }

    /// Values in [`SERVICE_RATING_FIELDS`] order.
    pub fn values(&self) -> [i64; 14] {
        [
            self.ease_online_booking,
            self.inflight_wifi_service,
            self.inflight_entertainment,
            self.departure_arrival_time,
            self.seat_comfort,
            self.cleanliness,
            self.baggage_handling,
            self.checkin_service,
            self.gate_location,
            self.food_drink,
            self.onboard_service,
            self.leg_room_service,
            self.online_boarding,
            self.inflight_service,
        ]
    }

    fn clamped(&self) -> Self {
        let [a, b, c, d, e, f, g, h, i, j, k, l, m, n] = self.values().map(|v| RATING.clamp(v));
        Self {
            ease_online_booking: a,
            inflight_wifi_service: b,
            inflight_entertainment: c,
            departure_arrival_time: d,
            seat_comfort: e,
            cleanliness: f,
            baggage_handling: g,
            checkin_service: h,
            gate_location: i,
            food_drink: j,
            onboard_service: k,
            leg_room_service: l,
            online_boarding: m,
            inflight_service: n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRatingsInput {
    pub gender: Gender,
    pub customer_type: CustomerType,
    pub type_of_travel: TravelPurpose,
    pub travel_class: TravelClass,
    pub age: i64,
    pub flight_distance: i64,
    pub total_delay: i64,
    #[serde(flatten)]
    pub ratings: ServiceRatings,
}

impl Default for ServiceRatingsInput {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            customer_type: CustomerType::Loyal,
            type_of_travel: TravelPurpose::Business,
            travel_class: TravelClass::Eco,
            age: RATINGS_AGE.default,
            flight_distance: RATINGS_FLIGHT_DISTANCE.default,
            total_delay: TOTAL_DELAY.default,
            ratings: ServiceRatings::default(),
        }
    }
}

impl FormInput for ServiceRatingsInput {
    fn form() -> Form {
        let mut controls = vec![
            Control::select("gender", "Gender", Gender::Male),
            Control::select("customer_type", "Customer Type", CustomerType::Loyal),
            Control::select("type_of_travel", "Type of Travel", TravelPurpose::Business),
            Control::select("travel_class", "Class", TravelClass::Eco),
            Control::slider("age", "Age", RATINGS_AGE),
            Control::slider("flight_distance", "Flight Distance", RATINGS_FLIGHT_DISTANCE),
            Control::slider("total_delay", "Total Delay (mins)", TOTAL_DELAY),
        ];
        controls.extend(
            SERVICE_RATING_FIELDS
                .iter()
                .map(|(field, label, _)| Control::slider(*field, *label, RATING)),
        );

        Form {
            title: "User Input Features",
            submit: "Predict Satisfaction",
            controls,
        }
    }

    fn collect(self) -> DashResult<Self> {
        Ok(Self {
            age: RATINGS_AGE.clamp(self.age),
            flight_distance: RATINGS_FLIGHT_DISTANCE.clamp(self.flight_distance),
            total_delay: TOTAL_DELAY.clamp(self.total_delay),
            ratings: self.ratings.clamped(),
            ..self
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceRatingsAdapter;

impl FeatureAdapter for ServiceRatingsAdapter {
    type Input = ServiceRatingsInput;

    fn name(&self) -> &'static str {
        "satisfaction_service_ratings"
    }

    fn compute(&self, input: &ServiceRatingsInput) -> ComputedColumns {
        let mut columns = ComputedColumns::new();
        columns
            .set_int("Age", input.age)
            .set_int("Flight Distance", input.flight_distance)
            .set_int("Total Delay", input.total_delay)
            .one_hot("Gender_", input.gender)
            .one_hot("Customer Type_", input.customer_type)
            .one_hot("Type of Travel_", input.type_of_travel)
            .one_hot("Class_", input.travel_class);

        for ((_, _, column), value) in SERVICE_RATING_FIELDS.iter().zip(input.ratings.values()) {
            columns.set_int(*column, value);
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_buckets_follow_boundaries() {
        assert_eq!(AgeGroup::of(5), AgeGroup::Teen);
        assert_eq!(AgeGroup::of(19), AgeGroup::Teen);
        assert_eq!(AgeGroup::of(20), AgeGroup::YoungAdult);
        assert_eq!(AgeGroup::of(34), AgeGroup::YoungAdult);
        assert_eq!(AgeGroup::of(35), AgeGroup::Adult);
        assert_eq!(AgeGroup::of(59), AgeGroup::Adult);
        assert_eq!(AgeGroup::of(60).code(), 3);
    }

    #[test]
    fn alternate_spellings_are_accepted() {
        let input: ServiceRatingsInput = serde_json::from_str(
            r#"{"customer_type":"Disloyal Customer","type_of_travel":"Personal travel","seat_comfort":5}"#,
        )
        .unwrap();
        assert_eq!(input.customer_type, CustomerType::Disloyal);
        assert_eq!(input.type_of_travel, TravelPurpose::Personal);
        assert_eq!(input.ratings.seat_comfort, 5);
        assert_eq!(input.ratings.cleanliness, RATING.default);
    }

    #[test]
    fn ratings_are_clamped_to_five() {
        let input = ServiceRatingsInput {
            ratings: ServiceRatings::uniform(9),
            age: 0,
            ..ServiceRatingsInput::default()
        }
        .collect()
        .unwrap();
        assert!(input.ratings.values().iter().all(|v| *v == 5));
        assert_eq!(input.age, 1);
    }

    #[test]
    fn service_ratings_emit_every_rating_column() {
        let computed = ServiceRatingsAdapter.compute(&ServiceRatingsInput::default());
        for (_, _, column) in SERVICE_RATING_FIELDS {
            assert_eq!(computed.get(column), Some(3.0), "{column}");
        }
        assert_eq!(computed.get("Class_Eco"), Some(1.0));
        assert_eq!(computed.get("Class_Eco Plus"), Some(0.0));
        assert_eq!(computed.get("Type of Travel_Personal Travel"), Some(0.0));
    }

    #[test]
    fn forms_match_input_fields() {
        assert_eq!(TravelComboInput::form().controls.len(), 8);
        assert_eq!(ServiceRatingsInput::form().controls.len(), 21);
    }
}
