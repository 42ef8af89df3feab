//! Form controls and the input-collector contract.
//!
//! Every dashboard publishes its inputs as a list of controls. A control
//! yields exactly one scalar: a choice from a closed option list, or an
//! integer inside slider bounds. Collecting an input clamps numbers into
//! their bounds; nothing else is checked here.

use serde::Serialize;

use crate::errors::DashResult;

/// A closed set of categorical values whose labels double as column suffixes.
pub trait Category: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn labels() -> Vec<String> {
        Self::ALL.iter().map(|c| c.label().to_string()).collect()
    }
}

/// Declares a [`Category`] enum whose serde names are its labels.
macro_rules! category {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $(#[serde(rename = $label $(, alias = $alias)*)] $variant),+
        }

        impl $crate::form::Category for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }
    };
}

pub(crate) use category;

/// Inclusive integer bounds of a slider, with its initial position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl Bounds {
    pub const fn new(min: i64, max: i64, default: i64) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    Select {
        name: &'static str,
        label: &'static str,
        options: Vec<String>,
        default: String,
        /// Name of another select whose current value is not offered here.
        #[serde(skip_serializing_if = "Option::is_none")]
        excludes_value_of: Option<&'static str>,
    },
    Slider {
        name: &'static str,
        label: &'static str,
        #[serde(flatten)]
        bounds: Bounds,
    },
}

impl Control {
    pub fn select<C: Category>(name: &'static str, label: &'static str, default: C) -> Self {
        Control::Select {
            name,
            label,
            options: C::labels(),
            default: default.label().to_string(),
            excludes_value_of: None,
        }
    }

    pub fn slider(name: &'static str, label: &'static str, bounds: Bounds) -> Self {
        Control::Slider { name, label, bounds }
    }

    pub fn excluding(mut self, other: &'static str) -> Self {
        if let Control::Select {
            excludes_value_of, ..
        } = &mut self
        {
            *excludes_value_of = Some(other);
        }
        self
    }

    pub fn name(&self) -> &'static str {
        match self {
            Control::Select { name, .. } | Control::Slider { name, .. } => *name,
        }
    }
}

/// The rendered form of one dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Form {
    pub title: &'static str,
    pub submit: &'static str,
    pub controls: Vec<Control>,
}

/// Raw input captured from a dashboard form.
pub trait FormInput: Sized {
    fn form() -> Form;

    /// Clamp numeric fields into their control bounds.
    fn collect(self) -> DashResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_respects_bounds() {
        let age = Bounds::new(5, 100, 30);
        assert_eq!(age.clamp(1), 5);
        assert_eq!(age.clamp(42), 42);
        assert_eq!(age.clamp(250), 100);
    }

    #[test]
    fn slider_serializes_flat_bounds() {
        let control = Control::slider("age", "Age", Bounds::new(5, 100, 30));
        let json = serde_json::to_value(&control).unwrap();
        assert_eq!(json["kind"], "slider");
        assert_eq!(json["min"], 5);
        assert_eq!(json["default"], 30);
    }
}
