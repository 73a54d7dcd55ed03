//! Exploration parameters.
//!
//! Parameters are named values that an exploration sets when a learner
//! starts a session or enters a state. Each parameter must be declared by a
//! [`ParamSpec`] before a [`ParamChange`] may assign it.

use serde::{Deserialize, Serialize};

/// Type of value a parameter holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjType {
    UnicodeString,
    Real,
    Int,
    NonnegativeInt,
    Html,
    Boolean,
}

/// Declaration of a parameter: a single-key `{obj_type}` descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamSpec {
    pub obj_type: ObjType,
}

impl ParamSpec {
    pub fn new(obj_type: ObjType) -> Self {
        Self { obj_type }
    }
}

/// How a parameter change computes its new value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "generator_id", content = "customization_args")]
pub enum Generator {
    /// Copy a fixed value, optionally rendered as a template.
    Copier {
        value: String,
        #[serde(default)]
        parse_with_jinja: bool,
    },
    /// Pick one of the listed values at random.
    RandomSelector { list_of_values: Vec<String> },
}

/// Assignment of a declared parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamChange {
    pub name: String,
    #[serde(flatten)]
    pub generator: Generator,
}

impl ParamChange {
    pub fn copier(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generator: Generator::Copier {
                value: value.into(),
                parse_with_jinja: false,
            },
        }
    }

    pub fn random_selector(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            generator: Generator::RandomSelector {
                list_of_values: values,
            },
        }
    }
}
