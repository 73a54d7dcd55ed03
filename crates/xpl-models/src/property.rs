//! The mutable properties of an exploration.
//!
//! [`ExplorationProperty`] is the closed list of attribute names a caller may
//! change through a put. [`ExplorationChange`] carries new values for any
//! subset of them; it can be built directly or parsed from a loosely typed
//! JSON properties dict.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::commands::ExplorationCommand;
use crate::error::{ModelError, ModelResult};
use crate::exploration::{Exploration, State};
use crate::params::{ParamChange, ParamSpec};

/// A mutable exploration attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationProperty {
    Title,
    Category,
    InitStateName,
    States,
    ParamSpecs,
    ParamChanges,
    DefaultSkin,
}

impl ExplorationProperty {
    pub const ALL: [ExplorationProperty; 7] = [
        Self::Title,
        Self::Category,
        Self::InitStateName,
        Self::States,
        Self::ParamSpecs,
        Self::ParamChanges,
        Self::DefaultSkin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Category => "category",
            Self::InitStateName => "init_state_name",
            Self::States => "states",
            Self::ParamSpecs => "param_specs",
            Self::ParamChanges => "param_changes",
            Self::DefaultSkin => "default_skin",
        }
    }
}

impl FromStr for ExplorationProperty {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|property| property.as_str() == s)
            .ok_or_else(|| {
                ModelError::InvalidArgument(format!(
                    "invalid key for exploration properties dict: {s}"
                ))
            })
    }
}

impl fmt::Display for ExplorationProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New values for a subset of exploration properties.
///
/// Unset fields leave the corresponding property unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExplorationChange {
    pub title: Option<String>,
    pub category: Option<String>,
    pub init_state_name: Option<String>,
    pub states: Option<BTreeMap<String, State>>,
    pub param_specs: Option<BTreeMap<String, ParamSpec>>,
    pub param_changes: Option<Vec<ParamChange>>,
    pub default_skin: Option<String>,
}

impl ExplorationChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_init_state_name(mut self, name: impl Into<String>) -> Self {
        self.init_state_name = Some(name.into());
        self
    }

    pub fn with_states(mut self, states: BTreeMap<String, State>) -> Self {
        self.states = Some(states);
        self
    }

    pub fn with_param_specs(mut self, specs: BTreeMap<String, ParamSpec>) -> Self {
        self.param_specs = Some(specs);
        self
    }

    pub fn with_param_changes(mut self, changes: Vec<ParamChange>) -> Self {
        self.param_changes = Some(changes);
        self
    }

    pub fn with_default_skin(mut self, skin: impl Into<String>) -> Self {
        self.default_skin = Some(skin.into());
        self
    }

    /// Parse a loosely typed properties dict.
    ///
    /// Every key is checked against [`ExplorationProperty`] before any value
    /// is decoded, so an unknown key is reported even when it sorts after
    /// valid ones. `None` is the empty change.
    pub fn from_properties(properties: Option<&Map<String, Value>>) -> ModelResult<Self> {
        let Some(properties) = properties else {
            return Ok(Self::default());
        };

        let keyed = properties
            .iter()
            .map(|(key, value)| Ok((key.parse::<ExplorationProperty>()?, value)))
            .collect::<ModelResult<Vec<_>>>()?;

        let mut change = Self::default();
        for (property, value) in keyed {
            match property {
                ExplorationProperty::Title => change.title = Some(decode(property, value)?),
                ExplorationProperty::Category => change.category = Some(decode(property, value)?),
                ExplorationProperty::InitStateName => {
                    change.init_state_name = Some(decode(property, value)?)
                }
                ExplorationProperty::States => change.states = Some(decode(property, value)?),
                ExplorationProperty::ParamSpecs => {
                    change.param_specs = Some(decode(property, value)?)
                }
                ExplorationProperty::ParamChanges => {
                    change.param_changes = Some(decode(property, value)?)
                }
                ExplorationProperty::DefaultSkin => {
                    change.default_skin = Some(decode(property, value)?)
                }
            }
        }
        Ok(change)
    }

    /// Properties this change sets, in declaration order.
    pub fn properties(&self) -> Vec<ExplorationProperty> {
        ExplorationProperty::ALL
            .into_iter()
            .filter(|property| self.sets(*property))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.properties().is_empty()
    }

    fn sets(&self, property: ExplorationProperty) -> bool {
        match property {
            ExplorationProperty::Title => self.title.is_some(),
            ExplorationProperty::Category => self.category.is_some(),
            ExplorationProperty::InitStateName => self.init_state_name.is_some(),
            ExplorationProperty::States => self.states.is_some(),
            ExplorationProperty::ParamSpecs => self.param_specs.is_some(),
            ExplorationProperty::ParamChanges => self.param_changes.is_some(),
            ExplorationProperty::DefaultSkin => self.default_skin.is_some(),
        }
    }

    /// A copy of `base` with this change merged in. `base` is not touched.
    pub fn apply_to(&self, base: &Exploration) -> Exploration {
        let mut merged = base.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(category) = &self.category {
            merged.category = category.clone();
        }
        if let Some(name) = &self.init_state_name {
            merged.init_state_name = name.clone();
        }
        if let Some(states) = &self.states {
            merged.states = states.clone();
        }
        if let Some(specs) = &self.param_specs {
            merged.param_specs = specs.clone();
        }
        if let Some(changes) = &self.param_changes {
            merged.param_changes = changes.clone();
        }
        if let Some(skin) = &self.default_skin {
            merged.default_skin = skin.clone();
        }
        merged
    }

    /// One `edit_exploration_property` command per property that actually
    /// changes relative to `base`.
    pub fn to_commands(&self, base: &Exploration) -> ModelResult<Vec<ExplorationCommand>> {
        let before = to_object(base)?;
        let after = to_object(&self.apply_to(base))?;
        let mut cmds = Vec::new();
        for property in self.properties() {
            let old_value = before.get(property.as_str()).cloned().unwrap_or(Value::Null);
            let new_value = after.get(property.as_str()).cloned().unwrap_or(Value::Null);
            if old_value != new_value {
                cmds.push(ExplorationCommand::EditExplorationProperty {
                    property_name: property,
                    new_value,
                    old_value,
                });
            }
        }
        Ok(cmds)
    }
}

fn decode<T: DeserializeOwned>(property: ExplorationProperty, value: &Value) -> ModelResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| {
        ModelError::InvalidArgument(format!("invalid value for exploration property {property}: {e}"))
    })
}

fn to_object(exploration: &Exploration) -> ModelResult<Map<String, Value>> {
    match serde_json::to_value(exploration) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ModelError::Validation("exploration did not serialize to an object".into())),
        Err(e) => Err(ModelError::Validation(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn property_names_round_trip_through_from_str() {
        for property in ExplorationProperty::ALL {
            assert_eq!(property.as_str().parse::<ExplorationProperty>().unwrap(), property);
        }
    }

    #[test]
    fn unknown_property_name_is_invalid_argument() {
        let err = "id".parse::<ExplorationProperty>().unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(msg) if msg.contains("id")));
    }

    #[test]
    fn absent_properties_is_empty_change() {
        let change = ExplorationChange::from_properties(None).unwrap();
        assert!(change.is_empty());
    }

    #[test]
    fn parses_known_properties() {
        let map = props(json!({"title": "New", "default_skin": "snapshots_v1"}));
        let change = ExplorationChange::from_properties(Some(&map)).unwrap();
        assert_eq!(change.title.as_deref(), Some("New"));
        assert_eq!(change.default_skin.as_deref(), Some("snapshots_v1"));
        assert_eq!(
            change.properties(),
            vec![ExplorationProperty::Title, ExplorationProperty::DefaultSkin]
        );
    }

    #[test]
    fn unknown_key_rejected_even_after_valid_keys() {
        let map = props(json!({"category": "Math", "title": "T", "version": 3}));
        let err = ExplorationChange::from_properties(Some(&map)).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidArgument("invalid key for exploration properties dict: version".into())
        );
    }

    #[test]
    fn wrongly_typed_value_is_rejected() {
        let map = props(json!({"title": 7}));
        let err = ExplorationChange::from_properties(Some(&map)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(msg) if msg.contains("title")));
    }

    #[test]
    fn apply_to_leaves_base_untouched() {
        let base = Exploration::new("Old", "Cat", "Intro");
        let merged = ExplorationChange::new().with_title("New").apply_to(&base);
        assert_eq!(base.title, "Old");
        assert_eq!(merged.title, "New");
        assert_eq!(merged.category, "Cat");
    }

    #[test]
    fn to_commands_skips_unchanged_values() {
        let base = Exploration::new("Old", "Cat", "Intro");
        let change = ExplorationChange::new().with_title("New").with_category("Cat");
        let cmds = change.to_commands(&base).unwrap();
        assert_eq!(
            cmds,
            vec![ExplorationCommand::EditExplorationProperty {
                property_name: ExplorationProperty::Title,
                new_value: json!("New"),
                old_value: json!("Old"),
            }]
        );
    }
}
