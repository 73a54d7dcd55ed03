use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use xpl_store::VersionedModel;

use crate::commands::ExplorationCommand;
use crate::error::{ModelError, ModelResult};
use crate::params::{ParamChange, ParamSpec};

/// Skin used to display an exploration when none is chosen.
pub const DEFAULT_SKIN: &str = "conversation_v1";

/// Rule destination that ends the exploration.
pub const END_DEST: &str = "END";

/// Maximum length of the short text fields of an exploration.
pub const MAX_CHAR_FIELD_LEN: usize = 100;

fn default_skin() -> String {
    DEFAULT_SKIN.to_string()
}

/// Versioned model of an exploration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exploration {
    /// What this exploration is called.
    pub title: String,
    /// The category this exploration belongs to.
    pub category: String,
    /// Name of the state a learner starts in. Must be a key of `states`.
    pub init_state_name: String,
    /// The state graph, keyed by state name. Never empty.
    pub states: BTreeMap<String, State>,
    /// Declared parameters, keyed by parameter name.
    #[serde(default)]
    pub param_specs: BTreeMap<String, ParamSpec>,
    /// Parameter changes applied once at the start of a session.
    #[serde(default)]
    pub param_changes: Vec<ParamChange>,
    /// Template used to render the exploration.
    #[serde(default = "default_skin")]
    pub default_skin: String,
}

impl Exploration {
    /// A minimal valid exploration with one state named `init_state_name`.
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        init_state_name: impl Into<String>,
    ) -> Self {
        let init_state_name = init_state_name.into();
        let mut states = BTreeMap::new();
        states.insert(init_state_name.clone(), State::new(&init_state_name));
        Self {
            title: title.into(),
            category: category.into(),
            init_state_name,
            states,
            param_specs: BTreeMap::new(),
            param_changes: Vec::new(),
            default_skin: default_skin(),
        }
    }

    /// Check every structural invariant of the exploration.
    pub fn check(&self) -> ModelResult<()> {
        check_char_field("title", &self.title)?;
        check_char_field("category", &self.category)?;
        check_char_field("init_state_name", &self.init_state_name)?;
        check_char_field("default_skin", &self.default_skin)?;

        if self.states.is_empty() {
            return Err(ModelError::Validation(
                "exploration must have at least one state".into(),
            ));
        }
        if !self.states.contains_key(&self.init_state_name) {
            return Err(ModelError::Validation(format!(
                "initial state {:?} is not one of the exploration's states",
                self.init_state_name
            )));
        }

        for name in self.param_specs.keys() {
            if name.is_empty() {
                return Err(ModelError::Validation(
                    "parameter names must not be empty".into(),
                ));
            }
        }
        self.check_param_changes(&self.param_changes, "exploration")?;

        for (name, state) in &self.states {
            if name.is_empty() || name == END_DEST {
                return Err(ModelError::Validation(format!(
                    "invalid state name {name:?}"
                )));
            }
            if name.chars().count() > MAX_CHAR_FIELD_LEN {
                return Err(ModelError::Validation(format!(
                    "state name {name:?} is longer than {MAX_CHAR_FIELD_LEN} characters"
                )));
            }
            self.check_param_changes(&state.param_changes, name)?;
            for rule in &state.interaction.rules {
                if rule.dest != END_DEST && !self.states.contains_key(&rule.dest) {
                    return Err(ModelError::Validation(format!(
                        "rule {:?} in state {name:?} points to unknown state {:?}",
                        rule.name, rule.dest
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_param_changes(&self, changes: &[ParamChange], owner: &str) -> ModelResult<()> {
        match changes
            .iter()
            .find(|change| !self.param_specs.contains_key(&change.name))
        {
            Some(change) => Err(ModelError::Validation(format!(
                "{owner} changes undeclared parameter {:?}",
                change.name
            ))),
            None => Ok(()),
        }
    }
}

fn check_char_field(field: &str, value: &str) -> ModelResult<()> {
    if value.chars().count() > MAX_CHAR_FIELD_LEN {
        return Err(ModelError::Validation(format!(
            "{field} is longer than {MAX_CHAR_FIELD_LEN} characters"
        )));
    }
    Ok(())
}

impl VersionedModel for Exploration {
    const KIND: &'static str = "exploration";
    const ALLOW_REVERT: bool = true;
    type Command = ExplorationCommand;

    fn validate(&self) -> Result<(), String> {
        self.check().map_err(|e| e.to_string())
    }
}

/// One step of an exploration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub content: Vec<Content>,
    /// Parameter changes applied when a learner enters this state.
    #[serde(default)]
    pub param_changes: Vec<ParamChange>,
    pub interaction: Interaction,
}

impl State {
    /// An empty state whose default rule loops back to itself.
    pub fn new(name: &str) -> Self {
        Self {
            content: Vec::new(),
            param_changes: Vec::new(),
            interaction: Interaction::continue_to(name),
        }
    }

    /// Names of the states this state can lead to.
    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.interaction.rules.iter().map(|rule| rule.dest.as_str())
    }
}

/// Displayable content of a state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Content {
    Text(String),
    Image(String),
    Video(String),
}

/// The widget a learner interacts with and the rules that route answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub widget_id: String,
    #[serde(default)]
    pub customization_args: BTreeMap<String, Value>,
    #[serde(default)]
    pub rules: Vec<AnswerRule>,
}

impl Interaction {
    /// A continue button whose default rule goes to `dest`.
    pub fn continue_to(dest: &str) -> Self {
        Self {
            widget_id: "Continue".into(),
            customization_args: BTreeMap::new(),
            rules: vec![AnswerRule::default_to(dest)],
        }
    }
}

/// Routes an answer matching `name`/`inputs` to state `dest`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerRule {
    pub name: String,
    #[serde(default)]
    pub inputs: BTreeMap<String, Value>,
    pub dest: String,
    #[serde(default)]
    pub feedback: Vec<String>,
}

impl AnswerRule {
    pub fn default_to(dest: &str) -> Self {
        Self {
            name: "Default".into(),
            inputs: BTreeMap::new(),
            dest: dest.to_string(),
            feedback: Vec::new(),
        }
    }
}
