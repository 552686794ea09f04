//! User configuration. Defaults are merged with `auralog.config.json` from the working
//! directory: lists from the user are appended to the default ones, everything else replaces
//! the default.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::entries::{entities::ChoiceField, normalize::NormalizeOptions};

pub const CONFIG_FILE_NAME: &str = "auralog.config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlConfig {
    pub title: String,
    pub description: String,
    pub meta: Vec<MetaTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub html: HtmlConfig,
    /// Directory holding one file per entry.
    pub content_dir: PathBuf,
    pub medications: Vec<String>,
    pub pain_areas: Vec<String>,
    pub symptoms: Vec<String>,
    pub triggers: Vec<String>,
    /// Include the free text journal of entries in the generated data.
    pub parse_journal: bool,
    pub disable_triggers: bool,
    pub disable_symptoms: bool,
    pub disable_pain_areas: bool,
    pub disable_medications: bool,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            html: HtmlConfig {
                title: "Aura Log".into(),
                description: "My migraine log and dashboard.".into(),
                meta: vec![],
            },
            content_dir: PathBuf::from("entries"),
            medications: strings(&["None"]),
            pain_areas: strings(&[
                "Front Left",
                "Front Right",
                "Back Left",
                "Back Right",
                "Left Eye",
                "Right Eye",
            ]),
            parse_journal: false,
            symptoms: strings(&[
                "Throbbing Pain",
                "Nausea",
                "Light Sensitivity",
                "Noise Sensitivity",
                "Blurred Vision",
                "Fatigue",
                "Neck Pain",
            ]),
            triggers: strings(&[
                "Stress",
                "Don't Know",
                "Weather",
                "Lack of Sleep",
                "Rebound",
                "Processed Foods",
                "Anxiety",
                "Alcohol",
                "Dehydration",
                "Fever",
                "Screen Time",
                "Caffeine",
                "Sun",
                "Hunger",
            ]),
            disable_triggers: false,
            disable_symptoms: false,
            disable_pain_areas: false,
            disable_medications: false,
        }
    }
}

/// What the user wrote in their configuration file. Missing keys keep the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    pub html: Option<UserHtmlConfig>,
    pub content_dir: Option<PathBuf>,
    pub medications: Option<Vec<String>>,
    pub pain_areas: Option<Vec<String>>,
    pub symptoms: Option<Vec<String>>,
    pub triggers: Option<Vec<String>>,
    pub parse_journal: Option<bool>,
    pub disable_triggers: Option<bool>,
    pub disable_symptoms: Option<bool>,
    pub disable_pain_areas: Option<bool>,
    pub disable_medications: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserHtmlConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    pub meta: Option<Vec<MetaTag>>,
}

/// Appends `extra` to `values`, skipping what's already there.
fn append_unique<T: PartialEq>(values: &mut Vec<T>, extra: Option<Vec<T>>) {
    for value in extra.into_iter().flatten() {
        if !values.contains(&value) {
            values.push(value);
        }
    }
}

impl Config {
    pub fn merge(mut self, user: UserConfig) -> Self {
        if let Some(html) = user.html {
            if let Some(title) = html.title {
                self.html.title = title;
            }
            if let Some(description) = html.description {
                self.html.description = description;
            }
            append_unique(&mut self.html.meta, html.meta);
        }
        if let Some(content_dir) = user.content_dir {
            self.content_dir = content_dir;
        }
        append_unique(&mut self.medications, user.medications);
        append_unique(&mut self.pain_areas, user.pain_areas);
        append_unique(&mut self.symptoms, user.symptoms);
        append_unique(&mut self.triggers, user.triggers);

        self.parse_journal = user.parse_journal.unwrap_or(self.parse_journal);
        self.disable_triggers = user.disable_triggers.unwrap_or(self.disable_triggers);
        self.disable_symptoms = user.disable_symptoms.unwrap_or(self.disable_symptoms);
        self.disable_pain_areas = user.disable_pain_areas.unwrap_or(self.disable_pain_areas);
        self.disable_medications = user
            .disable_medications
            .unwrap_or(self.disable_medications);
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let user = serde_json::from_str::<UserConfig>(text)?;
        Ok(Config::default().merge(user))
    }

    /// Loads the configuration at `path`. Problems with the file are logged and the defaults
    /// are used instead, they never stop the application.
    pub fn load(path: &Path) -> Config {
        match Self::try_load(path) {
            Ok(Some(config)) => {
                info!("Loaded configuration from {path:?}");
                config
            }
            Ok(None) => {
                debug!("No configuration at {path:?}, using defaults");
                Config::default()
            }
            Err(e) => {
                error!("Failed to load configuration {path:?}, using defaults: {e:?}");
                Config::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Option<Config>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to read configuration"),
        };
        Self::from_json(&text)
            .context("Failed to parse configuration")
            .map(Some)
    }

    pub fn choices(&self, field: ChoiceField) -> &[String] {
        match field {
            ChoiceField::Triggers => &self.triggers,
            ChoiceField::Symptoms => &self.symptoms,
            ChoiceField::PainAreas => &self.pain_areas,
            ChoiceField::Medications => &self.medications,
        }
    }

    pub fn is_disabled(&self, field: ChoiceField) -> bool {
        match field {
            ChoiceField::Triggers => self.disable_triggers,
            ChoiceField::Symptoms => self.disable_symptoms,
            ChoiceField::PainAreas => self.disable_pain_areas,
            ChoiceField::Medications => self.disable_medications,
        }
    }

    /// Multi-select fields that are asked for and charted.
    pub fn enabled_fields(&self) -> Vec<ChoiceField> {
        ChoiceField::ALL
            .into_iter()
            .filter(|v| !self.is_disabled(*v))
            .collect()
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            parse_journal: self.parse_journal,
        }
    }
}
