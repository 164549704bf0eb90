//! Bedrock form model: what the workflow asks players, and how answers parse.
//!
//! Forms serialize to the JSON the client expects in a ModalFormRequest.
//! Responses arrive as the raw JSON string of a ModalFormResponse and are
//! validated against the form that was sent.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("malformed form response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("button index {index} out of range ({count} buttons)")]
    InvalidButton { index: usize, count: usize },

    #[error("expected {expected} form values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("invalid value for form element {index}")]
    InvalidValue { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuButton {
    pub text: String,
}

/// A form sent to a player.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Form {
    /// Simple form: a list of buttons.
    #[serde(rename = "form")]
    Menu {
        title: String,
        content: String,
        buttons: Vec<MenuButton>,
    },
    /// Two-button yes/no dialog.
    #[serde(rename = "modal")]
    Modal {
        title: String,
        content: String,
        button1: String,
        button2: String,
    },
    /// Custom form: an ordered list of typed input elements.
    #[serde(rename = "custom_form")]
    Custom {
        title: String,
        content: Vec<FormElement>,
    },
}

/// One element of a custom form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormElement {
    Label {
        text: String,
    },
    Input {
        text: String,
        placeholder: String,
        default: String,
    },
    Dropdown {
        text: String,
        options: Vec<String>,
        default: usize,
    },
    Slider {
        text: String,
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    },
    Toggle {
        text: String,
        default: bool,
    },
}

impl FormElement {
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label { text: text.into() }
    }

    pub fn input(text: impl Into<String>, placeholder: impl Into<String>, default: impl Into<String>) -> Self {
        Self::Input {
            text: text.into(),
            placeholder: placeholder.into(),
            default: default.into(),
        }
    }

    pub fn dropdown(text: impl Into<String>, options: Vec<String>) -> Self {
        Self::Dropdown {
            text: text.into(),
            options,
            default: 0,
        }
    }

    pub fn slider(text: impl Into<String>, min: u32, max: u32, default: u32) -> Self {
        Self::Slider {
            text: text.into(),
            min: f64::from(min),
            max: f64::from(max),
            step: 1.0,
            default: f64::from(default.clamp(min, max)),
        }
    }

    pub fn toggle(text: impl Into<String>, default: bool) -> Self {
        Self::Toggle {
            text: text.into(),
            default,
        }
    }

    fn parse_value(&self, index: usize, value: &Value) -> Result<FormValue, FormError> {
        let invalid = FormError::InvalidValue { index };
        match self {
            FormElement::Label { .. } => Ok(FormValue::Empty),
            FormElement::Input { .. } => value
                .as_str()
                .map(|s| FormValue::Text(s.to_string()))
                .ok_or(invalid),
            FormElement::Dropdown { options, .. } => match value.as_u64() {
                Some(i) if (i as usize) < options.len() => Ok(FormValue::Choice(i as usize)),
                _ => Err(invalid),
            },
            FormElement::Slider { min, max, .. } => match value.as_f64() {
                Some(v) if v >= *min && v <= *max => Ok(FormValue::Number(v)),
                _ => Err(invalid),
            },
            FormElement::Toggle { .. } => value.as_bool().map(FormValue::Flag).ok_or(invalid),
        }
    }
}

/// A single submitted custom-form value.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Labels carry no value.
    Empty,
    Text(String),
    Choice(usize),
    Number(f64),
    Flag(bool),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<usize> {
        match self {
            FormValue::Choice(i) => Some(*i),
            _ => None,
        }
    }

    /// Slider value rounded to a whole number.
    pub fn as_count(&self) -> Option<u32> {
        match self {
            FormValue::Number(v) => Some(v.round().max(0.0) as u32),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FormValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

/// A validated answer to a form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormResponse {
    Menu(usize),
    Modal(bool),
    Custom(Vec<FormValue>),
    /// The player closed the form without answering.
    Closed,
}

impl Form {
    pub fn menu<I, S>(title: impl Into<String>, content: impl Into<String>, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Menu {
            title: title.into(),
            content: content.into(),
            buttons: buttons
                .into_iter()
                .map(|b| MenuButton { text: b.into() })
                .collect(),
        }
    }

    pub fn modal(
        title: impl Into<String>,
        content: impl Into<String>,
        yes: impl Into<String>,
        no: impl Into<String>,
    ) -> Self {
        Self::Modal {
            title: title.into(),
            content: content.into(),
            button1: yes.into(),
            button2: no.into(),
        }
    }

    pub fn custom(title: impl Into<String>, elements: Vec<FormElement>) -> Self {
        Self::Custom {
            title: title.into(),
            content: elements,
        }
    }

    /// JSON payload for the client.
    pub fn to_json(&self) -> String {
        // Serializing plain strings, numbers and vectors cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Validate the client's response data against this form.
    ///
    /// `None` or a JSON `null` means the form was closed.
    pub fn parse_response(&self, data: Option<&str>) -> Result<FormResponse, FormError> {
        let Some(raw) = data else {
            return Ok(FormResponse::Closed);
        };
        let value: Value = serde_json::from_str(raw.trim())?;
        if value.is_null() {
            return Ok(FormResponse::Closed);
        }

        match self {
            Form::Menu { buttons, .. } => {
                let index = value
                    .as_u64()
                    .ok_or(FormError::InvalidValue { index: 0 })? as usize;
                if index >= buttons.len() {
                    return Err(FormError::InvalidButton {
                        index,
                        count: buttons.len(),
                    });
                }
                Ok(FormResponse::Menu(index))
            }
            Form::Modal { .. } => value
                .as_bool()
                .map(FormResponse::Modal)
                .ok_or(FormError::InvalidValue { index: 0 }),
            Form::Custom { content, .. } => {
                let values = value
                    .as_array()
                    .ok_or(FormError::InvalidValue { index: 0 })?;
                if values.len() != content.len() {
                    return Err(FormError::LengthMismatch {
                        expected: content.len(),
                        got: values.len(),
                    });
                }
                content
                    .iter()
                    .zip(values)
                    .enumerate()
                    .map(|(i, (element, v))| element.parse_value(i, v))
                    .collect::<Result<Vec<_>, _>>()
                    .map(FormResponse::Custom)
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
