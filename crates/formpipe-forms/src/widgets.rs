//! The widget tree of a form.
//!
//! A form's layout is an [`Area`]: an ordered list of [`Widget`]s. Widgets are
//! a closed set of variants:
//!
//! - [`Widget::Field`] produces one output key (`fieldName`).
//! - [`Widget::Conditional`] holds a nested area whose fields are only active
//!   when a controlling field has a given value.
//! - [`Widget::Layout`] holds nested areas purely for presentation (columns).
//! - [`Widget::Content`] carries no field at all (rich text, images).
//!
//! Widgets deserialize from the stored JSON shape, where every widget is an
//! object with a `type` tag.
//!
//! ```
//! use formpipe_forms::widgets::{Area, Widget};
//!
//! let area: Area = serde_json::from_value(serde_json::json!({
//!     "items": [
//!         {"type": "radio", "fieldName": "newsletter"},
//!         {
//!             "type": "conditional",
//!             "conditionName": "newsletter",
//!             "conditionValue": "yes",
//!             "contents": {"items": [{"type": "email", "fieldName": "address"}]}
//!         }
//!     ]
//! })).unwrap();
//!
//! assert_eq!(area.field_names(), vec!["newsletter", "address"]);
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

/// The `type` tag of conditional containers.
pub const CONDITIONAL_WIDGET: &str = "conditional";

/// An ordered container of widgets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Area {
    /// The widgets, in document order.
    #[serde(default)]
    pub items: Vec<Widget>,
}

impl Area {
    /// Creates an area from a list of widgets.
    pub const fn new(items: Vec<Widget>) -> Self {
        Self { items }
    }

    /// Returns `true` if the area has no widgets.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Collects this area and every nested area, in pre-order.
    ///
    /// The area itself comes first, followed by the areas nested in its
    /// widgets in the order they are encountered, each followed by its own
    /// nested areas.
    pub fn walk_areas(&self) -> Vec<&Self> {
        let mut areas = Vec::new();
        self.collect_areas(&mut areas);
        areas
    }

    fn collect_areas<'a>(&'a self, areas: &mut Vec<&'a Self>) {
        areas.push(self);
        for widget in &self.items {
            for nested in widget.nested_areas() {
                nested.collect_areas(areas);
            }
        }
    }

    /// Returns every field widget of this area and its nested areas.
    ///
    /// Areas are visited as in [`walk_areas`](Self::walk_areas) and each
    /// area's widgets left to right. This is the order fields are sanitized in.
    pub fn field_widgets(&self) -> Vec<&FieldWidget> {
        self.walk_areas()
            .into_iter()
            .flat_map(|area| area.items.iter())
            .filter_map(Widget::as_field)
            .collect()
    }

    /// Returns the names of every field in this area and its nested areas.
    pub fn field_names(&self) -> Vec<&str> {
        self.field_widgets()
            .into_iter()
            .map(|field| field.field_name.as_str())
            .collect()
    }
}

/// A widget producing one submitted value.
#[derive(Debug, Clone)]
pub struct FieldWidget {
    /// The field type tag used to look up its sanitizer.
    pub widget_type: String,
    /// The output key this field writes.
    pub field_name: String,
    /// The human-readable label.
    pub label: Option<String>,
    /// Whether a value must be supplied.
    pub required: bool,
    /// Type-specific options (`choices`, `maxLength`, ...).
    pub options: Map<String, Value>,
}

impl FieldWidget {
    /// Returns a type-specific option.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

/// A container whose fields are active only when a controlling field has
/// a specific value.
#[derive(Debug, Clone)]
pub struct ConditionalWidget {
    /// The name of the controlling field.
    pub condition_name: String,
    /// The value of the controlling field that activates the contents.
    pub condition_value: String,
    /// The dependent widgets.
    pub contents: Area,
}

/// A presentational container holding nested areas.
#[derive(Debug, Clone)]
pub struct LayoutWidget {
    /// The layout type tag.
    pub widget_type: String,
    /// The nested areas.
    pub areas: Vec<Area>,
}

/// A single configured widget.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawWidget")]
pub enum Widget {
    /// A form field.
    Field(FieldWidget),
    /// A conditional container.
    Conditional(ConditionalWidget),
    /// A layout container.
    Layout(LayoutWidget),
    /// A widget without a field, identified by its type tag.
    Content(String),
}

impl Widget {
    /// Creates a field widget with no options.
    pub fn field(widget_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::Field(FieldWidget {
            widget_type: widget_type.into(),
            field_name: field_name.into(),
            label: None,
            required: false,
            options: Map::new(),
        })
    }

    /// Creates a required field widget with no options.
    pub fn required_field(widget_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        let mut widget = Self::field(widget_type, field_name);
        if let Self::Field(field) = &mut widget {
            field.required = true;
        }
        widget
    }

    /// Creates a conditional container.
    pub fn conditional(
        condition_name: impl Into<String>,
        condition_value: impl Into<String>,
        items: Vec<Self>,
    ) -> Self {
        Self::Conditional(ConditionalWidget {
            condition_name: condition_name.into(),
            condition_value: condition_value.into(),
            contents: Area::new(items),
        })
    }

    /// Creates a layout container.
    pub fn layout(widget_type: impl Into<String>, areas: Vec<Area>) -> Self {
        Self::Layout(LayoutWidget {
            widget_type: widget_type.into(),
            areas,
        })
    }

    /// Returns the type tag of this widget.
    pub fn widget_type(&self) -> &str {
        match self {
            Self::Field(field) => &field.widget_type,
            Self::Conditional(_) => CONDITIONAL_WIDGET,
            Self::Layout(layout) => &layout.widget_type,
            Self::Content(widget_type) => widget_type,
        }
    }

    /// Returns the field this widget produces, if any.
    pub const fn as_field(&self) -> Option<&FieldWidget> {
        match self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Returns the areas nested directly inside this widget.
    pub fn nested_areas(&self) -> &[Area] {
        match self {
            Self::Conditional(conditional) => std::slice::from_ref(&conditional.contents),
            Self::Layout(layout) => &layout.areas,
            Self::Field(_) | Self::Content(_) => &[],
        }
    }
}

/// The stored JSON shape shared by every widget type.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWidget {
    #[serde(rename = "type")]
    widget_type: String,
    #[serde(default)]
    field_name: Option<String>,
    #[serde(default)]
    field_label: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    condition_name: Option<String>,
    #[serde(default)]
    condition_value: Option<Value>,
    #[serde(default)]
    contents: Option<Area>,
    #[serde(default)]
    areas: Option<Vec<Area>>,
    #[serde(flatten)]
    options: Map<String, Value>,
}

impl TryFrom<RawWidget> for Widget {
    type Error = String;

    fn try_from(raw: RawWidget) -> Result<Self, Self::Error> {
        if raw.widget_type == CONDITIONAL_WIDGET {
            let condition_name = raw
                .condition_name
                .filter(|name| !name.is_empty())
                .ok_or_else(|| "conditional widget is missing `conditionName`".to_string())?;
            let condition_value = match raw.condition_value {
                Some(Value::String(s)) => s,
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            return Ok(Self::Conditional(ConditionalWidget {
                condition_name,
                condition_value,
                contents: raw.contents.unwrap_or_default(),
            }));
        }

        if let Some(areas) = raw.areas {
            return Ok(Self::Layout(LayoutWidget {
                widget_type: raw.widget_type,
                areas,
            }));
        }

        match raw.field_name.filter(|name| !name.is_empty()) {
            Some(field_name) => Ok(Self::Field(FieldWidget {
                widget_type: raw.widget_type,
                field_name,
                label: raw.field_label,
                required: raw.required,
                options: raw.options,
            })),
            None => Ok(Self::Content(raw.widget_type)),
        }
    }
}
