//! View types, selection flags and selection profiles (export task input).
//!
//! The client chooses which kinds of views end up in the merged artifact
//! with a flat set of boolean flags keyed by the host engine's view-type
//! names. Selection input is never fatal: anything that cannot be read as
//! flags degrades to [`ViewSelectionConfig::all_enabled`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// Host-engine view type names understood by the selector.
pub const VIEW_TYPE_DRAWING_SHEET: &str = "DrawingSheet";
pub const VIEW_TYPE_THREE_D: &str = "ThreeD";
pub const VIEW_TYPE_DETAIL: &str = "Detail";
pub const VIEW_TYPE_ELEVATION: &str = "Elevation";
pub const VIEW_TYPE_FLOOR_PLAN: &str = "FloorPlan";
pub const VIEW_TYPE_SECTION: &str = "Section";
pub const VIEW_TYPE_RENDERING: &str = "Rendering";

/// Kind of a view in the host document.
///
/// The set is open: types the selector has no dedicated variant for are
/// kept as [`ViewType::Other`] and can still be addressed by flag name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ViewType {
    DrawingSheet,
    ThreeD,
    Detail,
    Elevation,
    FloorPlan,
    Section,
    Rendering,
    Other(String),
}

impl ViewType {
    /// The flag name used for this type in selection input.
    pub fn name(&self) -> &str {
        match self {
            Self::DrawingSheet => VIEW_TYPE_DRAWING_SHEET,
            Self::ThreeD => VIEW_TYPE_THREE_D,
            Self::Detail => VIEW_TYPE_DETAIL,
            Self::Elevation => VIEW_TYPE_ELEVATION,
            Self::FloorPlan => VIEW_TYPE_FLOOR_PLAN,
            Self::Section => VIEW_TYPE_SECTION,
            Self::Rendering => VIEW_TYPE_RENDERING,
            Self::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            VIEW_TYPE_DRAWING_SHEET => Self::DrawingSheet,
            VIEW_TYPE_THREE_D => Self::ThreeD,
            VIEW_TYPE_DETAIL => Self::Detail,
            VIEW_TYPE_ELEVATION => Self::Elevation,
            VIEW_TYPE_FLOOR_PLAN => Self::FloorPlan,
            VIEW_TYPE_SECTION => Self::Section,
            VIEW_TYPE_RENDERING => Self::Rendering,
            other => Self::Other(other.to_string()),
        }
    }

    /// The seven types with dedicated flags.
    pub fn known() -> [ViewType; 7] {
        [
            Self::DrawingSheet,
            Self::ThreeD,
            Self::Detail,
            Self::Elevation,
            Self::FloorPlan,
            Self::Section,
            Self::Rendering,
        ]
    }
}

impl From<String> for ViewType {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<ViewType> for String {
    fn from(view_type: ViewType) -> Self {
        view_type.name().to_string()
    }
}

impl std::fmt::Display for ViewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Element id of a view inside the host document.
pub type ViewId = i64;

/// A view as enumerated from the host document. Read-only to viewpress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub id: ViewId,
    pub name: String,
    pub view_type: ViewType,
    pub is_template: bool,
    pub is_printable: bool,
}

// ---------------------------------------------------------------------------
// ViewSelectionConfig
// ---------------------------------------------------------------------------

/// Per-view-type export flags.
///
/// A type without an explicit flag is enabled, so an empty set of flags
/// selects everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViewSelectionConfig {
    flags: BTreeMap<String, bool>,
}

impl ViewSelectionConfig {
    /// Every known type explicitly enabled.
    pub fn all_enabled() -> Self {
        Self {
            flags: ViewType::known()
                .iter()
                .map(|t| (t.name().to_string(), true))
                .collect(),
        }
    }

    /// Every known type explicitly disabled.
    pub fn none_enabled() -> Self {
        Self {
            flags: ViewType::known()
                .iter()
                .map(|t| (t.name().to_string(), false))
                .collect(),
        }
    }

    /// Builder-style flag override.
    pub fn with_flag(mut self, view_type: &ViewType, enabled: bool) -> Self {
        self.flags.insert(view_type.name().to_string(), enabled);
        self
    }

    /// Whether views of `view_type` are wanted.
    pub fn is_enabled(&self, view_type: &ViewType) -> bool {
        self.flags.get(view_type.name()).copied().unwrap_or(true)
    }

    /// Parse flags from a JSON object.
    ///
    /// Values may be JSON booleans or the strings `"true"` / `"false"`
    /// (query-string style). Anything else fails the whole parse.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CoreError> {
        let obj = value.as_object().ok_or_else(|| {
            CoreError::ConfigParse("selection flags must be a JSON object".to_string())
        })?;

        let mut flags = BTreeMap::new();
        for (key, raw) in obj {
            let enabled = match raw {
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::String(s) => parse_bool_str(s).ok_or_else(|| {
                    CoreError::ConfigParse(format!("flag '{key}' has non-boolean value '{s}'"))
                })?,
                other => {
                    return Err(CoreError::ConfigParse(format!(
                        "flag '{key}' has non-boolean value {other}"
                    )))
                }
            };
            flags.insert(key.clone(), enabled);
        }

        Ok(Self { flags })
    }

    /// Parse flags from JSON text. See [`from_value`](Self::from_value).
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Lenient variant of [`parse`](Self::parse): malformed text is logged
    /// and replaced by the all-enabled default.
    pub fn parse_or_default(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default view selection");
            Self::default()
        })
    }

    /// Lenient conversion of optional request input. Absent or `null`
    /// input is the default; malformed input is logged and defaulted.
    pub fn from_optional_value(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Self::default(),
            Some(v) => Self::from_value(v).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default view selection");
                Self::default()
            }),
        }
    }

    /// Compact JSON form embedded in the remote job descriptor.
    pub fn to_json_string(&self) -> String {
        serde_json::Value::Object(
            self.flags
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::Bool(*v)))
                .collect(),
        )
        .to_string()
    }
}

impl Default for ViewSelectionConfig {
    fn default() -> Self {
        Self::all_enabled()
    }
}

fn parse_bool_str(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Selection profiles
// ---------------------------------------------------------------------------

/// The view types one deployment of the export task is able to export.
///
/// Flags for types outside the profile are ignored: such views are never
/// selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionProfile {
    pub name: &'static str,
    supported: Vec<ViewType>,
}

impl SelectionProfile {
    pub fn new(name: &'static str, supported: Vec<ViewType>) -> Self {
        Self { name, supported }
    }

    /// All seven known view types.
    pub fn full() -> Self {
        Self::new("full", ViewType::known().to_vec())
    }

    /// Sheets and 3D views only.
    pub fn sheets_and_3d() -> Self {
        Self::new("sheets_and_3d", vec![ViewType::DrawingSheet, ViewType::ThreeD])
    }

    pub fn supports(&self, view_type: &ViewType) -> bool {
        self.supported.contains(view_type)
    }
}

impl Default for SelectionProfile {
    fn default() -> Self {
        Self::full()
    }
}

/// Selection predicate: printable, non-template, supported by the profile
/// and enabled by the flags.
pub fn qualifies(view: &View, config: &ViewSelectionConfig, profile: &SelectionProfile) -> bool {
    !view.is_template
        && view.is_printable
        && profile.supports(&view.view_type)
        && config.is_enabled(&view.view_type)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn view(view_type: ViewType) -> View {
        View {
            id: 1,
            name: "Level 1".to_string(),
            view_type,
            is_template: false,
            is_printable: true,
        }
    }

    #[test]
    fn default_enables_every_known_type() {
        let config = ViewSelectionConfig::default();
        for t in ViewType::known() {
            assert!(config.is_enabled(&t), "{t} should be enabled");
        }
    }

    #[test]
    fn missing_flags_default_to_enabled() {
        let config = ViewSelectionConfig::parse(r#"{"ThreeD": false}"#).unwrap();
        assert!(!config.is_enabled(&ViewType::ThreeD));
        assert!(config.is_enabled(&ViewType::DrawingSheet));
        assert!(config.is_enabled(&ViewType::Other("Legend".into())));
    }

    #[test]
    fn string_flags_are_accepted() {
        let config =
            ViewSelectionConfig::from_value(&json!({"DrawingSheet": "true", "Detail": "False"}))
                .unwrap();
        assert!(config.is_enabled(&ViewType::DrawingSheet));
        assert!(!config.is_enabled(&ViewType::Detail));
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert_matches!(
            ViewSelectionConfig::parse("{not json"),
            Err(CoreError::ConfigParse(_))
        );
        assert_matches!(
            ViewSelectionConfig::parse(r#"{"ThreeD": 3}"#),
            Err(CoreError::ConfigParse(_))
        );
        assert_matches!(
            ViewSelectionConfig::parse(r#"["ThreeD"]"#),
            Err(CoreError::ConfigParse(_))
        );
    }

    #[test]
    fn lenient_parsing_degrades_to_default() {
        assert_eq!(
            ViewSelectionConfig::parse_or_default("garbage"),
            ViewSelectionConfig::all_enabled()
        );
        assert_eq!(
            ViewSelectionConfig::from_optional_value(Some(&json!({"ThreeD": "maybe"}))),
            ViewSelectionConfig::all_enabled()
        );
        assert_eq!(
            ViewSelectionConfig::from_optional_value(None),
            ViewSelectionConfig::all_enabled()
        );
        assert_eq!(
            ViewSelectionConfig::from_optional_value(Some(&serde_json::Value::Null)),
            ViewSelectionConfig::all_enabled()
        );
    }

    #[test]
    fn json_form_is_flat_booleans() {
        let config = ViewSelectionConfig::none_enabled().with_flag(&ViewType::DrawingSheet, true);
        let value: serde_json::Value = serde_json::from_str(&config.to_json_string()).unwrap();
        assert_eq!(value["DrawingSheet"], true);
        assert_eq!(value["ThreeD"], false);
        assert_eq!(value.as_object().unwrap().len(), 7);
        assert_eq!(ViewSelectionConfig::parse(&config.to_json_string()).unwrap(), config);
    }

    #[test]
    fn view_type_names_round_trip_through_strings() {
        assert_eq!(ViewType::from_name("FloorPlan"), ViewType::FloorPlan);
        assert_eq!(ViewType::from_name("Legend"), ViewType::Other("Legend".into()));
        assert_eq!(String::from(ViewType::Section), "Section");
    }

    #[test]
    fn templates_and_unprintable_views_never_qualify() {
        let config = ViewSelectionConfig::default();
        let profile = SelectionProfile::full();

        let mut template = view(ViewType::FloorPlan);
        template.is_template = true;
        let mut unprintable = view(ViewType::FloorPlan);
        unprintable.is_printable = false;

        assert!(qualifies(&view(ViewType::FloorPlan), &config, &profile));
        assert!(!qualifies(&template, &config, &profile));
        assert!(!qualifies(&unprintable, &config, &profile));
    }

    #[test]
    fn profile_limits_selectable_types() {
        let config = ViewSelectionConfig::default();
        let profile = SelectionProfile::sheets_and_3d();

        assert!(qualifies(&view(ViewType::DrawingSheet), &config, &profile));
        assert!(qualifies(&view(ViewType::ThreeD), &config, &profile));
        assert!(!qualifies(&view(ViewType::Section), &config, &profile));
        assert!(!qualifies(&view(ViewType::Other("Legend".into())), &config, &profile));
    }
}
