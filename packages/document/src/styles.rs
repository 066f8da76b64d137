//! # Block Styles
//!
//! Style records attached to every block.
//!
//! Styles are grouped into categories (typography, spacing, ...). Each
//! category is either one fixed record or a record per breakpoint:
//!
//! ```json
//! { "kind": "fixed", "value": { "fontSize": "16px" } }
//! { "kind": "responsive", "values": { "default": { "fontSize": "16px" }, "xs": { "fontSize": "14px" } } }
//! ```
//!
//! Resolution of these values down to one breakpoint lives in
//! `blockpage-styles`.

use crate::error::BreakpointParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Viewport width tier, ordered widest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    #[default]
    Default,
    Md,
    Sm,
    Xs,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 4] = [Breakpoint::Default, Breakpoint::Md, Breakpoint::Sm, Breakpoint::Xs];

    /// Upper viewport bound used in `@media (max-width: ..)`. `Default` has none.
    pub fn max_width(self) -> Option<u32> {
        match self {
            Breakpoint::Default => None,
            Breakpoint::Md => Some(1024),
            Breakpoint::Sm => Some(768),
            Breakpoint::Xs => Some(576),
        }
    }

    /// Next wider breakpoint
    pub fn wider(self) -> Option<Breakpoint> {
        match self {
            Breakpoint::Default => None,
            Breakpoint::Md => Some(Breakpoint::Default),
            Breakpoint::Sm => Some(Breakpoint::Md),
            Breakpoint::Xs => Some(Breakpoint::Sm),
        }
    }

    /// Lookup order for a value at this breakpoint: itself first, then every
    /// wider breakpoint down to `Default`.
    pub fn cascade(self) -> impl Iterator<Item = Breakpoint> {
        std::iter::successors(Some(self), |bp| bp.wider())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Breakpoint::Default => "default",
            Breakpoint::Md => "md",
            Breakpoint::Sm => "sm",
            Breakpoint::Xs => "xs",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Breakpoint {
    type Err = BreakpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "lg" | "desktop" => Ok(Breakpoint::Default),
            "md" => Ok(Breakpoint::Md),
            "sm" => Ok(Breakpoint::Sm),
            "xs" => Ok(Breakpoint::Xs),
            _ => Err(BreakpointParseError::Unknown(s.to_string())),
        }
    }
}

/// A value that is either the same everywhere or set per breakpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Responsive<T> {
    Fixed { value: T },
    Responsive { values: BTreeMap<Breakpoint, T> },
}

impl<T> Responsive<T> {
    pub fn fixed(value: T) -> Self {
        Responsive::Fixed { value }
    }

    pub fn responsive(values: impl IntoIterator<Item = (Breakpoint, T)>) -> Self {
        Responsive::Responsive {
            values: values.into_iter().collect(),
        }
    }

    /// Value stored for exactly this breakpoint, without cascading.
    /// A fixed value counts as set for every breakpoint.
    pub fn at(&self, breakpoint: Breakpoint) -> Option<&T> {
        match self {
            Responsive::Fixed { value } => Some(value),
            Responsive::Responsive { values } => values.get(&breakpoint),
        }
    }
}

impl<T: StyleCategory + Clone + Default> Responsive<T> {
    /// Deep merge of a patch into this value.
    ///
    /// - fixed into fixed merges the records
    /// - responsive into responsive merges breakpoint by breakpoint; a
    ///   breakpoint only in the patch is added
    /// - responsive into fixed keeps our record as the `default` entry and
    ///   then merges the patch maps
    /// - fixed into responsive applies the patch record to `default` and to
    ///   every breakpoint already set, so the patched properties read the
    ///   same everywhere
    pub fn merge(&mut self, patch: &Responsive<T>) {
        let promoted = match (&*self, patch) {
            (Responsive::Fixed { value }, Responsive::Responsive { .. }) => Some(value.clone()),
            _ => None,
        };
        if let Some(base) = promoted {
            *self = Responsive::responsive([(Breakpoint::Default, base)]);
        }

        match (self, patch) {
            (Responsive::Fixed { value }, Responsive::Fixed { value: incoming }) => value.merge(incoming),
            (Responsive::Responsive { values }, Responsive::Responsive { values: incoming }) => {
                for (breakpoint, record) in incoming {
                    values
                        .entry(*breakpoint)
                        .and_modify(|existing| existing.merge(record))
                        .or_insert_with(|| record.clone());
                }
            }
            (Responsive::Responsive { values }, Responsive::Fixed { value: incoming }) => {
                values.entry(Breakpoint::Default).or_default();
                for record in values.values_mut() {
                    record.merge(incoming);
                }
            }
            // Promoted above
            (Responsive::Fixed { .. }, Responsive::Responsive { .. }) => {}
        }
    }
}

/// Declares a style category: a record of optional CSS properties, each
/// field paired with the CSS property name it renders to.
macro_rules! style_category {
    (
        $(#[$meta:meta])*
        $name:ident { $( $field:ident => $css:literal ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<String>,
            )*
        }

        impl StyleCategory for $name {
            fn declarations(&self) -> Vec<(&'static str, Option<&str>)> {
                vec![ $( ($css, self.$field.as_deref()) ),* ]
            }

            fn merge(&mut self, patch: &Self) {
                $(
                    if let Some(value) = &patch.$field {
                        self.$field = Some(value.clone());
                    }
                )*
            }
        }
    };
}

/// Common view over every style category record
pub trait StyleCategory {
    /// `(css-property, value)` for every property of the category, set or not
    fn declarations(&self) -> Vec<(&'static str, Option<&str>)>;

    /// Property-wise merge: set properties of `patch` override, unset ones
    /// keep our value.
    fn merge(&mut self, patch: &Self)
    where
        Self: Sized;

    fn is_empty(&self) -> bool {
        self.declarations().iter().all(|(_, value)| value.is_none())
    }
}

style_category!(
    TypographyStyle {
        font_family => "font-family",
        font_size => "font-size",
        font_weight => "font-weight",
        font_style => "font-style",
        line_height => "line-height",
        letter_spacing => "letter-spacing",
        text_align => "text-align",
        text_transform => "text-transform",
        text_decoration => "text-decoration",
        color => "color",
    }
);

style_category!(
    SpacingStyle {
        margin_top => "margin-top",
        margin_right => "margin-right",
        margin_bottom => "margin-bottom",
        margin_left => "margin-left",
        padding_top => "padding-top",
        padding_right => "padding-right",
        padding_bottom => "padding-bottom",
        padding_left => "padding-left",
    }
);

style_category!(
    BorderStyle {
        border_width => "border-width",
        border_style => "border-style",
        border_color => "border-color",
        border_radius => "border-radius",
    }
);

style_category!(
    BackgroundStyle {
        background_color => "background-color",
        background_image => "background-image",
        background_size => "background-size",
        background_position => "background-position",
        background_repeat => "background-repeat",
    }
);

style_category!(
    DimensionsStyle {
        width => "width",
        height => "height",
        min_width => "min-width",
        max_width => "max-width",
        min_height => "min-height",
        max_height => "max-height",
    }
);

style_category!(
    /// Layout of a container's children
    ContainerStyle {
        display => "display",
        flex_direction => "flex-direction",
        flex_wrap => "flex-wrap",
        justify_content => "justify-content",
        align_items => "align-items",
        gap => "gap",
        grid_template_columns => "grid-template-columns",
    }
);

style_category!(
    ButtonStyle {
        cursor => "cursor",
        hover_color => "--hover-color",
        hover_background_color => "--hover-background-color",
        transition => "transition",
    }
);

style_category!(
    ImageStyle {
        object_fit => "object-fit",
        object_position => "object-position",
        aspect_ratio => "aspect-ratio",
        opacity => "opacity",
    }
);

style_category!(
    VideoStyle {
        aspect_ratio => "aspect-ratio",
        object_fit => "object-fit",
    }
);

/// All style categories of one block. Absent categories contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Responsive<TypographyStyle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Responsive<SpacingStyle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Responsive<BorderStyle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Responsive<BackgroundStyle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Responsive<DimensionsStyle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Responsive<ContainerStyle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<Responsive<ButtonStyle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Responsive<ImageStyle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Responsive<VideoStyle>>,
}

impl BlockStyles {
    /// Deep merge by category: a category missing on our side is copied
    /// from `patch`, one present on both sides merges property by property
    /// (see [`Responsive::merge`]).
    pub fn merge(&mut self, patch: &BlockStyles) {
        fn deep<T: StyleCategory + Clone + Default>(target: &mut Option<Responsive<T>>, source: &Option<Responsive<T>>) {
            let Some(incoming) = source else { return };
            match target {
                Some(existing) => existing.merge(incoming),
                None => *target = Some(incoming.clone()),
            }
        }

        deep(&mut self.typography, &patch.typography);
        deep(&mut self.spacing, &patch.spacing);
        deep(&mut self.border, &patch.border);
        deep(&mut self.background, &patch.background);
        deep(&mut self.dimensions, &patch.dimensions);
        deep(&mut self.container, &patch.container);
        deep(&mut self.button, &patch.button);
        deep(&mut self.image, &patch.image);
        deep(&mut self.video, &patch.video);
    }

    pub fn is_empty(&self) -> bool {
        *self == BlockStyles::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_order() {
        let order: Vec<_> = Breakpoint::Xs.cascade().collect();
        assert_eq!(order, vec![Breakpoint::Xs, Breakpoint::Sm, Breakpoint::Md, Breakpoint::Default]);
        assert_eq!(Breakpoint::Default.cascade().count(), 1);
    }

    #[test]
    fn test_breakpoint_parse() {
        assert_eq!("md".parse::<Breakpoint>().unwrap(), Breakpoint::Md);
        assert_eq!("XS".parse::<Breakpoint>().unwrap(), Breakpoint::Xs);
        assert!("huge".parse::<Breakpoint>().is_err());
    }

    #[test]
    fn test_responsive_json_shape() {
        let json = r#"{
            "kind": "responsive",
            "values": { "default": { "fontSize": "16px" }, "md": { "fontSize": "14px" } }
        }"#;
        let value: Responsive<TypographyStyle> = serde_json::from_str(json).unwrap();
        assert_eq!(value.at(Breakpoint::Md).unwrap().font_size.as_deref(), Some("14px"));
        assert!(value.at(Breakpoint::Xs).is_none());

        let fixed: Responsive<TypographyStyle> =
            serde_json::from_str(r#"{ "kind": "fixed", "value": { "color": "red" } }"#).unwrap();
        assert_eq!(fixed.at(Breakpoint::Xs).unwrap().color.as_deref(), Some("red"));
    }

    fn typography(color: Option<&str>, font_size: Option<&str>) -> TypographyStyle {
        TypographyStyle {
            color: color.map(Into::into),
            font_size: font_size.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_keeps_unpatched_properties() {
        let mut styles = BlockStyles {
            typography: Some(Responsive::fixed(typography(Some("red"), None))),
            spacing: Some(Responsive::fixed(SpacingStyle {
                margin_top: Some("4px".into()),
                ..Default::default()
            })),
            ..Default::default()
        };

        styles.merge(&BlockStyles {
            typography: Some(Responsive::fixed(typography(None, Some("20px")))),
            ..Default::default()
        });

        assert_eq!(styles.typography, Some(Responsive::fixed(typography(Some("red"), Some("20px")))));
        assert!(styles.spacing.is_some());
    }

    #[test]
    fn test_merge_responsive_per_breakpoint() {
        let mut value = Responsive::responsive([
            (Breakpoint::Default, typography(Some("red"), Some("16px"))),
            (Breakpoint::Sm, typography(None, Some("14px"))),
        ]);

        value.merge(&Responsive::responsive([
            (Breakpoint::Sm, typography(Some("blue"), None)),
            (Breakpoint::Xs, typography(None, Some("12px"))),
        ]));

        assert_eq!(value.at(Breakpoint::Default), Some(&typography(Some("red"), Some("16px"))));
        assert_eq!(value.at(Breakpoint::Sm), Some(&typography(Some("blue"), Some("14px"))));
        assert_eq!(value.at(Breakpoint::Xs), Some(&typography(None, Some("12px"))));
    }

    #[test]
    fn test_merge_switching_between_fixed_and_responsive() {
        let mut fixed = Responsive::fixed(typography(Some("red"), None));
        fixed.merge(&Responsive::responsive([(Breakpoint::Xs, typography(None, Some("12px")))]));
        assert_eq!(
            fixed,
            Responsive::responsive([
                (Breakpoint::Default, typography(Some("red"), None)),
                (Breakpoint::Xs, typography(None, Some("12px"))),
            ])
        );

        let mut responsive = Responsive::responsive([(Breakpoint::Md, typography(Some("red"), Some("14px")))]);
        responsive.merge(&Responsive::fixed(typography(Some("green"), None)));
        assert_eq!(responsive.at(Breakpoint::Md), Some(&typography(Some("green"), Some("14px"))));
        assert_eq!(responsive.at(Breakpoint::Default), Some(&typography(Some("green"), None)));
    }

    #[test]
    fn test_declarations_list_css_names() {
        let style = DimensionsStyle {
            max_width: Some("960px".into()),
            ..Default::default()
        };
        let set: Vec<_> = style
            .declarations()
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect();
        assert_eq!(set, vec![("max-width", "960px")]);
        assert!(!style.is_empty());
        assert!(DimensionsStyle::default().is_empty());
    }
}
