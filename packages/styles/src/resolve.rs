//! # Responsive Resolution
//!
//! Collapses per-breakpoint style values to the single value in effect at one
//! breakpoint.
//!
//! Lookup walks from the requested breakpoint toward `default`
//! (`xs → sm → md → default`) and takes the first value found, the same
//! outcome a max-width media query cascade would give. The cascade runs per
//! property, so a narrow breakpoint that overrides only `font-size` still
//! inherits `color` from a wider one. Properties set nowhere are omitted.

use blockpage_document::{BlockStyles, Breakpoint, Responsive, StyleCategory};
use serde::Serialize;
use std::collections::BTreeMap;

/// Flat CSS property → value map for one block at one breakpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedStyle {
    properties: BTreeMap<String, String>,
}

impl ResolvedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(property.into(), value.into());
    }

    /// Later values win on the same property
    pub fn extend(&mut self, other: ResolvedStyle) {
        self.properties.extend(other.properties);
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Properties of `self` whose value differs from (or is absent in) `base`
    pub fn difference(&self, base: &ResolvedStyle) -> ResolvedStyle {
        let properties = self
            .properties
            .iter()
            .filter(|(k, v)| base.properties.get(*k) != Some(*v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        ResolvedStyle { properties }
    }

    /// `a: b; c: d` form for a `style` attribute
    pub fn to_inline_css(&self) -> String {
        self.properties
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// The whole value effective at `breakpoint`, without merging across
/// breakpoints. Use [`resolve_category`] for per-property cascading.
pub fn resolve_value<T>(value: &Responsive<T>, breakpoint: Breakpoint) -> Option<&T> {
    breakpoint.cascade().find_map(|bp| value.at(bp))
}

/// Resolve every property of one category at `breakpoint`
pub fn resolve_category<C: StyleCategory>(value: &Responsive<C>, breakpoint: Breakpoint) -> ResolvedStyle {
    let mut resolved = ResolvedStyle::new();

    let layers: Vec<Vec<(&'static str, Option<&str>)>> = breakpoint
        .cascade()
        .filter_map(|bp| value.at(bp))
        .map(|category| category.declarations())
        .collect();

    // The first layer is the most specific, so fill from the widest upward.
    for layer in layers.iter().rev() {
        for (property, property_value) in layer {
            if let Some(v) = property_value {
                resolved.insert(*property, *v);
            }
        }
    }

    resolved
}

/// Resolve all categories of a block into one flat style.
///
/// Categories merge in declaration order; on a shared CSS property the later
/// category wins (`video` over `image` on `aspect-ratio` and `object-fit`).
pub fn resolve_styles(styles: &BlockStyles, breakpoint: Breakpoint) -> ResolvedStyle {
    fn layer<C: StyleCategory>(out: &mut ResolvedStyle, value: &Option<Responsive<C>>, bp: Breakpoint) {
        if let Some(value) = value {
            out.extend(resolve_category(value, bp));
        }
    }

    let mut resolved = ResolvedStyle::new();
    layer(&mut resolved, &styles.typography, breakpoint);
    layer(&mut resolved, &styles.spacing, breakpoint);
    layer(&mut resolved, &styles.border, breakpoint);
    layer(&mut resolved, &styles.background, breakpoint);
    layer(&mut resolved, &styles.dimensions, breakpoint);
    layer(&mut resolved, &styles.container, breakpoint);
    layer(&mut resolved, &styles.button, breakpoint);
    layer(&mut resolved, &styles.image, breakpoint);
    layer(&mut resolved, &styles.video, breakpoint);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpage_document::{BackgroundStyle, ImageStyle, SpacingStyle, TypographyStyle, VideoStyle};

    fn typography(size: Option<&str>, color: Option<&str>) -> TypographyStyle {
        TypographyStyle {
            font_size: size.map(String::from),
            color: color.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_cascade_falls_back_to_nearest_wider_breakpoint() {
        let value = Responsive::responsive([
            (Breakpoint::Default, typography(Some("18px"), None)),
            (Breakpoint::Md, typography(Some("16px"), None)),
        ]);

        assert_eq!(resolve_category(&value, Breakpoint::Xs).get("font-size"), Some("16px"));
        assert_eq!(resolve_category(&value, Breakpoint::Sm).get("font-size"), Some("16px"));
        assert_eq!(resolve_category(&value, Breakpoint::Md).get("font-size"), Some("16px"));
        assert_eq!(resolve_category(&value, Breakpoint::Default).get("font-size"), Some("18px"));
    }

    #[test]
    fn test_cascade_is_per_property() {
        let value = Responsive::responsive([
            (Breakpoint::Default, typography(Some("18px"), Some("black"))),
            (Breakpoint::Xs, typography(Some("14px"), None)),
        ]);

        let xs = resolve_category(&value, Breakpoint::Xs);
        assert_eq!(xs.get("font-size"), Some("14px"));
        assert_eq!(xs.get("color"), Some("black"));
    }

    #[test]
    fn test_unset_properties_are_omitted() {
        let value = Responsive::responsive([(Breakpoint::Md, typography(Some("16px"), None))]);

        let default = resolve_category(&value, Breakpoint::Default);
        assert!(default.is_empty());
        assert_eq!(default.get("font-size"), None);

        let md = resolve_category(&value, Breakpoint::Md);
        assert_eq!(md.len(), 1);
        assert_eq!(md.get("color"), None);
    }

    #[test]
    fn test_fixed_applies_everywhere() {
        let value = Responsive::fixed(typography(None, Some("red")));
        for bp in Breakpoint::ALL {
            assert_eq!(resolve_category(&value, bp).get("color"), Some("red"));
        }
        assert_eq!(resolve_value(&value, Breakpoint::Sm).unwrap().color.as_deref(), Some("red"));
    }

    #[test]
    fn test_later_category_wins_shared_property() {
        let styles = BlockStyles {
            image: Some(Responsive::fixed(ImageStyle {
                aspect_ratio: Some("4 / 3".into()),
                opacity: Some("0.5".into()),
                ..Default::default()
            })),
            video: Some(Responsive::fixed(VideoStyle {
                aspect_ratio: Some("16 / 9".into()),
                ..Default::default()
            })),
            ..Default::default()
        };

        let resolved = resolve_styles(&styles, Breakpoint::Default);
        assert_eq!(resolved.get("aspect-ratio"), Some("16 / 9"));
        assert_eq!(resolved.get("opacity"), Some("0.5"));
    }

    #[test]
    fn test_resolve_styles_merges_categories() {
        let styles = BlockStyles {
            typography: Some(Responsive::fixed(typography(Some("12px"), None))),
            spacing: Some(Responsive::responsive([(
                Breakpoint::Sm,
                SpacingStyle {
                    padding_top: Some("8px".into()),
                    ..Default::default()
                },
            )])),
            background: Some(Responsive::fixed(BackgroundStyle {
                background_color: Some("#fff".into()),
                ..Default::default()
            })),
            ..Default::default()
        };

        let xs = resolve_styles(&styles, Breakpoint::Xs);
        assert_eq!(xs.get("font-size"), Some("12px"));
        assert_eq!(xs.get("padding-top"), Some("8px"));
        assert_eq!(xs.get("background-color"), Some("#fff"));

        let desktop = resolve_styles(&styles, Breakpoint::Default);
        assert_eq!(desktop.get("padding-top"), None);
        assert_eq!(desktop.to_inline_css(), "background-color: #fff; font-size: 12px");
    }

    #[test]
    fn test_difference() {
        let mut base = ResolvedStyle::new();
        base.insert("color", "red");
        base.insert("width", "10px");

        let mut narrow = base.clone();
        narrow.insert("width", "5px");

        let diff = narrow.difference(&base);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.get("width"), Some("5px"));
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut style = ResolvedStyle::new();
        style.insert("font-size", "12px");

        let json = serde_json::to_string(&style).unwrap();
        assert_eq!(json, r#"{"font-size":"12px"}"#);
    }
}
