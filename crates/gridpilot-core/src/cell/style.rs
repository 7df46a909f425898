//! Presentational cell attributes
//!
//! Styles never affect values. Every field is optional so a [`CellStyle`]
//! doubles as a partial update: see [`CellStyle::merge`].

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Font slant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FontStyle {
    Normal,
    Italic,
}

/// Text decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TextDecoration {
    None,
    Underline,
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Cell style; `None` fields are unset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CellStyle {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub font_weight: Option<FontWeight>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub font_style: Option<FontStyle>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub text_decoration: Option<TextDecoration>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub text_align: Option<TextAlign>,
    /// CSS-style color string
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub background_color: Option<String>,
    /// CSS-style color string
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub color: Option<String>,
    /// CSS-style border shorthand
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub border: Option<String>,
}

impl CellStyle {
    /// Create an empty style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font weight
    pub fn font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = Some(weight);
        self
    }

    /// Set bold (shorthand for [`FontWeight::Bold`])
    pub fn bold(self) -> Self {
        self.font_weight(FontWeight::Bold)
    }

    /// Set font style
    pub fn font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    /// Set italic (shorthand for [`FontStyle::Italic`])
    pub fn italic(self) -> Self {
        self.font_style(FontStyle::Italic)
    }

    /// Set text decoration
    pub fn text_decoration(mut self, decoration: TextDecoration) -> Self {
        self.text_decoration = Some(decoration);
        self
    }

    /// Set horizontal alignment
    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    /// Set background color
    pub fn background_color<S: Into<String>>(mut self, color: S) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Set text color
    pub fn color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set border
    pub fn border<S: Into<String>>(mut self, border: S) -> Self {
        self.border = Some(border.into());
        self
    }

    /// Check whether no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow merge: fields set in `partial` overwrite, unset fields are kept
    pub fn merge(&mut self, partial: &CellStyle) {
        fn overlay<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
            if let Some(v) = source {
                *target = Some(v.clone());
            }
        }

        overlay(&mut self.font_weight, &partial.font_weight);
        overlay(&mut self.font_style, &partial.font_style);
        overlay(&mut self.text_decoration, &partial.text_decoration);
        overlay(&mut self.text_align, &partial.text_align);
        overlay(&mut self.background_color, &partial.background_color);
        overlay(&mut self.color, &partial.color);
        overlay(&mut self.border, &partial.border);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut style = CellStyle::new().bold().color("#333");
        style.merge(&CellStyle::new().italic().color("red"));

        assert_eq!(style.font_weight, Some(FontWeight::Bold));
        assert_eq!(style.font_style, Some(FontStyle::Italic));
        assert_eq!(style.color.as_deref(), Some("red"));
        assert_eq!(style.background_color, None);
    }

    #[test]
    fn test_merge_empty_is_noop() {
        let mut style = CellStyle::new().text_align(TextAlign::Center);
        let before = style.clone();
        style.merge(&CellStyle::new());
        assert_eq!(style, before);
        assert!(CellStyle::new().is_empty());
    }
}
