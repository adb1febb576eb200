use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

/// Raster types accepted at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Jpeg,
    Png,
    WebP,
}

impl ImageType {
    pub const ALL: [ImageType; 3] = [ImageType::Jpeg, ImageType::Png, ImageType::WebP];

    /// Resolve a client-declared media type.
    ///
    /// Accepts both full MIME types (`image/jpeg; charset=binary`) and bare
    /// subtypes (`jpeg`). `jpg` is an alias of `jpeg`.
    pub fn from_declared(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let subtype = essence.strip_prefix("image/").unwrap_or(&essence);

        match subtype {
            "jpeg" | "jpg" => Some(ImageType::Jpeg),
            "png" => Some(ImageType::Png),
            "webp" => Some(ImageType::WebP),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::WebP => "image/webp",
        }
    }

    /// Extensions a client may legitimately use for this type, canonical first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageType::Jpeg => &["jpg", "jpeg"],
            ImageType::Png => &["png"],
            ImageType::WebP => &["webp"],
        }
    }

    pub fn canonical_extension(self) -> &'static str {
        self.extensions()[0]
    }

    /// Extension for the stored original.
    ///
    /// Keeps the client's extension when it is a known spelling for this type,
    /// otherwise falls back to the canonical one. The client filename never
    /// contributes anything else to the on-disk name.
    pub fn extension_for(self, original_filename: &str) -> &'static str {
        let client_ext = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match client_ext {
            Some(ext) => self
                .extensions()
                .iter()
                .find(|known| **known == ext)
                .copied()
                .unwrap_or_else(|| self.canonical_extension()),
            None => self.canonical_extension(),
        }
    }
}

impl Display for ImageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ImageType::Jpeg => write!(f, "jpeg"),
            ImageType::Png => write!(f, "png"),
            ImageType::WebP => write!(f, "webp"),
        }
    }
}

/// Container every derivative is encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    WebP,
    Jpeg,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, anyhow::Error> {
        match s.trim().to_lowercase().as_str() {
            "webp" => Ok(OutputFormat::WebP),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(anyhow::anyhow!("Invalid output format: {}", s)),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpg",
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::WebP => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Label of one derivative inside a [`DerivativeSet`](super::DerivativeSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantLabel {
    Original,
    Thumbnail,
    Small,
    Medium,
    Large,
}

impl VariantLabel {
    pub const ALL: [VariantLabel; 5] = [
        VariantLabel::Original,
        VariantLabel::Thumbnail,
        VariantLabel::Small,
        VariantLabel::Medium,
        VariantLabel::Large,
    ];

    /// The resized presets, smallest first. `Original` is a full-size re-encode.
    pub const PRESETS: [VariantLabel; 4] = [
        VariantLabel::Thumbnail,
        VariantLabel::Small,
        VariantLabel::Medium,
        VariantLabel::Large,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantLabel::Original => "original",
            VariantLabel::Thumbnail => "thumbnail",
            VariantLabel::Small => "small",
            VariantLabel::Medium => "medium",
            VariantLabel::Large => "large",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        VariantLabel::ALL.into_iter().find(|label| label.as_str() == s)
    }

    /// Cover-fit box for resized presets; `None` for the full-size original.
    pub fn target_box(self) -> Option<(u32, u32)> {
        match self {
            VariantLabel::Original => None,
            VariantLabel::Thumbnail => Some((150, 150)),
            VariantLabel::Small => Some((300, 300)),
            VariantLabel::Medium => Some((600, 600)),
            VariantLabel::Large => Some((1200, 1200)),
        }
    }
}

impl Display for VariantLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
