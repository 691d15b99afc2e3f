//! Default policy tables.
//!
//! The element and attribute allowlists follow the MDN SVG element and
//! attribute references. Names in the XLink and XML namespaces are kept in
//! their own tables so the catalog can key them by namespace.

use crate::objects::Severity;

/// Elements allowed by default, in the SVG namespace or no namespace.
pub(crate) const ELEMENTS: &[&str] = &[
    "svg",
    "altGlyph",
    "altGlyphDef",
    "altGlyphItem",
    "animateColor",
    "animateMotion",
    "animateTransform",
    "circle",
    "clipPath",
    "defs",
    "desc",
    "discard",
    "ellipse",
    "filter",
    "font",
    "g",
    "glyph",
    "glyphRef",
    "hkern",
    "image",
    "line",
    "linearGradient",
    "marker",
    "mask",
    "metadata",
    "mpath",
    "path",
    "pattern",
    "polygon",
    "polyline",
    "radialGradient",
    "rect",
    "stop",
    "switch",
    "symbol",
    "text",
    "textPath",
    "title",
    "tref",
    "tspan",
    "use",
    "view",
    "vkern",
    "feBlend",
    "feColorMatrix",
    "feComponentTransfer",
    "feComposite",
    "feConvolveMatrix",
    "feDiffuseLighting",
    "feDisplacementMap",
    "feDistantLight",
    "feFlood",
    "feFuncA",
    "feFuncB",
    "feFuncG",
    "feFuncR",
    "feGaussianBlur",
    "feMerge",
    "feMergeNode",
    "feMorphology",
    "feOffset",
    "fePointLight",
    "feSpecularLighting",
    "feSpotLight",
    "feTile",
    "feTurbulence",
];

/// Attributes in no namespace allowed on every allowed element.
pub(crate) const ATTRIBUTES: &[&str] = &[
    "accent-height",
    "accumulate",
    "additive",
    "alignment-baseline",
    "ascent",
    "attributeName",
    "attributeType",
    "azimuth",
    "baseProfile",
    "baseFrequency",
    "baseline-shift",
    "begin",
    "bias",
    "by",
    "calcMode",
    "class",
    "clip",
    "clipPathUnits",
    "clip-path",
    "clip-rule",
    "color",
    "color-interpolation",
    "color-interpolation-filters",
    "color-profile",
    "color-rendering",
    "cx",
    "cy",
    "d",
    "dx",
    "dy",
    "diffuseConstant",
    "direction",
    "display",
    "divisor",
    "dur",
    "edgeMode",
    "elevation",
    "end",
    "exponent",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "flood-color",
    "flood-opacity",
    "font-family",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "from",
    "fr",
    "fx",
    "fy",
    "g1",
    "g2",
    "glyph-name",
    "glyphRef",
    "gradientTransform",
    "gradientUnits",
    "height",
    "href",
    "id",
    "image-rendering",
    "in",
    "in2",
    "intercept",
    "k",
    "k1",
    "k2",
    "k3",
    "k4",
    "kernelMatrix",
    "kernelUnitLength",
    "kerning",
    "keyPoints",
    "keySplines",
    "keyTimes",
    "lang",
    "lengthAdjust",
    "letter-spacing",
    "lighting-color",
    "limitingConeAngle",
    "local",
    "marker-end",
    "marker-mid",
    "marker-start",
    "markerHeight",
    "markerUnits",
    "markerWidth",
    "mask",
    "maskContentUnits",
    "maskUnits",
    "max",
    "media",
    "method",
    "min",
    "mode",
    "name",
    "numOctaves",
    "offset",
    "operator",
    "opacity",
    "order",
    "orient",
    "orientation",
    "origin",
    "overflow",
    "paint-order",
    "path",
    "pathLength",
    "patternContentUnits",
    "patternTransform",
    "patternUnits",
    "pointer-events",
    "points",
    "pointsAtX",
    "pointsAtY",
    "pointsAtZ",
    "preserveAlpha",
    "preserveAspectRatio",
    "primitiveUnits",
    "r",
    "radius",
    "refX",
    "refY",
    "repeatCount",
    "repeatDur",
    "restart",
    "result",
    "rotate",
    "rx",
    "ry",
    "scale",
    "seed",
    "shape-rendering",
    "specularConstant",
    "specularExponent",
    "spreadMethod",
    "startOffset",
    "stdDeviation",
    "stitchTiles",
    "strikethrough-position",
    "strikethrough-thickness",
    "stop-color",
    "stop-opacity",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke",
    "stroke-width",
    "surfaceScale",
    "systemLanguage",
    "tabindex",
    "tableValues",
    "targetX",
    "targetY",
    "text-anchor",
    "text-decoration",
    "text-rendering",
    "textLength",
    "to",
    "transform",
    "transform-origin",
    "type",
    "u1",
    "u2",
    "underline-position",
    "underline-thickness",
    "unicode",
    "unicode-bidi",
    "version",
    "values",
    "vector-effect",
    "viewBox",
    "viewTarget",
    "visibility",
    "vert-adv-y",
    "vert-origin-x",
    "vert-origin-y",
    "width",
    "word-spacing",
    "wrap",
    "writing-mode",
    "xChannelSelector",
    "x",
    "x1",
    "x2",
    "y",
    "y1",
    "y2",
    "yChannelSelector",
    "z",
    "zoomAndPan",
];

/// Attributes in the XLink namespace allowed on every allowed element.
pub(crate) const XLINK_ATTRIBUTES: &[&str] = &["href"];

/// Attributes in the XML namespace allowed on every allowed element.
pub(crate) const XML_ATTRIBUTES: &[&str] = &["lang", "space"];

/// Attributes allowed only on specific elements.
pub(crate) const ELEMENT_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("font", &["horiz-adv-x", "horiz-origin-x", "horiz-origin-y"]),
    ("glyph", &["horiz-adv-x", "arabic-form"]),
];

/// Elements denied in any namespace, compared case-insensitively.
pub(crate) const DENIED_ELEMENTS: &[(&str, Severity)] = &[
    ("script", Severity::Critical),
    ("foreignobject", Severity::Critical),
    ("iframe", Severity::Critical),
    ("embed", Severity::Critical),
    ("object", Severity::Critical),
    ("applet", Severity::Critical),
    ("handler", Severity::Critical),
    ("listener", Severity::Critical),
    ("set", Severity::Critical),
    ("animate", Severity::Critical),
];

/// Elements whose `attributeName` is checked against [`GUARDED_ANIMATION_TARGETS`].
pub(crate) const ANIMATION_ELEMENTS: &[&str] = &[
    "animate",
    "animatecolor",
    "animatemotion",
    "animatetransform",
    "set",
];

/// Attribute local names animation elements may never target.
pub(crate) const GUARDED_ANIMATION_TARGETS: &[&str] = &["href", "src", "style"];

/// Attributes holding the values an animation sets.
pub(crate) const ANIMATION_VALUE_ATTRIBUTES: &[&str] = &["from", "to", "by", "values"];

/// Attributes that carry a direct URI reference.
pub(crate) const DIRECT_URI_ATTRIBUTES: &[&str] = &["href", "src"];

/// Attributes that may carry `url(...)` functional IRI references.
pub(crate) const FUNC_IRI_ATTRIBUTES: &[&str] = &[
    "fill",
    "stroke",
    "clip-path",
    "mask",
    "filter",
    "marker-start",
    "marker-mid",
    "marker-end",
];

/// Image media types accepted in `data:` references once data images are enabled.
pub(crate) const DATA_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Schemes that can never be allowed.
pub(crate) const FORBIDDEN_SCHEMES: &[&str] = &["javascript", "vbscript", "livescript", "data"];
