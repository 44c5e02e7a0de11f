//! Output formats for finished line sets. Each format lives behind a cargo
//! feature of the same name.

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "svg")]
mod svg;

#[cfg(feature = "json")]
pub use self::json::to_json;
#[cfg(feature = "svg")]
pub use self::svg::to_svg;
