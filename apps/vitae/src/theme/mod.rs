// Style resolution: color scheme + theme name -> StyleBundle (colors, type scale,
// spacing scale, page geometry).

pub mod colors;
pub mod page;
pub mod resolver;
pub mod schemes;
pub mod spacing;
pub mod typography;

pub use resolver::{resolve, StyleBundle, ThemeError, ThemeName};
pub use schemes::SchemeCatalogue;
