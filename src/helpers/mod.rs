//! Helper functions shared by the renderer and the page layer

mod date;
mod html;
mod url;

pub use self::date::*;
pub use self::html::*;
pub use self::url::*;
