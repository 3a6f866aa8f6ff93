//! Domain proxies for the After Effects object model
//!
//! Concrete types wrap one handle each. Behaviour shared across the host's
//! class hierarchy lives in capability traits (`ItemLike`, `LayerLike`, ...),
//! and values whose concrete type only the host knows are returned as family
//! enums (`Item`, `Layer`, ...) built through the dispatch table.

use crate::error::{BridgeError, Result};

/// Declare a closed family of proxies reachable from [`crate::dispatch::AnyObject`]
macro_rules! family {
    (
        $(#[$meta:meta])*
        $family:ident, $expected:literal {
            $($variant:ident($ty:ty) <= $any:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $family {
            $($variant($ty)),*
        }

        impl $crate::proxy::Remote for $family {
            fn handle(&self) -> &$crate::proxy::Handle {
                match self {
                    $($family::$variant(object) => $crate::proxy::Remote::handle(object)),*
                }
            }
        }

        impl $crate::codec::ToExtend for $family {
            fn to_extend(&self) -> String {
                $crate::codec::ToExtend::to_extend($crate::proxy::Remote::handle(self))
            }
        }

        impl TryFrom<$crate::dispatch::AnyObject> for $family {
            type Error = $crate::error::BridgeError;

            fn try_from(any: $crate::dispatch::AnyObject) -> $crate::error::Result<Self> {
                match any {
                    $($crate::dispatch::AnyObject::$any(object) => Ok($family::$variant(object)),)*
                    other => Err($crate::error::BridgeError::unexpected_type(
                        $expected,
                        $crate::proxy::Remote::object_type(&other),
                    )),
                }
            }
        }

        $(
            impl From<$ty> for $family {
                fn from(object: $ty) -> Self {
                    $family::$variant(object)
                }
            }
        )*
    };
}

mod application;
mod item;
mod layer;
mod misc;
mod project;
mod property;
mod source;

pub use application::{Application, COMMAND_DUPLICATE, COMMAND_SAVE_INCREMENTAL};
pub use item::{
    AvItem, AvItemLike, CompItem, FolderItem, FootageItem, Guide, Item, ItemCollection, ItemLike,
    TimeSpan,
};
pub use layer::{
    AvLayer, AvLayerLike, CameraLayer, Layer, LayerCollection, LayerLike, LightLayer, ShapeLayer,
    TextLayer,
};
pub use misc::{File, Folder, ImportOptions, RenderQueue, Viewer};
pub use project::{CloseOptions, Project};
pub use property::{
    MaskPropertyGroup, Property, PropertyGroup, PropertyGroupLike, PropertyKey, PropertyLike,
    PropertyNode,
};
pub use source::{FileSource, FootageSource, FootageSourceLike, PlaceholderSource, SolidSource};

/// Turn a missing object into an error where the host always provides one
fn require<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| BridgeError::unexpected_value(what, "null"))
}

/// A colour triple as the host stores it
fn rgb(channels: Vec<f64>) -> Result<[f64; 3]> {
    match channels.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        // Some colour properties carry an alpha channel
        [r, g, b, _] => Ok([*r, *g, *b]),
        _ => Err(BridgeError::unexpected_value(
            "an RGB colour",
            format!("{} channels", channels.len()),
        )),
    }
}

/// Fail unless `value` lies in `range`, before anything is sent
fn check_range<T>(property: &str, value: T, range: std::ops::RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(BridgeError::validation(format!(
            "'{property}' must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert!(check_range("shutterAngle", 720, 0..=720).is_ok());
        assert!(matches!(
            check_range("shutterAngle", 721, 0..=720),
            Err(BridgeError::DomainValidation(_))
        ));
    }
}
