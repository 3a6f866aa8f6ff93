//! Dynamic-type dispatch
//!
//! When a property's concrete type is only known to the host, the descriptor's
//! runtime type name picks the proxy constructor from [`DISPATCH_TABLE`].

use std::collections::HashSet;

use tracing::trace;

use crate::{
    codec::ToExtend,
    error::{BridgeError, Result},
    objects::{
        Application, AvLayer, CameraLayer, CompItem, File, FileSource, Folder, FolderItem,
        FootageItem, ImportOptions, ItemCollection, LayerCollection, LightLayer,
        MaskPropertyGroup, PlaceholderSource, Project, Property, PropertyGroup, RenderQueue,
        ShapeLayer, SolidSource, TextLayer, Viewer,
    },
    proxy::{Handle, Remote, RemoteObject},
};

/// Constructor stored in the dispatch table
pub type Constructor = fn(Handle) -> AnyObject;

fn construct<T: RemoteObject + Into<AnyObject>>(handle: Handle) -> AnyObject {
    T::from_handle(handle).into()
}

macro_rules! dispatch_table {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Any proxy the dispatch table can build
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyObject {
            $($variant($ty)),*
        }

        impl Remote for AnyObject {
            fn handle(&self) -> &Handle {
                match self {
                    $(AnyObject::$variant(object) => object.handle()),*
                }
            }
        }

        $(
            impl From<$ty> for AnyObject {
                fn from(object: $ty) -> Self {
                    AnyObject::$variant(object)
                }
            }

            impl TryFrom<AnyObject> for $ty {
                type Error = BridgeError;

                fn try_from(any: AnyObject) -> Result<Self> {
                    match any {
                        AnyObject::$variant(object) => Ok(object),
                        other => Err(BridgeError::unexpected_type(
                            <$ty as RemoteObject>::TYPE_NAME,
                            other.object_type(),
                        )),
                    }
                }
            }
        )*

        /// Host type name to proxy constructor
        pub static DISPATCH_TABLE: &[(&str, Constructor)] = &[
            $((<$ty as RemoteObject>::TYPE_NAME, construct::<$ty> as Constructor)),*
        ];
    };
}

dispatch_table! {
    Application(Application),
    Project(Project),
    CompItem(CompItem),
    FolderItem(FolderItem),
    FootageItem(FootageItem),
    ItemCollection(ItemCollection),
    AvLayer(AvLayer),
    ShapeLayer(ShapeLayer),
    TextLayer(TextLayer),
    CameraLayer(CameraLayer),
    LightLayer(LightLayer),
    LayerCollection(LayerCollection),
    Property(Property),
    PropertyGroup(PropertyGroup),
    MaskPropertyGroup(MaskPropertyGroup),
    FileSource(FileSource),
    SolidSource(SolidSource),
    PlaceholderSource(PlaceholderSource),
    Viewer(Viewer),
    File(File),
    Folder(Folder),
    ImportOptions(ImportOptions),
    RenderQueue(RenderQueue),
}

impl ToExtend for AnyObject {
    fn to_extend(&self) -> String {
        self.handle().to_extend()
    }
}

/// Every runtime type name the host reports for objects this crate proxies
pub const HOST_TYPE_NAMES: &[&str] = &[
    "Application",
    "Project",
    "CompItem",
    "FolderItem",
    "FootageItem",
    "ItemCollection",
    "AVLayer",
    "ShapeLayer",
    "TextLayer",
    "CameraLayer",
    "LightLayer",
    "LayerCollection",
    "Property",
    "PropertyGroup",
    "MaskPropertyGroup",
    "FileSource",
    "SolidSource",
    "PlaceholderSource",
    "Viewer",
    "File",
    "Folder",
    "ImportOptions",
    "RenderQueue",
];

/// Build the proxy matching the handle's runtime type
pub fn resolve(handle: Handle) -> Result<AnyObject> {
    let constructor = DISPATCH_TABLE
        .iter()
        .find(|(name, _)| *name == handle.object_type())
        .map(|(_, constructor)| *constructor)
        .ok_or_else(|| BridgeError::UnknownRemoteType(handle.object_type().to_string()))?;
    trace!(object = ?handle, "dispatch");
    Ok(constructor(handle))
}

/// Check the table maps every host type name exactly once
pub fn validate_dispatch_table() -> Result<()> {
    let mut seen = HashSet::new();
    for (name, _) in DISPATCH_TABLE {
        if !seen.insert(*name) {
            return Err(BridgeError::validation(format!(
                "dispatch table maps '{name}' twice"
            )));
        }
    }
    match HOST_TYPE_NAMES.iter().find(|name| !seen.contains(*name)) {
        Some(missing) => Err(BridgeError::UnknownRemoteType(missing.to_string())),
        None => Ok(()),
    }
}
