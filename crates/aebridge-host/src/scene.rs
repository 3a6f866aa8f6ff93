//! In-memory After Effects object graph
//!
//! Objects live in an arena and refer to each other by [`ObjRef`]. Each
//! object carries a host type name, a property map and an ordered child list
//! whose meaning depends on the type: the elements of a collection, or the
//! child properties of a layer or property group.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{HostError, HostResult};

/// Index of an object in the scene arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef(pub usize);

/// A runtime value in the simulated engine
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<HostValue>),
    Object(ObjRef),
}

impl HostValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn as_object(&self) -> Option<ObjRef> {
        match self {
            HostValue::Object(r) => Some(*r),
            _ => None,
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            HostValue::Undefined | HostValue::Null => false,
            HostValue::Bool(b) => *b,
            HostValue::Number(n) => *n != 0.0 && !n.is_nan(),
            HostValue::Str(s) => !s.is_empty(),
            HostValue::Array(_) | HostValue::Object(_) => true,
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.to_string())
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<ObjRef> for HostValue {
    fn from(r: ObjRef) -> Self {
        HostValue::Object(r)
    }
}

fn numbers(values: &[f64]) -> HostValue {
    HostValue::Array(values.iter().copied().map(HostValue::Number).collect())
}

#[derive(Debug, Clone)]
struct HostObject {
    class: &'static str,
    props: BTreeMap<String, HostValue>,
    children: Vec<ObjRef>,
    /// Folder, comp or project a collection belongs to
    owner: Option<ObjRef>,
}

const LAYER_CLASSES: [&str; 5] = [
    "AVLayer",
    "ShapeLayer",
    "TextLayer",
    "CameraLayer",
    "LightLayer",
];
const ITEM_CLASSES: [&str; 3] = ["CompItem", "FolderItem", "FootageItem"];
const PROPERTY_CLASSES: [&str; 3] = ["Property", "PropertyGroup", "MaskPropertyGroup"];

/// Properties computed from the graph; assigning them fails
const READ_ONLY: [&str; 14] = [
    "numItems",
    "numLayers",
    "numProperties",
    "length",
    "index",
    "propertyIndex",
    "id",
    "selection",
    "selectedLayers",
    "usedIn",
    "activeCamera",
    "value",
    "guides",
    "markerProperty",
];

const NORMAL_BLENDING: f64 = 5212.0;
const GPU_SOFTWARE: f64 = 1816.0;
const TOOL_ARROW: f64 = 9000.0;
const GPU_METAL: f64 = 1813.0;
const COMMAND_DUPLICATE: f64 = 2080.0;
const COMMAND_SAVE_INCREMENTAL: f64 = 3088.0;

/// The simulated application state
#[derive(Debug)]
pub struct Scene {
    objects: Vec<HostObject>,
    app: ObjRef,
    next_id: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// An application with an empty untitled project
    pub fn new() -> Self {
        let mut scene = Self {
            objects: Vec::new(),
            app: ObjRef(0),
            next_id: 0,
        };
        let app = scene.alloc("Application");
        scene.app = app;
        scene.put(app, "version", "24.0.0".into());
        scene.put(app, "buildName", "24.0x1".into());
        scene.put(app, "isoLanguage", "en_US".into());
        scene.put(app, "availableGPUAccelTypes", numbers(&[GPU_SOFTWARE, GPU_METAL]));
        let project = scene.new_project(None);
        scene.put(app, "project", project.into());
        scene
    }

    pub fn app(&self) -> ObjRef {
        self.app
    }

    /// The project currently open in the application
    pub fn project(&self) -> HostResult<ObjRef> {
        self.object_prop(self.app, "project")
            .ok_or_else(|| HostError::runtime("no project is open"))
    }

    pub fn class_of(&self, r: ObjRef) -> &'static str {
        self.objects[r.0].class
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn alloc(&mut self, class: &'static str) -> ObjRef {
        self.objects.push(HostObject {
            class,
            props: BTreeMap::new(),
            children: Vec::new(),
            owner: None,
        });
        ObjRef(self.objects.len() - 1)
    }

    fn put(&mut self, r: ObjRef, name: &str, value: HostValue) {
        self.objects[r.0].props.insert(name.to_string(), value);
    }

    fn prop(&self, r: ObjRef, name: &str) -> HostValue {
        self.objects[r.0]
            .props
            .get(name)
            .cloned()
            .unwrap_or(HostValue::Undefined)
    }

    fn object_prop(&self, r: ObjRef, name: &str) -> Option<ObjRef> {
        self.prop(r, name).as_object()
    }

    fn number_prop(&self, r: ObjRef, name: &str) -> f64 {
        self.prop(r, name).as_number().unwrap_or(0.0)
    }

    fn guides(&self, item: ObjRef) -> Vec<HostValue> {
        match self.prop(item, "guides") {
            HostValue::Array(guides) => guides,
            _ => Vec::new(),
        }
    }

    fn guide_at(&self, item: ObjRef, index: f64) -> HostResult<ObjRef> {
        let guides = self.guides(item);
        let guide = if index >= 0.0 && index.fract() == 0.0 {
            guides.get(index as usize).and_then(HostValue::as_object)
        } else {
            None
        };
        guide.ok_or_else(|| HostError::runtime("After Effects error: guide index out of range"))
    }

    fn children(&self, r: ObjRef) -> &[ObjRef] {
        &self.objects[r.0].children
    }

    fn is_a(&self, r: ObjRef, classes: &[&str]) -> bool {
        classes.contains(&self.class_of(r))
    }

    fn fresh_id(&mut self) -> f64 {
        self.next_id += 1;
        f64::from(self.next_id)
    }

    fn collection(&mut self, class: &'static str, owner: ObjRef) -> ObjRef {
        let collection = self.alloc(class);
        self.objects[collection.0].owner = Some(owner);
        collection
    }

    // ---- construction ----

    fn new_project(&mut self, file: Option<ObjRef>) -> ObjRef {
        let project = self.alloc("Project");
        let items = self.collection("ItemCollection", project);
        let root = self.alloc("FolderItem");
        self.init_item(root, "Root", "Folder");
        let root_items = self.collection("ItemCollection", root);
        self.put(root, "items", root_items.into());
        let render_queue = self.alloc("RenderQueue");
        self.put(render_queue, "rendering", false.into());

        let settings: [(&str, HostValue); 20] = [
            ("items", items.into()),
            ("rootFolder", root.into()),
            ("renderQueue", render_queue.into()),
            ("file", file.map_or(HostValue::Null, HostValue::Object)),
            ("activeItem", HostValue::Null),
            ("dirty", false.into()),
            ("revision", 1.0.into()),
            ("bitsPerChannel", 8.0.into()),
            ("displayStartFrame", 0.0.into()),
            ("expressionEngine", "javascript-1.0".into()),
            ("feetFramesFilmType", 2413.0.into()),
            ("footageTimecodeDisplayStartType", 2213.0.into()),
            ("framesCountType", 2601.0.into()),
            ("framesUseFeetFrames", false.into()),
            ("gpuAccelType", GPU_SOFTWARE.into()),
            ("linearBlending", false.into()),
            ("linearizeWorkingSpace", false.into()),
            ("timeDisplayType", 2012.0.into()),
            ("workingGamma", 2.4.into()),
            ("workingSpace", "None".into()),
        ];
        for (name, value) in settings {
            self.put(project, name, value);
        }
        self.put(project, "transparencyGridThumbnails", false.into());
        self.put(project, "xmpPacket", "".into());
        self.put(project, "toolType", TOOL_ARROW.into());
        self.put(project, "compensateForSceneReferredProfiles", true.into());
        project
    }

    fn init_item(&mut self, item: ObjRef, name: &str, type_name: &str) {
        let id = self.fresh_id();
        self.put(item, "id", id.into());
        self.put(item, "name", name.into());
        self.put(item, "comment", "".into());
        self.put(item, "label", 0.0.into());
        self.put(item, "selected", false.into());
        self.put(item, "typeName", type_name.into());
        self.put(item, "parentFolder", HostValue::Null);
        self.put(item, "guides", HostValue::Array(Vec::new()));
    }

    fn init_av_item(&mut self, item: ObjRef, size: (f64, f64), duration: f64, frame_rate: f64) {
        let frame_duration = if frame_rate > 0.0 { 1.0 / frame_rate } else { 0.0 };
        let settings: [(&str, HostValue); 14] = [
            ("width", size.0.into()),
            ("height", size.1.into()),
            ("pixelAspect", 1.0.into()),
            ("duration", duration.into()),
            ("frameRate", frame_rate.into()),
            ("frameDuration", frame_duration.into()),
            ("time", 0.0.into()),
            ("hasVideo", true.into()),
            ("hasAudio", false.into()),
            ("footageMissing", false.into()),
            ("useProxy", false.into()),
            ("proxySource", HostValue::Null),
            ("isMediaReplacementCompatible", false.into()),
            ("label", 0.0.into()),
        ];
        for (name, value) in settings {
            self.put(item, name, value);
        }
    }

    /// Add `item` to `folder` and to the project-wide collection
    fn file_item(&mut self, item: ObjRef, folder: ObjRef) -> HostResult<()> {
        let project = self.project()?;
        self.put(item, "parentFolder", folder.into());
        if let Some(folder_items) = self.object_prop(folder, "items") {
            self.objects[folder_items.0].children.push(item);
        }
        if let Some(all_items) = self.object_prop(project, "items") {
            self.objects[all_items.0].children.push(item);
        }
        Ok(())
    }

    fn unfile_item(&mut self, item: ObjRef) {
        for object in &mut self.objects {
            if object.class == "ItemCollection" {
                object.children.retain(|child| *child != item);
            }
        }
    }

    fn root_folder(&self) -> HostResult<ObjRef> {
        self.object_prop(self.project()?, "rootFolder")
            .ok_or_else(|| HostError::runtime("project has no root folder"))
    }

    fn add_folder(&mut self, name: &str, parent: ObjRef) -> HostResult<ObjRef> {
        let folder = self.alloc("FolderItem");
        self.init_item(folder, name, "Folder");
        let items = self.collection("ItemCollection", folder);
        self.put(folder, "items", items.into());
        self.file_item(folder, parent)?;
        Ok(folder)
    }

    fn add_comp(&mut self, params: CompSettings, parent: ObjRef) -> HostResult<ObjRef> {
        let comp = self.alloc("CompItem");
        self.init_item(comp, &params.name, "Composition");
        self.init_av_item(
            comp,
            (params.width, params.height),
            params.duration,
            params.frame_rate,
        );
        self.put(comp, "pixelAspect", params.pixel_aspect.into());
        let layers = self.collection("LayerCollection", comp);
        let settings: [(&str, HostValue); 17] = [
            ("layers", layers.into()),
            ("bgColor", numbers(&[0.0, 0.0, 0.0])),
            ("displayStartTime", 0.0.into()),
            ("draft3d", false.into()),
            ("dropFrame", false.into()),
            ("frameBlending", false.into()),
            ("hideShyLayers", false.into()),
            ("motionBlur", false.into()),
            ("motionBlurAdaptiveSampleLimit", 128.0.into()),
            ("motionBlurSamplesPerFrame", 16.0.into()),
            ("preserveNestedFrameRate", false.into()),
            ("preserveNestedResolution", false.into()),
            ("renderer", "ADBE Advanced 3d".into()),
            ("shutterAngle", 180.0.into()),
            ("shutterPhase", (-90.0).into()),
            ("workAreaStart", 0.0.into()),
            ("workAreaDuration", params.duration.into()),
        ];
        for (name, value) in settings {
            self.put(comp, name, value);
        }
        self.put(
            comp,
            "renderers",
            HostValue::Array(vec!["ADBE Advanced 3d".into(), "ADBE Calder 3d".into()]),
        );
        self.put(comp, "resolutionFactor", numbers(&[1.0, 1.0]));
        let marker =
            self.new_property(comp, "markerProperty", "Marker", "ADBE Marker", HostValue::Null);
        // Comp markers are not part of any property tree
        self.objects[comp.0].children.retain(|child| *child != marker);
        self.put(marker, "parentProperty", HostValue::Null);
        self.file_item(comp, parent)?;
        Ok(comp)
    }

    fn add_footage(
        &mut self,
        name: &str,
        source: ObjRef,
        size: (f64, f64),
        parent: ObjRef,
    ) -> HostResult<ObjRef> {
        let footage = self.alloc("FootageItem");
        self.init_item(footage, name, "Footage");
        self.init_av_item(footage, size, 0.0, 0.0);
        self.set_main_source(footage, source);
        self.file_item(footage, parent)?;
        Ok(footage)
    }

    fn set_main_source(&mut self, footage: ObjRef, source: ObjRef) {
        let file = self.prop(source, "file");
        let is_still = self.class_of(source) != "FileSource";
        self.put(footage, "mainSource", source.into());
        let file = if file == HostValue::Undefined {
            HostValue::Null
        } else {
            file
        };
        self.put(footage, "file", file);
        self.put(source, "isStill", is_still.into());
        if !is_still {
            self.put(footage, "duration", 10.0.into());
            self.put(footage, "frameRate", 24.0.into());
            self.put(footage, "frameDuration", (1.0 / 24.0).into());
        }
    }

    fn new_source(&mut self, class: &'static str) -> ObjRef {
        let source = self.alloc(class);
        let settings: [(&str, HostValue); 11] = [
            ("alphaMode", 5414.0.into()),
            ("conformFrameRate", 0.0.into()),
            ("displayFrameRate", 24.0.into()),
            ("fieldSeparationType", 5612.0.into()),
            ("hasAlpha", false.into()),
            ("highQualityFieldSeparation", false.into()),
            ("invertAlpha", false.into()),
            ("loop", 1.0.into()),
            ("nativeFrameRate", 24.0.into()),
            ("premulColor", numbers(&[0.0, 0.0, 0.0])),
            ("removePulldown", 5812.0.into()),
        ];
        for (name, value) in settings {
            self.put(source, name, value);
        }
        source
    }

    fn file_source(&mut self, file: ObjRef) -> ObjRef {
        let source = self.new_source("FileSource");
        let path = self.prop(file, "fsName");
        self.put(source, "file", file.into());
        self.put(source, "missingFootagePath", path);
        source
    }

    fn solid_source(&mut self, color: HostValue) -> ObjRef {
        let source = self.new_source("SolidSource");
        self.put(source, "color", color);
        source
    }

    fn new_file(&mut self, class: &'static str, path: &str) -> ObjRef {
        let file = self.alloc(class);
        let (dir, name) = match path.rfind(&['/', '\\'][..]) {
            Some(at) => (&path[..at], &path[at + 1..]),
            None => ("", path),
        };
        self.put(file, "name", name.into());
        self.put(file, "fsName", path.into());
        self.put(file, "fullName", path.replace('\\', "/").as_str().into());
        self.put(file, "path", dir.into());
        self.put(file, "exists", false.into());
        file
    }

    fn new_property_node(
        &mut self,
        class: &'static str,
        name: &str,
        match_name: &str,
        parent: ObjRef,
    ) -> ObjRef {
        let node = self.alloc(class);
        let depth = self.number_prop(parent, "propertyDepth") + 1.0;
        let settings: [(&str, HostValue); 11] = [
            ("name", name.into()),
            ("matchName", match_name.into()),
            ("parentProperty", parent.into()),
            ("propertyDepth", depth.into()),
            ("enabled", true.into()),
            ("active", true.into()),
            ("canSetEnabled", (class != "Property").into()),
            ("isEffect", false.into()),
            ("isMask", (class == "MaskPropertyGroup").into()),
            ("isModified", false.into()),
            ("selected", false.into()),
        ];
        for (key, value) in settings {
            self.put(node, key, value);
        }
        self.objects[parent.0].children.push(node);
        node
    }

    fn new_property(
        &mut self,
        group: ObjRef,
        accessor: &str,
        name: &str,
        match_name: &str,
        value: HostValue,
    ) -> ObjRef {
        let property = self.new_property_node("Property", name, match_name, group);
        self.put(property, "value", value);
        self.put(property, "numKeys", 0.0.into());
        self.put(property, "expression", "".into());
        self.put(property, "expressionEnabled", false.into());
        self.put(property, "expressionError", "".into());
        self.put(property, "canVaryOverTime", true.into());
        self.put(group, accessor, property.into());
        property
    }

    fn new_layer(&mut self, comp: ObjRef, class: &'static str, name: &str) -> HostResult<ObjRef> {
        let layers = self
            .object_prop(comp, "layers")
            .ok_or_else(|| HostError::type_error("not a composition"))?;
        let layer = self.alloc(class);
        let id = self.fresh_id();
        let duration = self.number_prop(comp, "duration");
        let match_name = match class {
            "ShapeLayer" => "ADBE Vector Layer",
            "TextLayer" => "ADBE Text Layer",
            "CameraLayer" => "ADBE Camera Layer",
            "LightLayer" => "ADBE Light Layer",
            _ => "ADBE AV Layer",
        };
        let settings: [(&str, HostValue); 20] = [
            ("id", id.into()),
            ("name", name.into()),
            ("matchName", match_name.into()),
            ("containingComp", comp.into()),
            ("comment", "".into()),
            ("label", 1.0.into()),
            ("inPoint", 0.0.into()),
            ("outPoint", duration.into()),
            ("startTime", 0.0.into()),
            ("enabled", true.into()),
            ("active", true.into()),
            ("locked", false.into()),
            ("shy", false.into()),
            ("solo", false.into()),
            ("selected", false.into()),
            ("hasVideo", (class != "CameraLayer" && class != "LightLayer").into()),
            ("nullLayer", false.into()),
            ("parent", HostValue::Null),
            ("propertyDepth", 0.0.into()),
            ("parentProperty", HostValue::Null),
        ];
        for (key, value) in settings {
            self.put(layer, key, value);
        }

        if !matches!(class, "CameraLayer" | "LightLayer") {
            let av_settings: [(&str, HostValue); 13] = [
                ("adjustmentLayer", false.into()),
                ("audioActive", false.into()),
                ("audioEnabled", true.into()),
                ("blendingMode", NORMAL_BLENDING.into()),
                ("collapseTransformation", false.into()),
                ("effectsActive", true.into()),
                ("frameBlendingType", 4012.0.into()),
                ("guideLayer", false.into()),
                ("hasTrackMatte", false.into()),
                ("isTrackMatte", false.into()),
                ("motionBlur", false.into()),
                ("preserveTransparency", false.into()),
                ("threeDLayer", false.into()),
            ];
            for (key, value) in av_settings {
                self.put(layer, key, value);
            }
            self.put(layer, "source", HostValue::Null);
            self.put(layer, "width", self.prop(comp, "width"));
            self.put(layer, "height", self.prop(comp, "height"));
        }

        if class == "TextLayer" {
            let text =
                self.new_property_node("PropertyGroup", "Text", "ADBE Text Properties", layer);
            self.put(layer, "text", text.into());
            self.new_property(text, "sourceText", "Source Text", "ADBE Text Document", name.into());
        }

        let (w, h) = (self.number_prop(comp, "width"), self.number_prop(comp, "height"));
        let transform =
            self.new_property_node("PropertyGroup", "Transform", "ADBE Transform Group", layer);
        self.put(layer, "transform", transform.into());
        let channels: [(&str, &str, &str, HostValue); 5] = [
            ("anchorPoint", "Anchor Point", "ADBE Anchor Point", numbers(&[0.0, 0.0, 0.0])),
            ("position", "Position", "ADBE Position", numbers(&[w / 2.0, h / 2.0, 0.0])),
            ("scale", "Scale", "ADBE Scale", numbers(&[100.0, 100.0, 100.0])),
            ("rotation", "Rotation", "ADBE Rotate Z", 0.0.into()),
            ("opacity", "Opacity", "ADBE Opacity", 100.0.into()),
        ];
        for (accessor, name, match_name, value) in channels {
            self.new_property(transform, accessor, name, match_name, value);
        }
        if !matches!(class, "CameraLayer" | "LightLayer") {
            let masks = self.new_property_node("PropertyGroup", "Masks", "ADBE Mask Parade", layer);
            self.put(layer, "mask", masks.into());
            let effects =
                self.new_property_node("PropertyGroup", "Effects", "ADBE Effect Parade", layer);
            self.put(layer, "effect", effects.into());
        }

        // New layers go on top
        self.objects[layers.0].children.insert(0, layer);
        Ok(layer)
    }

    /// Replace the current project with a small demo project saved at `path`
    pub fn open_project(&mut self, file: Option<ObjRef>) -> HostResult<ObjRef> {
        let project = self.new_project(file);
        self.put(self.app, "project", project.into());
        self.populate_demo()?;
        Ok(project)
    }

    fn populate_demo(&mut self) -> HostResult<()> {
        let root = self.root_folder()?;
        let footage_folder = self.add_folder("Footage", root)?;

        let plate_file = self.new_file("File", "/footage/plate.mov");
        let plate_source = self.file_source(plate_file);
        let plate = self.add_footage("plate.mov", plate_source, (1920.0, 1080.0), footage_folder)?;

        let black = self.solid_source(numbers(&[0.0, 0.0, 0.0]));
        let solid = self.add_footage("Black Solid 1", black, (1920.0, 1080.0), root)?;

        let main = self.add_comp(
            CompSettings {
                name: "Main".to_string(),
                width: 1920.0,
                height: 1080.0,
                pixel_aspect: 1.0,
                duration: 10.0,
                frame_rate: 24.0,
            },
            root,
        )?;
        for source in [solid, plate] {
            let name = self.prop(source, "name");
            let layer = self.new_layer(main, "AVLayer", name.as_str().unwrap_or_default())?;
            self.put(layer, "source", source.into());
        }
        self.new_layer(main, "TextLayer", "Title")?;
        Ok(())
    }

    // ---- property access ----

    /// Read `object.name`
    pub fn get(&self, r: ObjRef, name: &str) -> HostResult<HostValue> {
        let class = self.class_of(r);
        let computed = match name {
            "length" if class.ends_with("Collection") => {
                Some(HostValue::Number(self.children(r).len() as f64))
            }
            "numItems" if class == "Project" || class == "FolderItem" || class == "RenderQueue" => {
                let count = self
                    .object_prop(r, "items")
                    .map_or(0, |items| self.children(items).len());
                Some(HostValue::Number(count as f64))
            }
            "numLayers" if class == "CompItem" => {
                let count = self
                    .object_prop(r, "layers")
                    .map_or(0, |layers| self.children(layers).len());
                Some(HostValue::Number(count as f64))
            }
            "numProperties" if self.is_a(r, &LAYER_CLASSES) || self.is_a(r, &PROPERTY_CLASSES) => {
                Some(HostValue::Number(self.children(r).len() as f64))
            }
            "index" if self.is_a(r, &LAYER_CLASSES) => Some(self.layer_index(r)),
            "propertyIndex" => Some(self.property_index(r)),
            "selection" if class == "Project" => Some(self.selected_items(r)),
            "selectedLayers" if class == "CompItem" => Some(self.selected_layers(r)),
            "selectedProperties" if class == "CompItem" => Some(HostValue::Array(Vec::new())),
            "activeCamera" if class == "CompItem" => Some(self.active_camera(r)),
            "usedIn" if self.is_a(r, &ITEM_CLASSES) => Some(self.used_in(r)),
            _ => None,
        };
        Ok(computed.unwrap_or_else(|| self.prop(r, name)))
    }

    /// Assign `object.name = value`
    pub fn set(&mut self, r: ObjRef, name: &str, value: HostValue) -> HostResult<HostValue> {
        if READ_ONLY.contains(&name) && self.get(r, name)? != HostValue::Undefined {
            return Err(HostError::runtime(format!(
                "Unable to set \"{name}\". It is read-only."
            )));
        }
        debug!(class = self.class_of(r), name, "assign");
        if name == "parentFolder" {
            let folder = value
                .as_object()
                .ok_or_else(|| HostError::type_error("parentFolder must be a folder"))?;
            self.unfile_item(r);
            self.file_item(r, folder)?;
            return Ok(value);
        }
        if name == "frameRate" && self.class_of(r) == "CompItem" {
            if let Some(rate) = value.as_number().filter(|rate| *rate > 0.0) {
                self.put(r, "frameDuration", (1.0 / rate).into());
            }
        }
        if self.class_of(r) == "Project" {
            let revision = self.number_prop(r, "revision") + 1.0;
            self.put(r, "revision", revision.into());
            self.put(r, "dirty", true.into());
        }
        self.put(r, name, value.clone());
        Ok(value)
    }

    /// Evaluate `collection[index]` with the host's 1-based indexing
    pub fn index(&self, r: ObjRef, index: &HostValue) -> HostResult<HostValue> {
        let Some(position) = index.as_number() else {
            return self.get(r, index.as_str().unwrap_or_default());
        };
        Ok(self.child_at(r, position).map_or(HostValue::Undefined, HostValue::Object))
    }

    fn child_at(&self, collection: ObjRef, position: f64) -> Option<ObjRef> {
        if position < 1.0 || position.fract() != 0.0 {
            return None;
        }
        self.children(collection).get(position as usize - 1).copied()
    }

    fn layer_index(&self, layer: ObjRef) -> HostValue {
        self.object_prop(layer, "containingComp")
            .and_then(|comp| self.object_prop(comp, "layers"))
            .and_then(|layers| self.children(layers).iter().position(|l| *l == layer))
            .map_or(HostValue::Undefined, |at| HostValue::Number(at as f64 + 1.0))
    }

    fn property_index(&self, node: ObjRef) -> HostValue {
        if self.is_a(node, &LAYER_CLASSES) {
            return self.layer_index(node);
        }
        self.object_prop(node, "parentProperty")
            .and_then(|parent| self.children(parent).iter().position(|c| *c == node))
            .map_or(HostValue::Undefined, |at| HostValue::Number(at as f64 + 1.0))
    }

    fn selected_items(&self, project: ObjRef) -> HostValue {
        let items = self.object_prop(project, "items").map_or(&[][..], |c| self.children(c));
        HostValue::Array(
            items
                .iter()
                .filter(|item| self.prop(**item, "selected").is_truthy())
                .map(|item| HostValue::Object(*item))
                .collect(),
        )
    }

    fn layers_of(&self, comp: ObjRef) -> Vec<ObjRef> {
        self.object_prop(comp, "layers")
            .map(|layers| self.children(layers).to_vec())
            .unwrap_or_default()
    }

    fn selected_layers(&self, comp: ObjRef) -> HostValue {
        HostValue::Array(
            self.layers_of(comp)
                .into_iter()
                .filter(|layer| self.prop(*layer, "selected").is_truthy())
                .map(HostValue::Object)
                .collect(),
        )
    }

    fn active_camera(&self, comp: ObjRef) -> HostValue {
        self.layers_of(comp)
            .into_iter()
            .find(|layer| {
                self.class_of(*layer) == "CameraLayer" && self.prop(*layer, "enabled").is_truthy()
            })
            .map_or(HostValue::Null, HostValue::Object)
    }

    fn used_in(&self, item: ObjRef) -> HostValue {
        let comps = self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.class == "CompItem")
            .map(|(at, _)| ObjRef(at))
            .filter(|comp| {
                self.layers_of(*comp)
                    .into_iter()
                    .any(|layer| self.object_prop(layer, "source") == Some(item))
            })
            .map(HostValue::Object)
            .collect();
        HostValue::Array(comps)
    }

    // ---- calls ----

    /// Call a global function
    pub fn call_global(&mut self, name: &str, args: &[HostValue]) -> HostResult<HostValue> {
        match name {
            "File" | "Folder" => {
                let path = string_arg(args, 0, name)?;
                let class = if name == "File" { "File" } else { "Folder" };
                Ok(self.new_file(class, path).into())
            }
            "timeToCurrentFormat" => {
                let seconds = number_arg(args, 0, name)?;
                let rate = number_arg(args, 1, name)?;
                Ok(HostValue::Str(format_timecode(seconds, rate)))
            }
            "currentFormatToTime" => {
                let timecode = string_arg(args, 0, name)?;
                let rate = number_arg(args, 1, name)?;
                parse_timecode(timecode, rate).map(HostValue::Number)
            }
            _ => Err(HostError::reference(format!("{name} is undefined"))),
        }
    }

    /// Evaluate `new Class(args)`
    pub fn construct(&mut self, class: &str, args: &[HostValue]) -> HostResult<HostValue> {
        match class {
            "ImportOptions" => {
                let options = self.alloc("ImportOptions");
                self.put(options, "file", args.first().cloned().unwrap_or(HostValue::Null));
                self.put(options, "sequence", false.into());
                self.put(options, "forceAlphabetical", false.into());
                Ok(options.into())
            }
            "File" | "Folder" => self.call_global(class, args),
            _ => Err(HostError::reference(format!("{class} is undefined"))),
        }
    }

    /// Call `object.method(args)`
    pub fn call(&mut self, r: ObjRef, method: &str, args: &[HostValue]) -> HostResult<HostValue> {
        let class = self.class_of(r);
        debug!(class, method, "call");
        match (class, method) {
            ("Application", "open") => match args.first().and_then(HostValue::as_object) {
                Some(file) => self.open_project(Some(file)).map(HostValue::Object),
                // The open dialog was cancelled
                None => Ok(HostValue::Null),
            },
            ("Application", "newProject") => {
                let project = self.new_project(None);
                self.put(self.app, "project", project.into());
                Ok(project.into())
            }
            ("Application", "executeCommand") => {
                let command = number_arg(args, 0, method)?;
                self.execute_command(command)?;
                Ok(HostValue::Undefined)
            }
            ("Application", "findMenuCommandId") => {
                let id = match string_arg(args, 0, method)? {
                    "Duplicate" => COMMAND_DUPLICATE,
                    "Increment and Save" => COMMAND_SAVE_INCREMENTAL,
                    _ => 0.0,
                };
                Ok(id.into())
            }
            ("Application", "beginUndoGroup" | "endUndoGroup") => Ok(HostValue::Undefined),
            ("Application", "purge") => Ok(true.into()),

            ("Project", "item") | ("FolderItem", "item") => {
                let position = number_arg(args, 0, method)?;
                let items = self.object_prop(r, "items").unwrap_or(r);
                self.child_at(items, position)
                    .map(HostValue::Object)
                    .ok_or_else(|| HostError::runtime("After Effects error: index out of range"))
            }
            ("Project", "itemByID") => {
                let id = number_arg(args, 0, method)?;
                Ok(self.find_by_id(&ITEM_CLASSES, id))
            }
            ("Project", "layerByID") => {
                let id = number_arg(args, 0, method)?;
                Ok(self.find_by_id(&LAYER_CLASSES, id))
            }
            ("Project", "close") => Ok(true.into()),
            ("Project", "save") => {
                if let Some(file) = args.first().and_then(HostValue::as_object) {
                    self.put(r, "file", file.into());
                }
                self.put(r, "dirty", false.into());
                Ok(true.into())
            }
            ("Project", "importFile") => {
                let options = args
                    .first()
                    .and_then(HostValue::as_object)
                    .ok_or_else(|| HostError::type_error("importFile expects ImportOptions"))?;
                let file = self
                    .object_prop(options, "file")
                    .ok_or_else(|| HostError::runtime("ImportOptions has no file"))?;
                let name = self.prop(file, "name");
                let source = self.file_source(file);
                let root = self.root_folder()?;
                let footage = self.add_footage(
                    name.as_str().unwrap_or_default(),
                    source,
                    (1920.0, 1080.0),
                    root,
                )?;
                Ok(footage.into())
            }
            ("Project", "importPlaceholder") => {
                let name = string_arg(args, 0, method)?.to_string();
                let size = (number_arg(args, 1, method)?, number_arg(args, 2, method)?);
                let source = self.new_source("PlaceholderSource");
                let root = self.root_folder()?;
                let footage = self.add_footage(&name, source, size, root)?;
                self.put(footage, "frameRate", number_arg(args, 3, method)?.into());
                self.put(footage, "duration", number_arg(args, 4, method)?.into());
                Ok(footage.into())
            }
            ("Project", "listColorProfiles") => Ok(HostValue::Array(vec![
                "None".into(),
                "sRGB IEC61966-2.1".into(),
                "Rec.709 Gamma 2.4".into(),
            ])),
            ("Project", "consolidateFootage" | "removeUnusedFootage" | "reduceProject") => {
                Ok(0.0.into())
            }
            ("Project", "autoFixExpressions" | "showWindow") => Ok(HostValue::Undefined),
            // Nobody answers dialogs here: both behave as if cancelled
            ("Project", "importFileWithDialog") => Ok(HostValue::Null),
            ("Project", "saveWithDialog") => Ok(false.into()),
            ("Project", "setDefaultImportFolder") => Ok(true.into()),

            ("ItemCollection", "addComp") => {
                let settings = CompSettings::from_args(args)?;
                let folder = self.collection_folder(r)?;
                self.add_comp(settings, folder).map(HostValue::Object)
            }
            ("ItemCollection", "addFolder") => {
                let name = string_arg(args, 0, method)?.to_string();
                let folder = self.collection_folder(r)?;
                self.add_folder(&name, folder).map(HostValue::Object)
            }

            ("CompItem", "layer") => self.comp_layer(r, args),
            ("CompItem", "openInViewer") => {
                let viewer = self.alloc("Viewer");
                self.put(viewer, "active", true.into());
                self.put(viewer, "maximized", false.into());
                Ok(viewer.into())
            }
            ("CompItem", "openInEssentialGraphics") => Ok(HostValue::Undefined),

            ("FootageItem", "replace" | "replaceWithSequence") => {
                let file = args
                    .first()
                    .and_then(HostValue::as_object)
                    .ok_or_else(|| HostError::type_error(format!("{method} expects a File")))?;
                let source = self.file_source(file);
                self.set_main_source(r, source);
                Ok(HostValue::Undefined)
            }
            ("FootageItem", "replaceWithSolid") => {
                let color = args.first().cloned().unwrap_or(HostValue::Null);
                let name = string_arg(args, 1, method)?.to_string();
                let source = self.solid_source(color);
                self.set_main_source(r, source);
                self.put(r, "name", name.as_str().into());
                self.put(r, "width", number_arg(args, 2, method)?.into());
                self.put(r, "height", number_arg(args, 3, method)?.into());
                Ok(HostValue::Undefined)
            }
            ("FootageItem", "replaceWithPlaceholder") => {
                let name = string_arg(args, 0, method)?.to_string();
                let source = self.new_source("PlaceholderSource");
                self.set_main_source(r, source);
                self.put(r, "name", name.as_str().into());
                self.put(r, "frameRate", number_arg(args, 3, method)?.into());
                self.put(r, "duration", number_arg(args, 4, method)?.into());
                Ok(HostValue::Undefined)
            }
            ("CompItem" | "FolderItem" | "FootageItem", "addGuide") => {
                let guide = self.alloc("Object");
                self.put(guide, "orientationType", number_arg(args, 0, method)?.into());
                self.put(guide, "positionType", 0.0.into());
                self.put(guide, "position", number_arg(args, 1, method)?.into());
                let mut guides = self.guides(r);
                guides.push(guide.into());
                let index = guides.len() - 1;
                self.put(r, "guides", HostValue::Array(guides));
                Ok((index as f64).into())
            }
            ("CompItem" | "FolderItem" | "FootageItem", "setGuide") => {
                let position = number_arg(args, 0, method)?;
                let guide = self.guide_at(r, number_arg(args, 1, method)?)?;
                self.put(guide, "position", position.into());
                Ok(HostValue::Undefined)
            }
            ("CompItem" | "FolderItem" | "FootageItem", "removeGuide") => {
                let index = number_arg(args, 0, method)?;
                let guide = self.guide_at(r, index)?;
                let mut guides = self.guides(r);
                guides.retain(|g| g.as_object() != Some(guide));
                self.put(r, "guides", HostValue::Array(guides));
                Ok(HostValue::Undefined)
            }
            ("CompItem" | "FolderItem" | "FootageItem", "remove") => {
                self.unfile_item(r);
                Ok(HostValue::Undefined)
            }
            ("CompItem" | "FootageItem", "setProxy" | "setProxyWithSequence") => {
                let file = args
                    .first()
                    .and_then(HostValue::as_object)
                    .ok_or_else(|| HostError::type_error(format!("{method} expects a File")))?;
                let source = self.file_source(file);
                self.put(r, "proxySource", source.into());
                self.put(r, "useProxy", true.into());
                Ok(HostValue::Undefined)
            }
            ("CompItem" | "FootageItem", "setProxyToNone") => {
                self.put(r, "proxySource", HostValue::Null);
                self.put(r, "useProxy", false.into());
                Ok(HostValue::Undefined)
            }

            ("LayerCollection", _) => self.layer_collection_call(r, method, args),

            (_, "property") if self.is_a(r, &LAYER_CLASSES) || self.is_a(r, &PROPERTY_CLASSES) => {
                self.child_property(r, args.first().unwrap_or(&HostValue::Undefined))
            }
            (_, "remove") if self.is_a(r, &LAYER_CLASSES) => {
                if let Some(layers) = self
                    .object_prop(r, "containingComp")
                    .and_then(|comp| self.object_prop(comp, "layers"))
                {
                    self.objects[layers.0].children.retain(|layer| *layer != r);
                }
                Ok(HostValue::Undefined)
            }
            (_, "moveToBeginning" | "moveToEnd") if self.is_a(r, &LAYER_CLASSES) => {
                self.move_layer(r, method == "moveToBeginning");
                Ok(HostValue::Undefined)
            }
            (_, "remove") if self.is_a(r, &PROPERTY_CLASSES) => {
                if let Some(parent) = self.object_prop(r, "parentProperty") {
                    self.objects[parent.0].children.retain(|child| *child != r);
                }
                Ok(HostValue::Undefined)
            }
            ("PropertyGroup" | "MaskPropertyGroup", "canAddProperty") => {
                Ok(self.accepts_children(r).into())
            }
            ("PropertyGroup" | "MaskPropertyGroup", "addProperty") => {
                let match_name = string_arg(args, 0, method)?.to_string();
                if !self.accepts_children(r) {
                    return Err(HostError::runtime(format!(
                        "Can not add a property with name \"{match_name}\" to this PropertyGroup"
                    )));
                }
                let effect = self.new_property_node("PropertyGroup", &match_name, &match_name, r);
                self.put(effect, "isEffect", true.into());
                Ok(effect.into())
            }
            ("Property", "setValue") => {
                let value = args.first().cloned().unwrap_or(HostValue::Undefined);
                self.put(r, "value", value);
                Ok(HostValue::Undefined)
            }
            ("Property", "valueAtTime") => Ok(self.prop(r, "value")),
            ("Property", "setValueAtTime") => {
                let value = args.get(1).cloned().unwrap_or(HostValue::Undefined);
                let keys = self.number_prop(r, "numKeys") + 1.0;
                self.put(r, "value", value);
                self.put(r, "numKeys", keys.into());
                Ok(HostValue::Undefined)
            }

            (
                "FileSource" | "SolidSource" | "PlaceholderSource",
                "guessAlphaMode" | "guessPulldown",
            ) => {
                Ok(HostValue::Undefined)
            }
            ("FileSource", "reload") => Ok(HostValue::Undefined),
            ("RenderQueue", "render" | "stopRendering" | "showWindow") => Ok(HostValue::Undefined),
            ("Viewer", "setActive") => {
                self.put(r, "active", true.into());
                Ok(true.into())
            }
            _ => Err(HostError::type_error(format!("{method} is not a function"))),
        }
    }

    fn execute_command(&mut self, command: f64) -> HostResult<()> {
        if command != COMMAND_DUPLICATE {
            return Ok(());
        }
        let selection = match self.selected_items(self.project()?) {
            HostValue::Array(items) => items,
            _ => Vec::new(),
        };
        for item in selection.iter().filter_map(HostValue::as_object) {
            if self.class_of(item) == "FolderItem" {
                continue;
            }
            let mut copy = self.objects[item.0].clone();
            let id = self.fresh_id();
            copy.props.insert("id".to_string(), id.into());
            if let Some(name) = copy.props.get("name").and_then(HostValue::as_str) {
                let renamed = format!("{name} 2");
                copy.props.insert("name".to_string(), renamed.as_str().into());
            }
            self.objects.push(copy);
            let duplicate = ObjRef(self.objects.len() - 1);
            if self.class_of(item) == "CompItem" {
                // Layers are not duplicated
                let layers = self.collection("LayerCollection", duplicate);
                self.put(duplicate, "layers", layers.into());
            }
            let folder = self
                .object_prop(item, "parentFolder")
                .map_or_else(|| self.root_folder(), Ok)?;
            self.file_item(duplicate, folder)?;
        }
        Ok(())
    }

    fn find_by_id(&self, classes: &[&str], id: f64) -> HostValue {
        self.objects
            .iter()
            .enumerate()
            .find(|(_, object)| {
                classes.contains(&object.class)
                    && object.props.get("id") == Some(&HostValue::Number(id))
            })
            .map_or(HostValue::Null, |(at, _)| HostValue::Object(ObjRef(at)))
    }

    fn collection_folder(&self, collection: ObjRef) -> HostResult<ObjRef> {
        match self.objects[collection.0].owner {
            Some(owner) if self.class_of(owner) == "FolderItem" => Ok(owner),
            _ => self.root_folder(),
        }
    }

    fn comp_layer(&self, comp: ObjRef, args: &[HostValue]) -> HostResult<HostValue> {
        let layers = self.layers_of(comp);
        match args {
            [HostValue::Number(position)] => self
                .object_prop(comp, "layers")
                .and_then(|collection| self.child_at(collection, *position))
                .map(HostValue::Object)
                .ok_or_else(|| HostError::runtime("After Effects error: index out of range")),
            [HostValue::Str(name)] => Ok(self.layer_named(&layers, name)),
            [HostValue::Object(other), HostValue::Number(offset)] => {
                let at = layers
                    .iter()
                    .position(|layer| layer == other)
                    .ok_or_else(|| HostError::runtime("layer is not in this composition"))?;
                let target = at as f64 + offset;
                Ok(if target >= 0.0 {
                    layers
                        .get(target as usize)
                        .map_or(HostValue::Null, |layer| HostValue::Object(*layer))
                } else {
                    HostValue::Null
                })
            }
            _ => Err(HostError::type_error("Bad argument list to layer()")),
        }
    }

    fn layer_named(&self, layers: &[ObjRef], name: &str) -> HostValue {
        layers
            .iter()
            .find(|layer| self.prop(**layer, "name").as_str() == Some(name))
            .map_or(HostValue::Null, |layer| HostValue::Object(*layer))
    }

    fn move_layer(&mut self, layer: ObjRef, to_top: bool) {
        let Some(layers) = self
            .object_prop(layer, "containingComp")
            .and_then(|comp| self.object_prop(comp, "layers"))
        else {
            return;
        };
        let children = &mut self.objects[layers.0].children;
        children.retain(|l| *l != layer);
        if to_top {
            children.insert(0, layer);
        } else {
            children.push(layer);
        }
    }

    fn layer_collection_call(
        &mut self,
        collection: ObjRef,
        method: &str,
        args: &[HostValue],
    ) -> HostResult<HostValue> {
        let comp = self.objects[collection.0]
            .owner
            .ok_or_else(|| HostError::runtime("layer collection without a composition"))?;
        let layer = match method {
            "addNull" => {
                let layer = self.new_layer(comp, "AVLayer", "Null 1")?;
                self.put(layer, "nullLayer", true.into());
                layer
            }
            "addSolid" => {
                let color = args.first().cloned().unwrap_or(HostValue::Null);
                let name = string_arg(args, 1, method)?.to_string();
                let size = (number_arg(args, 2, method)?, number_arg(args, 3, method)?);
                let source = self.solid_source(color);
                let root = self.root_folder()?;
                let footage = self.add_footage(&name, source, size, root)?;
                let layer = self.new_layer(comp, "AVLayer", &name)?;
                self.put(layer, "source", footage.into());
                layer
            }
            "addText" | "addBoxText" => {
                let text = args.first().and_then(HostValue::as_str).unwrap_or("Text");
                let text = if method == "addBoxText" { "Text" } else { text }.to_string();
                self.new_layer(comp, "TextLayer", &text)?
            }
            "addShape" => self.new_layer(comp, "ShapeLayer", "Shape Layer 1")?,
            "addCamera" => {
                let name = string_arg(args, 0, method)?.to_string();
                self.new_layer(comp, "CameraLayer", &name)?
            }
            "addLight" => {
                let name = string_arg(args, 0, method)?.to_string();
                self.new_layer(comp, "LightLayer", &name)?
            }
            "add" => {
                let item = args
                    .first()
                    .and_then(HostValue::as_object)
                    .ok_or_else(|| HostError::type_error("add expects an AVItem"))?;
                let name = self.prop(item, "name");
                let layer = self.new_layer(comp, "AVLayer", name.as_str().unwrap_or_default())?;
                self.put(layer, "source", item.into());
                layer
            }
            "byName" => {
                let name = string_arg(args, 0, method)?;
                return Ok(self.layer_named(&self.layers_of(comp), name));
            }
            "precompose" => return self.precompose(comp, args),
            _ => return Err(HostError::type_error(format!("{method} is not a function"))),
        };
        Ok(layer.into())
    }

    fn precompose(&mut self, comp: ObjRef, args: &[HostValue]) -> HostResult<HostValue> {
        let positions = match args.first() {
            Some(HostValue::Array(positions)) => positions.clone(),
            _ => return Err(HostError::type_error("precompose expects an array of indices")),
        };
        let name = string_arg(args, 1, "precompose")?.to_string();
        let collection = self
            .object_prop(comp, "layers")
            .ok_or_else(|| HostError::type_error("not a composition"))?;

        let mut moved = Vec::with_capacity(positions.len());
        for position in &positions {
            let layer = position
                .as_number()
                .and_then(|p| self.child_at(collection, p))
                .ok_or_else(|| HostError::runtime("After Effects error: index out of range"))?;
            moved.push(layer);
        }

        let settings = CompSettings {
            name: name.clone(),
            width: self.number_prop(comp, "width"),
            height: self.number_prop(comp, "height"),
            pixel_aspect: self.number_prop(comp, "pixelAspect"),
            duration: self.number_prop(comp, "duration"),
            frame_rate: self.number_prop(comp, "frameRate"),
        };
        let folder = self.object_prop(comp, "parentFolder").map_or_else(|| self.root_folder(), Ok)?;
        let nested = self.add_comp(settings, folder)?;
        let nested_layers = self
            .object_prop(nested, "layers")
            .ok_or_else(|| HostError::type_error("not a composition"))?;

        let top = self.children(collection).iter().position(|l| moved.contains(l)).unwrap_or(0);
        self.objects[collection.0].children.retain(|l| !moved.contains(l));
        for layer in &moved {
            self.put(*layer, "containingComp", nested.into());
        }
        self.objects[nested_layers.0].children = moved;

        let replacement = self.new_layer(comp, "AVLayer", &name)?;
        self.put(replacement, "source", nested.into());
        let children = &mut self.objects[collection.0].children;
        children.retain(|l| *l != replacement);
        let at = top.min(children.len());
        children.insert(at, replacement);
        Ok(nested.into())
    }

    fn child_property(&self, node: ObjRef, key: &HostValue) -> HostResult<HostValue> {
        let children = self.children(node);
        let found = match key {
            HostValue::Number(position) if *position >= 1.0 => {
                children.get(*position as usize - 1).copied()
            }
            HostValue::Str(name) => children.iter().copied().find(|child| {
                self.prop(*child, "name").as_str() == Some(name)
                    || self.prop(*child, "matchName").as_str() == Some(name)
            }),
            HostValue::Number(_) => None,
            _ => return Err(HostError::type_error("Bad argument list to property()")),
        };
        Ok(found.map_or(HostValue::Null, HostValue::Object))
    }

    fn accepts_children(&self, group: ObjRef) -> bool {
        matches!(
            self.prop(group, "matchName").as_str(),
            Some("ADBE Effect Parade" | "ADBE Mask Parade")
        )
    }
}

/// Arguments of `ItemCollection.addComp`
struct CompSettings {
    name: String,
    width: f64,
    height: f64,
    pixel_aspect: f64,
    duration: f64,
    frame_rate: f64,
}

impl CompSettings {
    fn from_args(args: &[HostValue]) -> HostResult<Self> {
        const METHOD: &str = "addComp";
        Ok(Self {
            name: string_arg(args, 0, METHOD)?.to_string(),
            width: number_arg(args, 1, METHOD)?,
            height: number_arg(args, 2, METHOD)?,
            pixel_aspect: number_arg(args, 3, METHOD)?,
            duration: number_arg(args, 4, METHOD)?,
            frame_rate: number_arg(args, 5, METHOD)?,
        })
    }
}

fn bad_argument(method: &str, position: usize) -> HostError {
    HostError::runtime(format!(
        "Unable to call \"{method}\" because of parameter {}.",
        position + 1
    ))
}

fn string_arg<'a>(args: &'a [HostValue], position: usize, method: &str) -> HostResult<&'a str> {
    args.get(position)
        .and_then(HostValue::as_str)
        .ok_or_else(|| bad_argument(method, position))
}

fn number_arg(args: &[HostValue], position: usize, method: &str) -> HostResult<f64> {
    args.get(position)
        .and_then(HostValue::as_number)
        .ok_or_else(|| bad_argument(method, position))
}

/// `H:MM:SS:FF` at the given frame rate
pub fn format_timecode(seconds: f64, frame_rate: f64) -> String {
    let fps = frame_rate.round().max(1.0) as u64;
    let total = (seconds * frame_rate).round().max(0.0) as u64;
    let frames = total % fps;
    let whole = total / fps;
    format!(
        "{}:{:02}:{:02}:{:02}",
        whole / 3600,
        (whole / 60) % 60,
        whole % 60,
        frames
    )
}

pub fn parse_timecode(timecode: &str, frame_rate: f64) -> HostResult<f64> {
    let parts = timecode
        .split(&[':', ';'][..])
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| HostError::runtime(format!("'{timecode}' is not a valid time")))?;
    let fps = frame_rate.round().max(1.0);
    match parts.as_slice() {
        [frames] => Ok(frames / frame_rate),
        [h, m, s, f] => Ok(h * 3600.0 + m * 60.0 + s + f / fps),
        _ => Err(HostError::runtime(format!("'{timecode}' is not a valid time"))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn demo() -> (Scene, ObjRef) {
        let mut scene = Scene::new();
        let file = scene.new_file("File", "/projects/demo.aep");
        let project = scene.open_project(Some(file)).unwrap();
        (scene, project)
    }

    fn main_comp(scene: &Scene, project: ObjRef) -> ObjRef {
        let items = scene.object_prop(project, "items").unwrap();
        scene
            .children(items)
            .iter()
            .copied()
            .find(|item| scene.class_of(*item) == "CompItem")
            .unwrap()
    }

    #[test]
    fn test_demo_project_contents() {
        let (scene, project) = demo();
        assert_eq!(scene.get(project, "numItems").unwrap(), HostValue::Number(4.0));
        let comp = main_comp(&scene, project);
        assert_eq!(scene.get(comp, "numLayers").unwrap(), HostValue::Number(3.0));

        let layers = scene.object_prop(comp, "layers").unwrap();
        let top = scene.index(layers, &HostValue::Number(1.0)).unwrap();
        let top = top.as_object().unwrap();
        assert_eq!(scene.class_of(top), "TextLayer");
        assert_eq!(scene.get(top, "index").unwrap(), HostValue::Number(1.0));
        assert_eq!(scene.index(layers, &HostValue::Number(4.0)).unwrap(), HostValue::Undefined);
    }

    #[test]
    fn test_add_comp_files_into_folder() {
        let (mut scene, project) = demo();
        let root = scene.root_folder().unwrap();
        let root_items = scene.object_prop(root, "items").unwrap();
        let args: [HostValue; 6] = [
            "Shot".into(),
            1280.0.into(),
            720.0.into(),
            1.0.into(),
            5.0.into(),
            25.0.into(),
        ];
        let comp = scene.call(root_items, "addComp", &args).unwrap().as_object().unwrap();
        assert_eq!(scene.prop(comp, "parentFolder"), HostValue::Object(root));
        assert_eq!(scene.get(project, "numItems").unwrap(), HostValue::Number(5.0));
        assert_eq!(scene.prop(comp, "frameDuration"), HostValue::Number(1.0 / 25.0));

        let err = scene.call(root_items, "addComp", &args[..3]).unwrap_err();
        assert_eq!(err.name(), "Error");
    }

    #[test]
    fn test_precompose_moves_layers() {
        let (mut scene, project) = demo();
        let comp = main_comp(&scene, project);
        let layers = scene.object_prop(comp, "layers").unwrap();
        let args = [numbers(&[2.0, 3.0]), "Pre-comp 1".into(), true.into()];
        let nested = scene.call(layers, "precompose", &args).unwrap().as_object().unwrap();

        assert_eq!(scene.get(nested, "numLayers").unwrap(), HostValue::Number(2.0));
        assert_eq!(scene.get(comp, "numLayers").unwrap(), HostValue::Number(2.0));
        let second = scene.children(layers)[1];
        assert_eq!(scene.prop(second, "name"), HostValue::from("Pre-comp 1"));
        assert_eq!(scene.prop(second, "source"), HostValue::Object(nested));
    }

    #[test]
    fn test_guides_on_items() {
        let (mut scene, project) = demo();
        let comp = main_comp(&scene, project);
        let first = scene.call(comp, "addGuide", &[0.0.into(), 540.0.into()]).unwrap();
        let second = scene.call(comp, "addGuide", &[1.0.into(), 960.0.into()]).unwrap();
        assert_eq!((first, second), (HostValue::Number(0.0), HostValue::Number(1.0)));

        scene.call(comp, "setGuide", &[100.0.into(), 1.0.into()]).unwrap();
        let guide = scene.guide_at(comp, 1.0).unwrap();
        assert_eq!(scene.prop(guide, "position"), HostValue::Number(100.0));

        scene.call(comp, "removeGuide", &[0.0.into()]).unwrap();
        assert_eq!(scene.guides(comp), vec![HostValue::Object(guide)]);

        let err = scene.call(comp, "setGuide", &[1.0.into(), 1.0.into()]).unwrap_err();
        assert_eq!(err.name(), "Error");
        assert!(scene.set(comp, "guides", HostValue::Array(Vec::new())).is_err());
    }

    #[test]
    fn test_comp_marker_and_project_defaults() {
        let (scene, project) = demo();
        let comp = main_comp(&scene, project);
        let marker = scene.object_prop(comp, "markerProperty").unwrap();
        assert_eq!(scene.class_of(marker), "Property");
        assert_eq!(scene.prop(marker, "matchName"), HostValue::from("ADBE Marker"));
        assert!(scene.children(comp).is_empty());
        assert_eq!(scene.prop(project, "toolType"), HostValue::Number(TOOL_ARROW));
    }

    #[test]
    fn test_property_tree() {
        let (mut scene, project) = demo();
        let comp = main_comp(&scene, project);
        let layer = scene.layers_of(comp)[1];
        let transform = scene.object_prop(layer, "transform").unwrap();
        let opacity = scene.get(transform, "opacity").unwrap().as_object().unwrap();
        assert_eq!(scene.get(opacity, "propertyIndex").unwrap(), HostValue::Number(5.0));
        assert_eq!(scene.prop(opacity, "propertyDepth"), HostValue::Number(2.0));

        scene.call(opacity, "setValue", &[50.0.into()]).unwrap();
        assert_eq!(scene.get(opacity, "value").unwrap(), HostValue::Number(50.0));
        assert!(scene.set(opacity, "value", 10.0.into()).is_err());

        let effects = scene
            .call(layer, "property", &["ADBE Effect Parade".into()])
            .unwrap()
            .as_object()
            .unwrap();
        let blur = scene
            .call(effects, "addProperty", &["ADBE Gaussian Blur 2".into()])
            .unwrap();
        assert!(matches!(blur, HostValue::Object(_)));
        assert!(scene.call(transform, "addProperty", &["ADBE Gaussian Blur 2".into()]).is_err());
    }

    #[test]
    fn test_unknown_method_is_type_error() {
        let mut scene = Scene::new();
        let err = scene.call(scene.app(), "foo", &[]).unwrap_err();
        assert_eq!(err, HostError::type_error("foo is not a function"));
    }

    #[test]
    fn test_timecode() {
        assert_eq!(format_timecode(1.5, 24.0), "0:00:01:12");
        assert_eq!(format_timecode(3725.0, 25.0), "1:02:05:00");
        assert_eq!(parse_timecode("0:00:01:12", 24.0).unwrap(), 1.5);
        assert!(parse_timecode("soon", 24.0).is_err());
    }
}
