use super::{
    application::COMMAND_DUPLICATE,
    check_range,
    layer::{CameraLayer, Layer, LayerCollection},
    misc::{File, Viewer},
    property::{Property, PropertyNode},
    require, rgb,
    source::FootageSource,
};
use crate::{
    codec::{call, quote, FromValue, Raw, ToExtend, Value},
    collection::{host_index, RemoteCollection},
    enums::LABEL_COLOR,
    error::{BridgeError, Result},
    proxy::{remote_object, Remote, RemoteObject},
};

remote_object! {
    /// A composition
    CompItem => "CompItem"
}

remote_object! {
    /// A folder in the Project panel
    FolderItem => "FolderItem"
}

remote_object! {
    /// An imported file, solid or placeholder
    FootageItem => "FootageItem"
}

remote_object! {
    /// The items of a project or folder
    ItemCollection => "ItemCollection"
}

family! {
    /// Any entry of the Project panel
    Item, "item" {
        Comp(CompItem) <= CompItem,
        Folder(FolderItem) <= FolderItem,
        Footage(FootageItem) <= FootageItem,
    }
}

family! {
    /// An item with audio or video: a composition or footage
    AvItem, "audio/visual item" {
        Comp(CompItem) <= CompItem,
        Footage(FootageItem) <= FootageItem,
    }
}

/// A ruler guide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    /// 0 for horizontal, 1 for vertical
    pub orientation: i64,
    pub position_type: i64,
    pub position: f64,
}

/// A length of time, in seconds or as text in the project's time display
/// format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeSpan<'a> {
    Seconds(f64),
    CurrentFormat(&'a str),
}

impl From<f64> for TimeSpan<'_> {
    fn from(seconds: f64) -> Self {
        TimeSpan::Seconds(seconds)
    }
}

impl<'a> From<&'a str> for TimeSpan<'a> {
    fn from(text: &'a str) -> Self {
        TimeSpan::CurrentFormat(text)
    }
}

impl TimeSpan<'_> {
    /// Source fragment for the span in seconds; text is converted host-side
    pub(super) fn seconds_at(&self, frame_rate: f64) -> String {
        match self {
            TimeSpan::Seconds(seconds) => seconds.to_extend(),
            TimeSpan::CurrentFormat(text) => call("currentFormatToTime", &[text, &frame_rate]),
        }
    }
}

/// Read a time attribute formatted per the project's time display settings
fn read_in_current_format<T: Remote + ?Sized>(item: &T, attribute: &str) -> Result<String> {
    let lookup = item.id().registry_lookup();
    let line = format!("timeToCurrentFormat({lookup}.{attribute}, {lookup}.frameRate);");
    String::from_value(item.handle().session().evaluate(&line)?)
}

fn write_in_current_format<T: Remote + ?Sized>(
    item: &T,
    attribute: &str,
    time: &str,
) -> Result<()> {
    let lookup = item.id().registry_lookup();
    let line = format!(
        "{lookup}.{attribute} = currentFormatToTime({}, {lookup}.frameRate);",
        quote(time)
    );
    item.handle().session().evaluate(&line)?;
    Ok(())
}

fn check_guide_index<T: ItemLike + ?Sized>(item: &T, index: usize) -> Result<()> {
    let count = item.num_guides()?;
    if index < count {
        Ok(())
    } else {
        Err(BridgeError::IndexOutOfRange {
            index: index as isize,
            length: Some(count),
        })
    }
}

/// Behaviour shared by every Project panel entry
pub trait ItemLike: Remote {
    fn comment(&self) -> Result<String> {
        self.get("comment")
    }

    fn set_comment(&self, comment: &str) -> Result<()> {
        self.set("comment", &comment)
    }

    /// Host-assigned numeric id, stable for the life of the project
    fn item_id(&self) -> Result<i64> {
        self.get("id")
    }

    /// Label colour name
    fn label(&self) -> Result<&'static str> {
        self.get_enum("label", &LABEL_COLOR)
    }

    fn set_label(&self, label: &str) -> Result<()> {
        self.set_enum("label", &LABEL_COLOR, label)
    }

    fn name(&self) -> Result<String> {
        self.get("name")
    }

    fn set_name(&self, name: &str) -> Result<()> {
        self.set("name", &name)
    }

    fn parent_folder(&self) -> Result<Option<FolderItem>> {
        self.get_object("parentFolder")
    }

    fn set_parent_folder(&self, folder: &FolderItem) -> Result<()> {
        self.set("parentFolder", folder)
    }

    fn selected(&self) -> Result<bool> {
        self.get("selected")
    }

    fn set_selected(&self, selected: bool) -> Result<()> {
        self.set("selected", &selected)
    }

    /// Type as shown in the Project panel, e.g. "Composition"
    fn type_name(&self) -> Result<String> {
        self.get("typeName")
    }

    fn num_guides(&self) -> Result<usize> {
        self.get("guides.length")
    }

    /// Every ruler guide, three round trips each
    fn guides(&self) -> Result<Vec<Guide>> {
        (0..self.num_guides()?)
            .map(|i| {
                Ok(Guide {
                    orientation: self.get(&format!("guides[{i}].orientationType"))?,
                    position_type: self.get(&format!("guides[{i}].positionType"))?,
                    position: self.get(&format!("guides[{i}].position"))?,
                })
            })
            .collect()
    }

    /// Add a guide; returns its index
    fn add_guide(&self, orientation: i64, position: i64) -> Result<i64> {
        self.invoke("addGuide", &[&orientation, &position])
    }

    /// Move the guide at a 0-based index
    fn set_guide(&self, position: i64, index: usize) -> Result<()> {
        check_guide_index(self, index)?;
        self.invoke::<Option<bool>>("setGuide", &[&position, &index])?;
        Ok(())
    }

    fn remove_guide(&self, index: usize) -> Result<()> {
        check_guide_index(self, index)?;
        self.invoke::<Option<bool>>("removeGuide", &[&index])?;
        Ok(())
    }

    /// Delete the item; folders take their contents with them
    fn remove(&self) -> Result<()> {
        self.invoke::<Option<bool>>("remove", &[])?;
        Ok(())
    }

    /// Duplicate through the Edit menu, which acts on the selection
    fn duplicate(&self) -> Result<()> {
        self.set_selected(true)?;
        self.handle()
            .session()
            .application()?
            .execute_command(COMMAND_DUPLICATE)
    }
}

/// Behaviour shared by compositions and footage
pub trait AvItemLike: ItemLike {
    fn duration(&self) -> Result<f64> {
        self.get("duration")
    }

    fn set_duration(&self, seconds: f64) -> Result<()> {
        self.set("duration", &seconds)
    }

    fn footage_missing(&self) -> Result<bool> {
        self.get("footageMissing")
    }

    fn frame_duration(&self) -> Result<f64> {
        self.get("frameDuration")
    }

    fn set_frame_duration(&self, seconds: f64) -> Result<()> {
        self.set("frameDuration", &seconds)
    }

    fn frame_rate(&self) -> Result<f64> {
        self.get("frameRate")
    }

    fn set_frame_rate(&self, fps: f64) -> Result<()> {
        check_range("frameRate", fps, 1.0..=999.0)?;
        self.set("frameRate", &fps)
    }

    fn has_audio(&self) -> Result<bool> {
        self.get("hasAudio")
    }

    fn has_video(&self) -> Result<bool> {
        self.get("hasVideo")
    }

    fn width(&self) -> Result<u32> {
        self.get("width")
    }

    fn set_width(&self, width: u32) -> Result<()> {
        check_range("width", width, 4..=30000)?;
        self.set("width", &width)
    }

    fn height(&self) -> Result<u32> {
        self.get("height")
    }

    fn set_height(&self, height: u32) -> Result<()> {
        check_range("height", height, 4..=30000)?;
        self.set("height", &height)
    }

    fn pixel_aspect(&self) -> Result<f64> {
        self.get("pixelAspect")
    }

    fn set_pixel_aspect(&self, aspect: f64) -> Result<()> {
        check_range("pixelAspect", aspect, 0.01..=100.0)?;
        self.set("pixelAspect", &aspect)
    }

    fn is_media_replacement_compatible(&self) -> Result<bool> {
        self.get("isMediaReplacementCompatible")
    }

    fn proxy_source(&self) -> Result<Option<FootageSource>> {
        self.get_dyn("proxySource")
    }

    /// Current time of the item in seconds
    fn time(&self) -> Result<f64> {
        self.get("time")
    }

    fn set_time(&self, seconds: f64) -> Result<()> {
        self.set("time", &seconds)
    }

    /// Current time formatted per the project's time display settings
    fn time_in_current_format(&self) -> Result<String> {
        read_in_current_format(self, "time")
    }

    /// Set the current time from text in the project's time display format
    fn set_time_in_current_format(&self, time: &str) -> Result<()> {
        write_in_current_format(self, "time", time)
    }

    fn duration_in_current_format(&self) -> Result<String> {
        read_in_current_format(self, "duration")
    }

    fn set_duration_in_current_format(&self, duration: &str) -> Result<()> {
        write_in_current_format(self, "duration", duration)
    }

    /// Compositions that use this item
    fn used_in(&self) -> Result<Vec<CompItem>> {
        self.get_dyn_list("usedIn")
    }

    fn use_proxy(&self) -> Result<bool> {
        self.get("useProxy")
    }

    fn set_use_proxy(&self, value: bool) -> Result<()> {
        self.set("useProxy", &value)
    }

    fn set_proxy(&self, path: &str) -> Result<()> {
        let file = File::from_path(self.handle().session(), path)?;
        self.invoke::<Option<bool>>("setProxy", &[&file])?;
        Ok(())
    }

    fn set_proxy_to_none(&self) -> Result<()> {
        self.invoke::<Option<bool>>("setProxyToNone", &[])?;
        Ok(())
    }

    fn set_proxy_with_sequence(&self, path: &str, force_alphabetical: bool) -> Result<()> {
        let file = File::from_path(self.handle().session(), path)?;
        self.invoke::<Option<bool>>("setProxyWithSequence", &[&file, &force_alphabetical])?;
        Ok(())
    }

    fn set_proxy_with_solid(
        &self,
        color: [f64; 3],
        name: &str,
        width: u32,
        height: u32,
        pixel_aspect: f64,
    ) -> Result<()> {
        self.invoke::<Option<bool>>(
            "setProxyWithSolid",
            &[&color, &name, &width, &height, &pixel_aspect],
        )?;
        Ok(())
    }

    fn set_proxy_with_placeholder(
        &self,
        name: &str,
        width: u32,
        height: u32,
        frame_rate: f64,
        duration: f64,
    ) -> Result<()> {
        self.invoke::<Option<bool>>(
            "setProxyWithPlaceholder",
            &[&name, &width, &height, &frame_rate, &duration],
        )?;
        Ok(())
    }
}

impl ItemLike for CompItem {}
impl ItemLike for FolderItem {}
impl ItemLike for FootageItem {}
impl ItemLike for Item {}
impl ItemLike for AvItem {}

impl AvItemLike for CompItem {}

/// Footage timing comes from its source, and only solids can be resized
impl AvItemLike for FootageItem {
    fn set_duration(&self, _seconds: f64) -> Result<()> {
        Err(BridgeError::validation(
            "footage duration comes from its source; only compositions can be changed",
        ))
    }

    fn set_duration_in_current_format(&self, _duration: &str) -> Result<()> {
        Err(BridgeError::validation(
            "footage duration comes from its source; only compositions can be changed",
        ))
    }

    fn set_frame_duration(&self, _seconds: f64) -> Result<()> {
        Err(BridgeError::validation(
            "set the conform frame rate on the footage source instead of the frame duration",
        ))
    }

    fn set_frame_rate(&self, _fps: f64) -> Result<()> {
        Err(BridgeError::validation(
            "set the conform frame rate on the footage source instead of the frame rate",
        ))
    }

    fn set_width(&self, width: u32) -> Result<()> {
        self.require_solid("width")?;
        check_range("width", width, 4..=30000)?;
        self.set("width", &width)
    }

    fn set_height(&self, height: u32) -> Result<()> {
        self.require_solid("height")?;
        check_range("height", height, 4..=30000)?;
        self.set("height", &height)
    }
}

impl AvItemLike for AvItem {
    fn set_duration(&self, seconds: f64) -> Result<()> {
        match self {
            AvItem::Comp(comp) => comp.set_duration(seconds),
            AvItem::Footage(footage) => footage.set_duration(seconds),
        }
    }

    fn set_duration_in_current_format(&self, duration: &str) -> Result<()> {
        match self {
            AvItem::Comp(comp) => comp.set_duration_in_current_format(duration),
            AvItem::Footage(footage) => footage.set_duration_in_current_format(duration),
        }
    }

    fn set_frame_duration(&self, seconds: f64) -> Result<()> {
        match self {
            AvItem::Comp(comp) => comp.set_frame_duration(seconds),
            AvItem::Footage(footage) => footage.set_frame_duration(seconds),
        }
    }

    fn set_frame_rate(&self, fps: f64) -> Result<()> {
        match self {
            AvItem::Comp(comp) => comp.set_frame_rate(fps),
            AvItem::Footage(footage) => footage.set_frame_rate(fps),
        }
    }

    fn set_width(&self, width: u32) -> Result<()> {
        match self {
            AvItem::Comp(comp) => comp.set_width(width),
            AvItem::Footage(footage) => footage.set_width(width),
        }
    }

    fn set_height(&self, height: u32) -> Result<()> {
        match self {
            AvItem::Comp(comp) => comp.set_height(height),
            AvItem::Footage(footage) => footage.set_height(height),
        }
    }
}

impl CompItem {
    pub fn layers(&self) -> Result<LayerCollection> {
        require(self.get_object("layers")?, "the layer collection")
    }

    pub fn num_layers(&self) -> Result<usize> {
        self.get("numLayers")
    }

    /// Layer at a 0-based position; negative positions count from the end
    pub fn layer(&self, index: isize) -> Result<Layer> {
        let host = host_index(index, || self.num_layers())?;
        self.invoke_dyn("layer", &[&host])?
            .ok_or(BridgeError::IndexOutOfRange {
                index,
                length: None,
            })
    }

    pub fn layer_by_name(&self, name: &str) -> Result<Option<Layer>> {
        self.invoke_dyn("layer", &[&name])
    }

    /// The layer `offset` positions above or below `other`
    pub fn layer_relative(&self, other: &Layer, offset: i64) -> Result<Option<Layer>> {
        self.invoke_dyn("layer", &[other, &offset])
    }

    pub fn active_camera(&self) -> Result<Option<CameraLayer>> {
        self.get_object("activeCamera")
    }

    pub fn bg_color(&self) -> Result<[f64; 3]> {
        rgb(self.get("bgColor")?)
    }

    pub fn set_bg_color(&self, color: [f64; 3]) -> Result<()> {
        for channel in color {
            check_range("bgColor", channel, 0.0..=1.0)?;
        }
        self.set("bgColor", &color)
    }

    pub fn set_bg_color_hex(&self, hex: &str) -> Result<()> {
        self.set_bg_color(crate::codec::hex_to_rgb(hex)?)
    }

    pub fn display_start_time(&self) -> Result<f64> {
        self.get("displayStartTime")
    }

    pub fn set_display_start_time(&self, seconds: f64) -> Result<()> {
        self.set("displayStartTime", &seconds)
    }

    pub fn draft_3d(&self) -> Result<bool> {
        self.get("draft3d")
    }

    pub fn set_draft_3d(&self, value: bool) -> Result<()> {
        self.set("draft3d", &value)
    }

    pub fn drop_frame(&self) -> Result<bool> {
        self.get("dropFrame")
    }

    pub fn set_drop_frame(&self, value: bool) -> Result<()> {
        self.set("dropFrame", &value)
    }

    pub fn frame_blending(&self) -> Result<bool> {
        self.get("frameBlending")
    }

    pub fn set_frame_blending(&self, value: bool) -> Result<()> {
        self.set("frameBlending", &value)
    }

    pub fn hide_shy_layers(&self) -> Result<bool> {
        self.get("hideShyLayers")
    }

    pub fn set_hide_shy_layers(&self, value: bool) -> Result<()> {
        self.set("hideShyLayers", &value)
    }

    pub fn motion_blur(&self) -> Result<bool> {
        self.get("motionBlur")
    }

    pub fn set_motion_blur(&self, value: bool) -> Result<()> {
        self.set("motionBlur", &value)
    }

    pub fn motion_blur_adaptive_sample_limit(&self) -> Result<i64> {
        self.get("motionBlurAdaptiveSampleLimit")
    }

    pub fn set_motion_blur_adaptive_sample_limit(&self, limit: i64) -> Result<()> {
        check_range("motionBlurAdaptiveSampleLimit", limit, 16..=256)?;
        self.set("motionBlurAdaptiveSampleLimit", &limit)
    }

    pub fn motion_blur_samples_per_frame(&self) -> Result<i64> {
        self.get("motionBlurSamplesPerFrame")
    }

    pub fn set_motion_blur_samples_per_frame(&self, samples: i64) -> Result<()> {
        check_range("motionBlurSamplesPerFrame", samples, 2..=64)?;
        self.set("motionBlurSamplesPerFrame", &samples)
    }

    pub fn preserve_nested_frame_rate(&self) -> Result<bool> {
        self.get("preserveNestedFrameRate")
    }

    pub fn set_preserve_nested_frame_rate(&self, value: bool) -> Result<()> {
        self.set("preserveNestedFrameRate", &value)
    }

    pub fn preserve_nested_resolution(&self) -> Result<bool> {
        self.get("preserveNestedResolution")
    }

    pub fn set_preserve_nested_resolution(&self, value: bool) -> Result<()> {
        self.set("preserveNestedResolution", &value)
    }

    pub fn renderer(&self) -> Result<String> {
        self.get("renderer")
    }

    /// Switch the 3D renderer; must be one of [`CompItem::renderers`]
    pub fn set_renderer(&self, renderer: &str) -> Result<()> {
        if !self.renderers()?.iter().any(|r| r == renderer) {
            return Err(BridgeError::validation(format!(
                "'{renderer}' is not a valid renderer"
            )));
        }
        self.set("renderer", &renderer)
    }

    pub fn renderers(&self) -> Result<Vec<String>> {
        self.get("renderers")
    }

    pub fn resolution_factor(&self) -> Result<[i64; 2]> {
        let factor: Vec<i64> = self.get("resolutionFactor")?;
        match factor.as_slice() {
            [x, y] => Ok([*x, *y]),
            _ => Err(BridgeError::unexpected_value(
                "a pair of factors",
                format!("{} values", factor.len()),
            )),
        }
    }

    pub fn set_resolution_factor(&self, factor: [i64; 2]) -> Result<()> {
        for f in factor {
            check_range("resolutionFactor", f, 1..=99)?;
        }
        self.set("resolutionFactor", &factor)
    }

    pub fn selected_layers(&self) -> Result<Vec<Layer>> {
        self.get_dyn_list("selectedLayers")
    }

    pub fn selected_properties(&self) -> Result<Vec<PropertyNode>> {
        self.get_dyn_list("selectedProperties")
    }

    pub fn shutter_angle(&self) -> Result<i64> {
        self.get("shutterAngle")
    }

    pub fn set_shutter_angle(&self, angle: i64) -> Result<()> {
        check_range("shutterAngle", angle, 0..=720)?;
        self.set("shutterAngle", &angle)
    }

    pub fn shutter_phase(&self) -> Result<i64> {
        self.get("shutterPhase")
    }

    pub fn set_shutter_phase(&self, phase: i64) -> Result<()> {
        check_range("shutterPhase", phase, -360..=360)?;
        self.set("shutterPhase", &phase)
    }

    pub fn work_area_start(&self) -> Result<f64> {
        self.get("workAreaStart")
    }

    pub fn set_work_area_start(&self, seconds: f64) -> Result<()> {
        self.set("workAreaStart", &seconds)
    }

    pub fn work_area_duration(&self) -> Result<f64> {
        self.get("workAreaDuration")
    }

    pub fn set_work_area_duration(&self, seconds: f64) -> Result<()> {
        self.set("workAreaDuration", &seconds)
    }

    pub fn work_area_start_in_current_format(&self) -> Result<String> {
        read_in_current_format(self, "workAreaStart")
    }

    pub fn set_work_area_start_in_current_format(&self, start: &str) -> Result<()> {
        write_in_current_format(self, "workAreaStart", start)
    }

    pub fn work_area_duration_in_current_format(&self) -> Result<String> {
        read_in_current_format(self, "workAreaDuration")
    }

    pub fn set_work_area_duration_in_current_format(&self, duration: &str) -> Result<()> {
        write_in_current_format(self, "workAreaDuration", duration)
    }

    /// The composition's marker track
    pub fn marker_property(&self) -> Result<Property> {
        require(self.get_object("markerProperty")?, "the marker property")
    }

    pub fn open_in_essential_graphics(&self) -> Result<()> {
        self.invoke::<Option<bool>>("openInEssentialGraphics", &[])?;
        Ok(())
    }

    /// Open the composition in a viewer and focus it
    pub fn open_in_viewer(&self) -> Result<Option<Viewer>> {
        self.invoke_object("openInViewer", &[])
    }
}

impl FolderItem {
    pub fn items(&self) -> Result<ItemCollection> {
        require(self.get_object("items")?, "the folder item collection")
    }

    pub fn num_items(&self) -> Result<usize> {
        self.get("numItems")
    }

    /// Top-level item at a 0-based position; negative positions count from the end
    pub fn item(&self, index: isize) -> Result<Item> {
        let host = host_index(index, || self.num_items())?;
        self.invoke_dyn("item", &[&host])?
            .ok_or(BridgeError::IndexOutOfRange {
                index,
                length: None,
            })
    }

    pub fn compositions(&self) -> Result<Vec<Item>> {
        items_of_type(&self.items()?, CompItem::TYPE_NAME)
    }

    pub fn footages(&self) -> Result<Vec<Item>> {
        items_of_type(&self.items()?, FootageItem::TYPE_NAME)
    }

    pub fn folders(&self) -> Result<Vec<Item>> {
        items_of_type(&self.items()?, FolderItem::TYPE_NAME)
    }
}

impl FootageItem {
    pub fn main_source(&self) -> Result<FootageSource> {
        require(self.get_dyn("mainSource")?, "the footage source")
    }

    pub fn file(&self) -> Result<Option<File>> {
        self.get_object("file")
    }

    fn require_solid(&self, property: &str) -> Result<()> {
        match self.main_source()? {
            FootageSource::Solid(_) => Ok(()),
            other => Err(BridgeError::validation(format!(
                "'{property}' can only be set on solids, this footage comes from a {}",
                other.object_type()
            ))),
        }
    }

    /// Point the footage at a different file
    pub fn replace(&self, path: &str) -> Result<()> {
        let file = File::from_path(self.handle().session(), path)?;
        self.invoke::<Option<bool>>("replace", &[&file])?;
        Ok(())
    }

    pub fn replace_with_sequence(&self, path: &str, force_alphabetical: bool) -> Result<()> {
        let file = File::from_path(self.handle().session(), path)?;
        self.invoke::<Option<bool>>("replaceWithSequence", &[&file, &force_alphabetical])?;
        Ok(())
    }

    /// Swap the source for a placeholder. A text duration is read in the
    /// project's time display format at `frame_rate`.
    pub fn replace_with_placeholder<'a>(
        &self,
        name: &str,
        width: u32,
        height: u32,
        frame_rate: f64,
        duration: impl Into<TimeSpan<'a>>,
    ) -> Result<()> {
        let duration = duration.into().seconds_at(frame_rate);
        self.invoke::<Option<bool>>(
            "replaceWithPlaceholder",
            &[&name, &width, &height, &frame_rate, &Raw(&duration)],
        )?;
        Ok(())
    }

    pub fn replace_with_solid(
        &self,
        color: [f64; 3],
        name: &str,
        width: u32,
        height: u32,
        pixel_aspect: f64,
    ) -> Result<()> {
        self.invoke::<Option<bool>>(
            "replaceWithSolid",
            &[&color, &name, &width, &height, &pixel_aspect],
        )?;
        Ok(())
    }
}

impl RemoteCollection for ItemCollection {
    type Item = Item;

    const LENGTH_PROPERTY: &'static str = "length";

    fn element(&self, value: Value) -> Result<Option<Item>> {
        self.handle().bind_dyn(value)
    }
}

impl ItemCollection {
    /// Add a composition. Dimensions and timing are checked against the
    /// application's limits before anything is sent.
    pub fn add_comp(
        &self,
        name: &str,
        width: u32,
        height: u32,
        pixel_aspect: f64,
        duration: f64,
        frame_rate: f64,
    ) -> Result<CompItem> {
        check_range("width", width, 4..=30000)?;
        check_range("height", height, 4..=30000)?;
        check_range("pixelAspect", pixel_aspect, 0.01..=100.0)?;
        check_range("duration", duration, 0.0..=10800.0)?;
        check_range("frameRate", frame_rate, 1.0..=999.0)?;
        let comp = self.invoke_object(
            "addComp",
            &[&name, &width, &height, &pixel_aspect, &duration, &frame_rate],
        )?;
        require(comp, "the new composition")
    }

    pub fn add_folder(&self, name: &str) -> Result<FolderItem> {
        require(self.invoke_object("addFolder", &[&name])?, "the new folder")
    }
}

/// Items of one runtime type, in collection order
pub(super) fn items_of_type(items: &ItemCollection, object_type: &str) -> Result<Vec<Item>> {
    let mut matching = Vec::new();
    for item in items.iter() {
        let item = item?;
        if item.object_type() == object_type {
            matching.push(item);
        }
    }
    Ok(matching)
}
