use super::{
    check_range,
    item::{AvItem, CompItem},
    property::{Property, PropertyGroup, PropertyGroupLike, PropertyLike},
    require,
};
use crate::{
    codec::Value,
    collection::{host_index, HostIndex, RemoteCollection},
    enums::{BLENDING_MODE, FRAME_BLENDING_TYPE, LABEL_COLOR},
    error::{BridgeError, Result},
    proxy::{remote_object, Remote},
};

remote_object! {
    /// A layer backed by footage, a solid, a null or a nested composition
    AvLayer => "AVLayer"
}

remote_object! {
    ShapeLayer => "ShapeLayer"
}

remote_object! {
    TextLayer => "TextLayer"
}

remote_object! {
    CameraLayer => "CameraLayer"
}

remote_object! {
    LightLayer => "LightLayer"
}

remote_object! {
    /// The layers of a composition
    LayerCollection => "LayerCollection"
}

family! {
    /// Any layer of a composition
    Layer, "layer" {
        Av(AvLayer) <= AvLayer,
        Shape(ShapeLayer) <= ShapeLayer,
        Text(TextLayer) <= TextLayer,
        Camera(CameraLayer) <= CameraLayer,
        Light(LightLayer) <= LightLayer,
    }
}

/// Behaviour shared by every layer. A layer is also the root property group
/// of its own property tree.
pub trait LayerLike: PropertyGroupLike {
    fn comment(&self) -> Result<String> {
        self.get("comment")
    }

    fn set_comment(&self, comment: &str) -> Result<()> {
        self.set("comment", &comment)
    }

    fn containing_comp(&self) -> Result<CompItem> {
        require(self.get_object("containingComp")?, "the containing composition")
    }

    /// Host-assigned numeric id, unique within the project
    fn layer_id(&self) -> Result<i64> {
        self.get("id")
    }

    /// 1-based position in the composition, as the host reports it
    fn index(&self) -> Result<i64> {
        self.get("index")
    }

    fn label(&self) -> Result<&'static str> {
        self.get_enum("label", &LABEL_COLOR)
    }

    fn set_label(&self, label: &str) -> Result<()> {
        self.set_enum("label", &LABEL_COLOR, label)
    }

    fn in_point(&self) -> Result<f64> {
        self.get("inPoint")
    }

    fn set_in_point(&self, seconds: f64) -> Result<()> {
        self.set("inPoint", &seconds)
    }

    fn out_point(&self) -> Result<f64> {
        self.get("outPoint")
    }

    fn set_out_point(&self, seconds: f64) -> Result<()> {
        self.set("outPoint", &seconds)
    }

    fn start_time(&self) -> Result<f64> {
        self.get("startTime")
    }

    fn set_start_time(&self, seconds: f64) -> Result<()> {
        self.set("startTime", &seconds)
    }

    fn locked(&self) -> Result<bool> {
        self.get("locked")
    }

    fn set_locked(&self, value: bool) -> Result<()> {
        self.set("locked", &value)
    }

    fn shy(&self) -> Result<bool> {
        self.get("shy")
    }

    fn set_shy(&self, value: bool) -> Result<()> {
        self.set("shy", &value)
    }

    fn solo(&self) -> Result<bool> {
        self.get("solo")
    }

    fn set_solo(&self, value: bool) -> Result<()> {
        self.set("solo", &value)
    }

    fn has_video(&self) -> Result<bool> {
        self.get("hasVideo")
    }

    fn null_layer(&self) -> Result<bool> {
        self.get("nullLayer")
    }

    fn parent(&self) -> Result<Option<Layer>> {
        self.get_dyn("parent")
    }

    fn set_parent(&self, parent: Option<&Layer>) -> Result<()> {
        self.set("parent", &parent)
    }

    fn move_to_beginning(&self) -> Result<()> {
        self.invoke::<Option<bool>>("moveToBeginning", &[])?;
        Ok(())
    }

    fn move_to_end(&self) -> Result<()> {
        self.invoke::<Option<bool>>("moveToEnd", &[])?;
        Ok(())
    }
}

/// Behaviour of layers that render pixels
pub trait AvLayerLike: LayerLike {
    fn transform_property(&self, name: &str) -> Result<Property> {
        let value = self.handle().eval(&format!("transform.{name}"))?;
        require(self.handle().bind(value)?, name)
    }

    fn anchor_point(&self) -> Result<Property> {
        self.transform_property("anchorPoint")
    }

    fn opacity(&self) -> Result<Property> {
        self.transform_property("opacity")
    }

    fn position(&self) -> Result<Property> {
        self.transform_property("position")
    }

    fn rotation(&self) -> Result<Property> {
        self.transform_property("rotation")
    }

    fn scale(&self) -> Result<Property> {
        self.transform_property("scale")
    }

    fn x_rotation(&self) -> Result<Property> {
        self.transform_property("xRotation")
    }

    fn y_rotation(&self) -> Result<Property> {
        self.transform_property("yRotation")
    }

    /// The Effects group of this layer
    fn effects(&self) -> Result<PropertyGroup> {
        let value = self
            .handle()
            .eval(&crate::codec::call("property", &[&"ADBE Effect Parade"]))?;
        require(self.handle().bind(value)?, "the effects group")
    }

    fn adjustment_layer(&self) -> Result<bool> {
        self.get("adjustmentLayer")
    }

    fn set_adjustment_layer(&self, value: bool) -> Result<()> {
        self.set("adjustmentLayer", &value)
    }

    fn audio_active(&self) -> Result<bool> {
        self.get("audioActive")
    }

    fn audio_enabled(&self) -> Result<bool> {
        self.get("audioEnabled")
    }

    fn set_audio_enabled(&self, value: bool) -> Result<()> {
        self.set("audioEnabled", &value)
    }

    fn blending_mode(&self) -> Result<&'static str> {
        self.get_enum("blendingMode", &BLENDING_MODE)
    }

    fn set_blending_mode(&self, label: &str) -> Result<()> {
        self.set_enum("blendingMode", &BLENDING_MODE, label)
    }

    fn can_set_collapse_transformation(&self) -> Result<bool> {
        self.get("canSetCollapseTransformation")
    }

    fn collapse_transformation(&self) -> Result<bool> {
        self.get("collapseTransformation")
    }

    fn set_collapse_transformation(&self, value: bool) -> Result<()> {
        self.set("collapseTransformation", &value)
    }

    fn effects_active(&self) -> Result<bool> {
        self.get("effectsActive")
    }

    fn set_effects_active(&self, value: bool) -> Result<()> {
        self.set("effectsActive", &value)
    }

    fn frame_blending_type(&self) -> Result<&'static str> {
        self.get_enum("frameBlendingType", &FRAME_BLENDING_TYPE)
    }

    fn set_frame_blending_type(&self, label: &str) -> Result<()> {
        self.set_enum("frameBlendingType", &FRAME_BLENDING_TYPE, label)
    }

    fn guide_layer(&self) -> Result<bool> {
        self.get("guideLayer")
    }

    fn has_track_matte(&self) -> Result<bool> {
        self.get("hasTrackMatte")
    }

    fn is_track_matte(&self) -> Result<bool> {
        self.get("isTrackMatte")
    }

    fn motion_blur(&self) -> Result<bool> {
        self.get("motionBlur")
    }

    fn set_motion_blur(&self, value: bool) -> Result<()> {
        self.set("motionBlur", &value)
    }

    fn preserve_transparency(&self) -> Result<bool> {
        self.get("preserveTransparency")
    }

    fn set_preserve_transparency(&self, value: bool) -> Result<()> {
        self.set("preserveTransparency", &value)
    }

    fn three_d_layer(&self) -> Result<bool> {
        self.get("threeDLayer")
    }

    fn set_three_d_layer(&self, value: bool) -> Result<()> {
        self.set("threeDLayer", &value)
    }

    /// The item this layer renders; `None` for layers without one, such as text
    fn source(&self) -> Result<Option<AvItem>> {
        self.get_dyn("source")
    }

    fn width(&self) -> Result<f64> {
        self.get("width")
    }

    fn height(&self) -> Result<f64> {
        self.get("height")
    }
}

macro_rules! layer_capabilities {
    ($($ty:ty),*) => {
        $(
            impl PropertyLike for $ty {}
            impl PropertyGroupLike for $ty {}
            impl LayerLike for $ty {}
        )*
    };
}

layer_capabilities!(AvLayer, ShapeLayer, TextLayer, CameraLayer, LightLayer, Layer);

impl AvLayerLike for AvLayer {}
impl AvLayerLike for ShapeLayer {}
impl AvLayerLike for TextLayer {}

impl TextLayer {
    /// The Source Text property
    pub fn source_text(&self) -> Result<Property> {
        let value = self.handle().eval("text.sourceText")?;
        require(self.handle().bind(value)?, "the source text property")
    }
}

impl RemoteCollection for LayerCollection {
    type Item = Layer;

    const LENGTH_PROPERTY: &'static str = "length";

    fn element(&self, value: Value) -> Result<Option<Layer>> {
        self.handle().bind_dyn(value)
    }
}

impl LayerCollection {
    /// Add a layer showing `item`, optionally limited to `duration` seconds
    pub fn add(&self, item: &AvItem, duration: Option<f64>) -> Result<Layer> {
        let layer = match duration {
            Some(duration) => self.invoke_dyn("add", &[item, &duration])?,
            None => self.invoke_dyn("add", &[item])?,
        };
        require(layer, "the new layer")
    }

    pub fn add_box_text(&self, width: u32, height: u32) -> Result<TextLayer> {
        require(
            self.invoke_object("addBoxText", &[&[width, height]])?,
            "the new text layer",
        )
    }

    pub fn add_camera(&self, name: &str, center_point: [f64; 2]) -> Result<CameraLayer> {
        require(
            self.invoke_object("addCamera", &[&name, &center_point])?,
            "the new camera",
        )
    }

    pub fn add_light(&self, name: &str, center_point: [f64; 2]) -> Result<LightLayer> {
        require(
            self.invoke_object("addLight", &[&name, &center_point])?,
            "the new light",
        )
    }

    /// Add a null object, spanning the composition unless `duration` is given
    pub fn add_null(&self, duration: Option<f64>) -> Result<AvLayer> {
        let layer = match duration {
            Some(duration) => self.invoke_object("addNull", &[&duration])?,
            None => self.invoke_object("addNull", &[])?,
        };
        require(layer, "the new null")
    }

    pub fn add_shape(&self) -> Result<ShapeLayer> {
        require(self.invoke_object("addShape", &[])?, "the new shape layer")
    }

    pub fn add_solid(
        &self,
        color: [f64; 3],
        name: &str,
        width: u32,
        height: u32,
        pixel_aspect: f64,
    ) -> Result<AvLayer> {
        for channel in color {
            check_range("color", channel, 0.0..=1.0)?;
        }
        check_range("width", width, 4..=30000)?;
        check_range("height", height, 4..=30000)?;
        require(
            self.invoke_object(
                "addSolid",
                &[&color, &name, &width, &height, &pixel_aspect],
            )?,
            "the new solid",
        )
    }

    pub fn add_text(&self, text: &str) -> Result<TextLayer> {
        require(self.invoke_object("addText", &[&text])?, "the new text layer")
    }

    /// Topmost layer with the given name
    pub fn by_name(&self, name: &str) -> Result<Option<Layer>> {
        self.invoke_dyn("byName", &[&name])
    }

    /// Move the layers at the given 0-based positions into a new composition.
    ///
    /// Keeping attributes on the original layer is only possible for a single
    /// layer.
    pub fn precompose(
        &self,
        indices: &[isize],
        name: &str,
        move_attributes: bool,
    ) -> Result<CompItem> {
        if indices.is_empty() {
            return Err(BridgeError::validation("precompose needs at least one layer"));
        }
        if indices.len() != 1 && !move_attributes {
            return Err(BridgeError::validation(
                "attributes must move when precomposing more than one layer",
            ));
        }

        let mut length = None;
        let host = indices
            .iter()
            .map(|&index| {
                host_index(index, || match length {
                    Some(len) => Ok(len),
                    None => {
                        let len = self.len()?;
                        length = Some(len);
                        Ok(len)
                    }
                })
            })
            .collect::<Result<Vec<HostIndex>>>()?;

        let comp = self.invoke_object("precompose", &[&host, &name, &move_attributes])?;
        require(comp, "the new composition")
    }
}
