use super::{layer::Layer, require, rgb};
use crate::{
    codec::{ToExtend, Value},
    collection::host_index,
    dispatch::AnyObject,
    error::{BridgeError, Result},
    proxy::{remote_object, Handle, Remote},
};

remote_object! {
    /// A leaf property holding a value, e.g. Opacity
    Property => "Property"
}

remote_object! {
    /// A named group of properties, e.g. Transform or an effect
    PropertyGroup => "PropertyGroup"
}

remote_object! {
    /// A layer mask
    MaskPropertyGroup => "MaskPropertyGroup"
}

/// Any node of a layer's property tree, the layer itself included
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyNode {
    Property(Property),
    Group(PropertyGroup),
    MaskGroup(MaskPropertyGroup),
    Layer(Layer),
}

impl Remote for PropertyNode {
    fn handle(&self) -> &Handle {
        match self {
            PropertyNode::Property(p) => p.handle(),
            PropertyNode::Group(g) => g.handle(),
            PropertyNode::MaskGroup(m) => m.handle(),
            PropertyNode::Layer(l) => l.handle(),
        }
    }
}

impl ToExtend for PropertyNode {
    fn to_extend(&self) -> String {
        self.handle().to_extend()
    }
}

impl TryFrom<AnyObject> for PropertyNode {
    type Error = BridgeError;

    fn try_from(any: AnyObject) -> Result<Self> {
        match any {
            AnyObject::Property(p) => Ok(PropertyNode::Property(p)),
            AnyObject::PropertyGroup(g) => Ok(PropertyNode::Group(g)),
            AnyObject::MaskPropertyGroup(m) => Ok(PropertyNode::MaskGroup(m)),
            other => {
                let actual = other.object_type().to_string();
                Layer::try_from(other)
                    .map(PropertyNode::Layer)
                    .map_err(|_| BridgeError::unexpected_type("property", &actual))
            }
        }
    }
}

/// Selects a child property by 0-based position or by name / match name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyKey<'a> {
    Index(isize),
    Name(&'a str),
}

impl From<isize> for PropertyKey<'_> {
    fn from(index: isize) -> Self {
        PropertyKey::Index(index)
    }
}

impl From<i32> for PropertyKey<'_> {
    fn from(index: i32) -> Self {
        PropertyKey::Index(index as isize)
    }
}

impl<'a> From<&'a str> for PropertyKey<'a> {
    fn from(name: &'a str) -> Self {
        PropertyKey::Name(name)
    }
}

/// Behaviour shared by every node of a property tree
pub trait PropertyLike: Remote {
    fn name(&self) -> Result<String> {
        self.get("name")
    }

    fn set_name(&self, name: &str) -> Result<()> {
        self.set("name", &name)
    }

    /// Language-independent identifier, e.g. "ADBE Opacity"
    fn match_name(&self) -> Result<String> {
        self.get("matchName")
    }

    fn active(&self) -> Result<bool> {
        self.get("active")
    }

    fn enabled(&self) -> Result<bool> {
        self.get("enabled")
    }

    fn set_enabled(&self, value: bool) -> Result<()> {
        self.set("enabled", &value)
    }

    fn can_set_enabled(&self) -> Result<bool> {
        self.get("canSetEnabled")
    }

    fn is_effect(&self) -> Result<bool> {
        self.get("isEffect")
    }

    fn is_mask(&self) -> Result<bool> {
        self.get("isMask")
    }

    fn is_modified(&self) -> Result<bool> {
        self.get("isModified")
    }

    fn selected(&self) -> Result<bool> {
        self.get("selected")
    }

    fn set_selected(&self, value: bool) -> Result<()> {
        self.set("selected", &value)
    }

    /// Levels between this node and its layer; 0 for the layer
    fn property_depth(&self) -> Result<i64> {
        self.get("propertyDepth")
    }

    /// 1-based position within the parent group, as the host reports it
    fn property_index(&self) -> Result<i64> {
        self.get("propertyIndex")
    }

    /// The enclosing group; `None` for a layer
    fn parent_property(&self) -> Result<Option<PropertyNode>> {
        self.get_dyn("parentProperty")
    }

    fn remove(&self) -> Result<()> {
        self.invoke::<Option<bool>>("remove", &[])?;
        Ok(())
    }
}

/// Behaviour of nodes that contain other properties
pub trait PropertyGroupLike: PropertyLike {
    fn num_properties(&self) -> Result<usize> {
        self.get("numProperties")
    }

    /// Child by 0-based position (negative counts from the end) or by name
    fn property<'a>(&self, key: impl Into<PropertyKey<'a>>) -> Result<Option<PropertyNode>> {
        match key.into() {
            PropertyKey::Index(index) => {
                let host = host_index(index, || self.num_properties())?;
                self.invoke_dyn("property", &[&host])
            }
            PropertyKey::Name(name) => self.invoke_dyn("property", &[&name]),
        }
    }

    /// Every direct child, one round trip each
    fn properties(&self) -> Result<Vec<PropertyNode>> {
        let count = self.num_properties()?;
        (0..count)
            .map(|i| {
                let index = i as isize;
                self.property(index)?.ok_or(BridgeError::IndexOutOfRange {
                    index,
                    length: Some(count),
                })
            })
            .collect()
    }

    fn can_add_property(&self, name: &str) -> Result<bool> {
        self.invoke("canAddProperty", &[&name])
    }

    /// Add a child by match name, e.g. an effect to the Effects group
    fn add_property(&self, name: &str) -> Result<PropertyNode> {
        require(self.invoke_dyn("addProperty", &[&name])?, "the new property")
    }
}

impl PropertyLike for Property {}
impl PropertyLike for PropertyGroup {}
impl PropertyLike for MaskPropertyGroup {}
impl PropertyLike for PropertyNode {}
impl PropertyGroupLike for PropertyGroup {}
impl PropertyGroupLike for MaskPropertyGroup {}

impl Property {
    pub fn value(&self) -> Result<Value> {
        self.get("value")
    }

    /// Set a static value. The value must have the same shape as the current
    /// one: numbers for numbers, arrays of the same length for arrays.
    pub fn set_value(&self, value: &Value) -> Result<()> {
        let current = self.value()?;
        if !same_shape(&current, value) {
            return Err(BridgeError::validation(format!(
                "'{}' holds {}, got {}",
                self.name()?,
                current.type_name(),
                value.type_name()
            )));
        }
        self.invoke::<Option<bool>>("setValue", &[value])?;
        Ok(())
    }

    pub fn value_at_time(&self, seconds: f64, pre_expression: bool) -> Result<Value> {
        self.invoke("valueAtTime", &[&seconds, &pre_expression])
    }

    pub fn set_value_at_time(&self, seconds: f64, value: &Value) -> Result<()> {
        self.invoke::<Option<bool>>("setValueAtTime", &[&seconds, value])?;
        Ok(())
    }

    pub fn num_keys(&self) -> Result<usize> {
        self.get("numKeys")
    }

    pub fn can_vary_over_time(&self) -> Result<bool> {
        self.get("canVaryOverTime")
    }

    pub fn expression(&self) -> Result<String> {
        self.get("expression")
    }

    pub fn set_expression(&self, expression: &str) -> Result<()> {
        self.set("expression", &expression)
    }

    pub fn expression_enabled(&self) -> Result<bool> {
        self.get("expressionEnabled")
    }

    pub fn expression_error(&self) -> Result<String> {
        self.get("expressionError")
    }
}

fn same_shape(current: &Value, new: &Value) -> bool {
    match (current, new) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => true,
        (Value::List(a), Value::List(b)) => a.len() == b.len(),
        (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
    }
}

impl MaskPropertyGroup {
    pub fn inverted(&self) -> Result<bool> {
        self.get("inverted")
    }

    pub fn set_inverted(&self, value: bool) -> Result<()> {
        self.set("inverted", &value)
    }

    pub fn locked(&self) -> Result<bool> {
        self.get("locked")
    }

    pub fn set_locked(&self, value: bool) -> Result<()> {
        self.set("locked", &value)
    }

    pub fn color(&self) -> Result<[f64; 3]> {
        rgb(self.get("color")?)
    }

    pub fn set_color(&self, color: [f64; 3]) -> Result<()> {
        for channel in color {
            super::check_range("color", channel, 0.0..=1.0)?;
        }
        self.set("color", &color)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        codec::ObjectDescriptor, proxy::RemoteObject, session::testing::MockTransport,
    };

    fn bind<T: RemoteObject>(type_name: &str) -> (T, MockTransport) {
        let (session, mock) = MockTransport::session();
        let object = T::from_handle(Handle::new(session, ObjectDescriptor::new(type_name, "p1")));
        (object, mock)
    }

    #[test]
    fn test_set_value_checks_shape() {
        let (property, mock) = bind::<Property>("Property");
        mock.respond("[960, 540]");
        mock.respond(r#""Position""#);
        assert!(matches!(
            property.set_value(&Value::List(vec![Value::Int(1)])),
            Err(BridgeError::DomainValidation(_))
        ));

        mock.respond("[960, 540]");
        property
            .set_value(&Value::List(vec![Value::Float(100.5), Value::Int(20)]))
            .unwrap();
        assert_eq!(
            mock.sent_lines().last().unwrap(),
            r#"$._pydobe["p1"].setValue([100.5, 20]);"#
        );
    }

    #[test]
    fn test_number_accepts_int_or_float() {
        assert!(same_shape(&Value::Int(100), &Value::Float(50.5)));
        assert!(!same_shape(&Value::Int(100), &Value::String("50".into())));
    }

    #[test]
    fn test_property_lookup_by_index_and_name() {
        let (group, mock) = bind::<PropertyGroup>("PropertyGroup");
        mock.respond_object("Property", "p2");
        let first = group.property(0).unwrap().unwrap();
        assert!(matches!(first, PropertyNode::Property(_)));

        mock.respond_object("MaskPropertyGroup", "p3");
        let mask = group.property("Mask 1").unwrap().unwrap();
        assert!(matches!(mask, PropertyNode::MaskGroup(_)));

        mock.respond("4");
        mock.respond_object("Property", "p4");
        let last = group.property(-1).unwrap().unwrap();
        assert!(matches!(last, PropertyNode::Property(_)));

        let position: isize = 1;
        mock.respond_object("Property", "p5");
        group.property(position).unwrap();

        assert_eq!(
            mock.sent_lines(),
            vec![
                r#"$._pydobe["p1"].property(1);"#,
                r#"$._pydobe["p1"].property("Mask 1");"#,
                r#"$._pydobe["p1"].numProperties;"#,
                r#"$._pydobe["p1"].property(4);"#,
                r#"$._pydobe["p1"].property(2);"#,
            ]
        );
    }

    #[test]
    fn test_parent_of_top_group_is_layer() {
        let (group, mock) = bind::<PropertyGroup>("PropertyGroup");
        mock.respond_object("TextLayer", "p2");
        let parent = group.parent_property().unwrap().unwrap();
        assert!(matches!(parent, PropertyNode::Layer(Layer::Text(_))));

        mock.respond_object("Project", "p3");
        assert!(matches!(
            group.parent_property(),
            Err(BridgeError::UnexpectedRemoteType { .. })
        ));
    }
}
