//! Proxy object base
//!
//! A [`Handle`] binds one host-registered object to the session it came from.
//! [`Remote`] is the minimal capability every proxy has (a handle, plus
//! property reads, writes and calls routed through it); [`RemoteObject`] adds
//! construction from a handle for concrete proxy types. Richer capability sets
//! (items, layers, properties, ...) are traits layered on top of [`Remote`].

use std::{fmt, sync::Arc};

use crate::{
    codec::{self, FromValue, ObjectDescriptor, RemoteId, ToExtend, Value},
    collection::HostIndex,
    dispatch::{self, AnyObject},
    enums::EnumTable,
    error::{BridgeError, Result},
    session::Session,
};

/// A host object registered under an identifier, bound to its session
#[derive(Clone)]
pub struct Handle {
    session: Arc<Session>,
    descriptor: ObjectDescriptor,
}

impl Handle {
    pub fn new(session: Arc<Session>, descriptor: ObjectDescriptor) -> Self {
        Self {
            session,
            descriptor,
        }
    }

    pub fn id(&self) -> &RemoteId {
        &self.descriptor.pydobe_id
    }

    /// Runtime type name as reported by the host's reflection
    pub fn object_type(&self) -> &str {
        &self.descriptor.object_type
    }

    pub fn descriptor(&self) -> &ObjectDescriptor {
        &self.descriptor
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Source text addressing this object, optionally indexed, optionally
    /// followed by a property or call fragment
    pub fn source_line(&self, fragment: Option<&str>, index: Option<HostIndex>) -> String {
        let mut line = self.id().registry_lookup();
        if let Some(index) = index {
            line.push('[');
            line.push_str(&index.to_extend());
            line.push(']');
        }
        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            line.push('.');
            line.push_str(fragment);
        }
        line.push(';');
        line
    }

    /// Evaluate a property, assignment or call fragment on this object
    pub fn eval(&self, fragment: &str) -> Result<Value> {
        self.session.evaluate(&self.source_line(Some(fragment), None))
    }

    /// Evaluate `this[index]` on a collection object
    pub fn eval_at(&self, index: HostIndex) -> Result<Value> {
        self.session.evaluate(&self.source_line(None, Some(index)))
    }

    /// Bind a decoded value to a proxy of a statically known type
    pub fn bind<T: RemoteObject>(&self, value: Value) -> Result<Option<T>> {
        match value {
            Value::Null => Ok(None),
            Value::Object(descriptor) => Ok(Some(T::from_handle(Handle::new(
                self.session.clone(),
                descriptor,
            )))),
            other => Err(BridgeError::unexpected_value(T::TYPE_NAME, other.type_name())),
        }
    }

    /// Bind a decoded value through the dispatch table
    pub fn bind_dyn<T>(&self, value: Value) -> Result<Option<T>>
    where
        T: TryFrom<AnyObject, Error = BridgeError>,
    {
        match value {
            Value::Null => Ok(None),
            Value::Object(descriptor) => {
                let any = dispatch::resolve(Handle::new(self.session.clone(), descriptor))?;
                T::try_from(any).map(Some)
            }
            other => Err(BridgeError::unexpected_value("an object", other.type_name())),
        }
    }

    /// Bind every element of an array of descriptors through the dispatch table
    pub fn bind_dyn_list<T>(&self, value: Value) -> Result<Vec<T>>
    where
        T: TryFrom<AnyObject, Error = BridgeError>,
    {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(items) => items
                .into_iter()
                .map(|item| {
                    self.bind_dyn(item)?
                        .ok_or_else(|| BridgeError::unexpected_value("an object", "null"))
                })
                .collect(),
            other => Err(BridgeError::unexpected_value("an array", other.type_name())),
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.object_type(), self.id())
    }
}

/// Two handles are equal when they carry the same identifier. The same host
/// object evaluated twice gets two identifiers; use [`Session::same_object`]
/// to compare host identity.
impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.pydobe_id == other.descriptor.pydobe_id
    }
}

impl ToExtend for Handle {
    fn to_extend(&self) -> String {
        self.id().registry_lookup()
    }
}

/// Minimal remote-bound capability: a handle plus evaluation helpers
pub trait Remote {
    fn handle(&self) -> &Handle;

    fn id(&self) -> &RemoteId {
        self.handle().id()
    }

    fn object_type(&self) -> &str {
        self.handle().object_type()
    }

    /// Read a scalar property
    fn get<T: FromValue>(&self, property: &str) -> Result<T> {
        T::from_value(self.handle().eval(property)?)
    }

    /// Assign a property
    fn set(&self, property: &str, value: &dyn ToExtend) -> Result<()> {
        self.handle().eval(&codec::assign(property, value))?;
        Ok(())
    }

    /// Call a method returning a scalar
    fn invoke<T: FromValue>(&self, method: &str, args: &[&dyn ToExtend]) -> Result<T> {
        T::from_value(self.handle().eval(&codec::call(method, args))?)
    }

    /// Read a property holding an object of a statically known type
    fn get_object<T: RemoteObject>(&self, property: &str) -> Result<Option<T>> {
        self.handle().bind(self.handle().eval(property)?)
    }

    /// Call a method returning an object of a statically known type
    fn invoke_object<T: RemoteObject>(
        &self,
        method: &str,
        args: &[&dyn ToExtend],
    ) -> Result<Option<T>> {
        self.handle()
            .bind(self.handle().eval(&codec::call(method, args))?)
    }

    /// Read a property whose runtime type is only known to the host
    fn get_dyn<T>(&self, property: &str) -> Result<Option<T>>
    where
        T: TryFrom<AnyObject, Error = BridgeError>,
    {
        self.handle().bind_dyn(self.handle().eval(property)?)
    }

    /// Call a method whose result type is only known to the host
    fn invoke_dyn<T>(&self, method: &str, args: &[&dyn ToExtend]) -> Result<Option<T>>
    where
        T: TryFrom<AnyObject, Error = BridgeError>,
    {
        self.handle()
            .bind_dyn(self.handle().eval(&codec::call(method, args))?)
    }

    /// Read an array of objects, dispatching each element
    fn get_dyn_list<T>(&self, property: &str) -> Result<Vec<T>>
    where
        T: TryFrom<AnyObject, Error = BridgeError>,
    {
        self.handle().bind_dyn_list(self.handle().eval(property)?)
    }

    /// Read an enumerated property as its label
    fn get_enum(&self, property: &str, table: &EnumTable) -> Result<&'static str> {
        let code: i64 = self.get(property)?;
        table.label(code)
    }

    /// Write an enumerated property from its label. Unknown labels fail
    /// before anything is sent.
    fn set_enum(&self, property: &str, table: &EnumTable, label: &str) -> Result<()> {
        let code = table.code(label)?;
        self.set(property, &code)
    }
}

/// A concrete proxy type, constructible from a handle
pub trait RemoteObject: Remote + Sized {
    /// Type name the host reports for objects of this type
    const TYPE_NAME: &'static str;

    fn from_handle(handle: Handle) -> Self;

    /// Bind a handle, checking the host agrees on the type
    fn from_handle_checked(handle: Handle) -> Result<Self> {
        if handle.object_type() == Self::TYPE_NAME {
            Ok(Self::from_handle(handle))
        } else {
            Err(BridgeError::unexpected_type(Self::TYPE_NAME, handle.object_type()))
        }
    }
}

/// Declare a concrete proxy type wrapping a [`Handle`]
macro_rules! remote_object {
    ($(#[$meta:meta])* $name:ident => $type_name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            handle: $crate::proxy::Handle,
        }

        impl $crate::proxy::Remote for $name {
            fn handle(&self) -> &$crate::proxy::Handle {
                &self.handle
            }
        }

        impl $crate::proxy::RemoteObject for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn from_handle(handle: $crate::proxy::Handle) -> Self {
                Self { handle }
            }
        }

        impl $crate::codec::ToExtend for $name {
            fn to_extend(&self) -> String {
                $crate::codec::ToExtend::to_extend(&self.handle)
            }
        }
    };
}

pub(crate) use remote_object;
