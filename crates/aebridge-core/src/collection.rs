//! Collection semantics for remote collections
//!
//! The host indexes collections from 1. [`host_index`] is the only place a
//! client index is translated, so every access point adds the offset exactly
//! once.

use crate::{
    codec::{ToExtend, Value},
    error::{BridgeError, Result},
    proxy::Remote,
};

/// A 1-based index in the host's convention. Only [`host_index`] builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostIndex(usize);

impl HostIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl ToExtend for HostIndex {
    fn to_extend(&self) -> String {
        self.0.to_string()
    }
}

/// Translate a client index into the host's 1-based convention.
///
/// Negative indices count from the end; `len` is only consulted for them.
pub fn host_index(index: isize, len: impl FnOnce() -> Result<usize>) -> Result<HostIndex> {
    let resolved = if index < 0 {
        let length = len()?;
        let resolved = length as isize + index;
        if resolved < 0 {
            return Err(BridgeError::IndexOutOfRange {
                index,
                length: Some(length),
            });
        }
        resolved as usize
    } else {
        index as usize
    };
    Ok(HostIndex(resolved + 1))
}

/// A remote object with a length property and indexed access
pub trait RemoteCollection: Remote {
    type Item;

    /// Property the host uses for the element count
    const LENGTH_PROPERTY: &'static str;

    /// Turn one decoded element into a proxy; `None` when the host had nothing there
    fn element(&self, value: Value) -> Result<Option<Self::Item>>;

    fn len(&self) -> Result<usize> {
        self.get(Self::LENGTH_PROPERTY)
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn at(&self, index: isize) -> Result<Self::Item> {
        let host = host_index(index, || self.len())?;
        let value = self.handle().eval_at(host)?;
        self.element(value)?
            .ok_or(BridgeError::IndexOutOfRange {
                index,
                length: None,
            })
    }

    /// Lazily fetch every element, one round trip each
    fn iter(&self) -> CollectionIter<'_, Self>
    where
        Self: Sized,
    {
        CollectionIter::new(self)
    }
}

/// Iterator over a remote collection.
///
/// The length is read on the first pull; each element is fetched when
/// reached. Calling [`RemoteCollection::iter`] again starts over.
pub struct CollectionIter<'a, C: RemoteCollection> {
    collection: &'a C,
    next: usize,
    len: Option<usize>,
    done: bool,
}

impl<'a, C: RemoteCollection> CollectionIter<'a, C> {
    fn new(collection: &'a C) -> Self {
        Self {
            collection,
            next: 0,
            len: None,
            done: false,
        }
    }
}

impl<C: RemoteCollection> Iterator for CollectionIter<'_, C> {
    type Item = Result<C::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let len = match self.len {
            Some(len) => len,
            None => match self.collection.len() {
                Ok(len) => {
                    self.len = Some(len);
                    len
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            },
        };
        if self.next >= len {
            self.done = true;
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.collection.at(index as isize))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        codec::ObjectDescriptor,
        objects::{Item, ItemCollection, LayerCollection},
        proxy::{Handle, RemoteObject},
        session::testing::MockTransport,
    };

    #[test]
    fn test_host_index_translation() {
        let no_len = || -> Result<usize> { panic!("length not needed") };
        assert_eq!(host_index(0, no_len).unwrap().get(), 1);
        assert_eq!(host_index(4, no_len).unwrap().get(), 5);
        assert_eq!(host_index(-1, || Ok(5)).unwrap().get(), 5);
        assert_eq!(host_index(-5, || Ok(5)).unwrap().get(), 1);
        assert!(matches!(
            host_index(-6, || Ok(5)),
            Err(BridgeError::IndexOutOfRange { index: -6, length: Some(5) })
        ));
    }

    #[test]
    fn test_at_translates_once() {
        let (session, mock) = MockTransport::session();
        let items = ItemCollection::from_handle(Handle::new(
            session,
            ObjectDescriptor::new("ItemCollection", "p1"),
        ));

        mock.respond_object("CompItem", "p2");
        let first = items.at(0).unwrap();
        assert!(matches!(first, Item::Comp(_)));

        mock.respond("5");
        mock.respond_object("FolderItem", "p3");
        let last = items.at(-1).unwrap();
        assert!(matches!(last, Item::Folder(_)));

        assert_eq!(
            mock.sent_lines(),
            vec![
                r#"$._pydobe["p1"][1];"#,
                r#"$._pydobe["p1"].length;"#,
                r#"$._pydobe["p1"][5];"#,
            ]
        );
    }

    #[test]
    fn test_missing_element_is_out_of_range() {
        let (session, mock) = MockTransport::session();
        let items = ItemCollection::from_handle(Handle::new(
            session,
            ObjectDescriptor::new("ItemCollection", "p1"),
        ));
        mock.respond("undefined");
        assert!(matches!(
            items.at(9),
            Err(BridgeError::IndexOutOfRange { index: 9, length: None })
        ));
    }

    #[test]
    fn test_iteration_is_lazy_and_restartable() {
        let (session, mock) = MockTransport::session();
        let layers = LayerCollection::from_handle(Handle::new(
            session,
            ObjectDescriptor::new("LayerCollection", "p4"),
        ));

        for _ in 0..2 {
            mock.respond("2");
            mock.respond_object("TextLayer", "p10");
            mock.respond_object("CameraLayer", "p11");
            let kinds = layers
                .iter()
                .map(|layer| layer.map(|l| l.object_type().to_string()))
                .collect::<Result<Vec<_>>>()
                .unwrap();
            assert_eq!(kinds, vec!["TextLayer", "CameraLayer"]);
        }

        let lines = mock.sent_lines();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], r#"$._pydobe["p4"].length;"#);
        assert_eq!(lines[1], r#"$._pydobe["p4"][1];"#);
        assert_eq!(lines[2], r#"$._pydobe["p4"][2];"#);
        assert_eq!(lines[3], r#"$._pydobe["p4"].length;"#);
    }

    #[test]
    fn test_empty_collection_iterates_nothing() {
        let (session, mock) = MockTransport::session();
        let items = ItemCollection::from_handle(Handle::new(
            session,
            ObjectDescriptor::new("ItemCollection", "p1"),
        ));
        mock.respond("0");
        assert_eq!(items.iter().count(), 0);
        assert_eq!(mock.sent_lines().len(), 1);
    }
}
