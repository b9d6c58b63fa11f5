//! Incremental JSON input decoding.
//!
//! Accepted shapes:
//! - a top-level array of objects, each optionally tagged with `_collection`;
//! - a top-level object mapping collection name to an array of objects.
//!
//! Elements are decoded one at a time, so memory stays bounded by the batch size.

use anyhow::{Context, Result};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read};

use super::{Batcher, Record};

pub fn stream_json<R, F>(reader: R, batch_size: usize, on_batch: &mut F) -> Result<()>
where
    R: Read,
    F: FnMut(Vec<Record>) -> Result<()>,
{
    let mut reader = BufReader::new(reader);
    if at_eof(&mut reader).context("read JSON records")? {
        return Batcher::new(batch_size, on_batch).flush();
    }

    let batcher = RefCell::new(Batcher::new(batch_size, on_batch));
    let failure: RefCell<Option<anyhow::Error>> = RefCell::new(None);
    let sink = Sink { batcher: &batcher, failure: &failure };

    let mut de = serde_json::Deserializer::from_reader(reader);
    let decoded = TopLevel { sink: &sink }.deserialize(&mut de).and_then(|()| de.end());
    if let Some(e) = failure.into_inner() {
        return Err(e);
    }
    decoded.context("decode JSON records")?;
    batcher.into_inner().flush()
}

/// Skip leading JSON whitespace; true when nothing else is left.
fn at_eof<R: BufRead>(reader: &mut R) -> io::Result<bool> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(true);
        }
        let blank = buf.iter().take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')).count();
        let more = blank < buf.len();
        reader.consume(blank);
        if more {
            return Ok(false);
        }
    }
}

struct Sink<'s, 'a, F> {
    batcher: &'s RefCell<Batcher<'a, F>>,
    /// Callback errors are parked here so they surface unchanged instead of
    /// being flattened into a serde message.
    failure: &'s RefCell<Option<anyhow::Error>>,
}

impl<F> Sink<'_, '_, F>
where
    F: FnMut(Vec<Record>) -> Result<()>,
{
    fn push<E: de::Error>(&self, rec: Record) -> Result<(), E> {
        self.batcher.borrow_mut().push(rec).map_err(|e| {
            *self.failure.borrow_mut() = Some(e);
            E::custom("record batch callback failed")
        })
    }
}

struct TopLevel<'r, 's, 'a, F> {
    sink: &'r Sink<'s, 'a, F>,
}

impl<'de, F> DeserializeSeed<'de> for TopLevel<'_, '_, '_, F>
where
    F: FnMut(Vec<Record>) -> Result<()>,
{
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de, F> Visitor<'de> for TopLevel<'_, '_, '_, F>
where
    F: FnMut(Vec<Record>) -> Result<()>,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of records or an object of collection arrays")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        while let Some(obj) = seq.next_element::<Map<String, Value>>()? {
            self.sink.push::<A::Error>(Record::from_object(obj))?;
        }
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        while let Some(collection) = map.next_key::<String>()? {
            map.next_value_seed(CollectionArray { name: &collection, sink: self.sink })?;
        }
        Ok(())
    }
}

struct CollectionArray<'n, 'r, 's, 'a, F> {
    name: &'n str,
    sink: &'r Sink<'s, 'a, F>,
}

impl<'de, F> DeserializeSeed<'de> for CollectionArray<'_, '_, '_, '_, F>
where
    F: FnMut(Vec<Record>) -> Result<()>,
{
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, F> Visitor<'de> for CollectionArray<'_, '_, '_, '_, F>
where
    F: FnMut(Vec<Record>) -> Result<()>,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an array of records for collection {:?}", self.name)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        while let Some(mut obj) = seq.next_element::<Map<String, Value>>()? {
            obj.remove(super::COLLECTION_FIELD);
            self.sink.push::<A::Error>(Record::new(self.name, obj))?;
        }
        Ok(())
    }
}
