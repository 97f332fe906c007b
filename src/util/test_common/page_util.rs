// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::Bytes;

use crate::basic::{Encoding, Type};
use crate::column::page::{Page, PageReader};
use crate::data_type::private::ParquetValueType;
use crate::data_type::*;
use crate::encodings::rle::RleEncoder;
use crate::errors::Result;
use crate::schema::types::ColumnDescPtr;
use crate::util::bit_util::{ceil, num_required_bits, BitWriter};

/// PLAIN encodes `values` the way a writer lays them out in a page buffer.
pub fn encode_plain<T: DataType>(values: &[T::T]) -> Vec<u8> {
    let mut buffer = Vec::new();
    match T::get_physical_type() {
        Type::BOOLEAN => {
            let mut bit_writer = BitWriter::new(ceil(values.len(), 8));
            for value in values {
                let value = value.as_any().downcast_ref::<bool>().unwrap();
                bit_writer.put_value(*value as u64, 1);
            }
            buffer.extend_from_slice(&bit_writer.consume());
        }
        Type::INT32 => {
            for value in values {
                let value = value.as_any().downcast_ref::<i32>().unwrap();
                buffer.extend_from_slice(&value.to_le_bytes());
            }
        }
        Type::INT64 => {
            for value in values {
                let value = value.as_any().downcast_ref::<i64>().unwrap();
                buffer.extend_from_slice(&value.to_le_bytes());
            }
        }
        Type::INT96 => {
            for value in values {
                let value = value.as_any().downcast_ref::<Int96>().unwrap();
                for part in value.data() {
                    buffer.extend_from_slice(&part.to_le_bytes());
                }
            }
        }
        Type::FLOAT => {
            for value in values {
                let value = value.as_any().downcast_ref::<f32>().unwrap();
                buffer.extend_from_slice(&value.to_le_bytes());
            }
        }
        Type::DOUBLE => {
            for value in values {
                let value = value.as_any().downcast_ref::<f64>().unwrap();
                buffer.extend_from_slice(&value.to_le_bytes());
            }
        }
        Type::BYTE_ARRAY => {
            for value in values {
                let value = value.as_any().downcast_ref::<ByteArray>().unwrap();
                buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
                buffer.extend_from_slice(value.data());
            }
        }
        Type::FIXED_LEN_BYTE_ARRAY => {
            for value in values {
                let value = value.as_any().downcast_ref::<FixedLenByteArray>().unwrap();
                buffer.extend_from_slice(value.data());
            }
        }
    }
    buffer
}

/// Interns values for a dictionary encoded column chunk. Lookup is a linear
/// scan, acceptable for the page sizes tests generate.
pub struct DictEncoder<T: DataType> {
    entries: Vec<T::T>,
    buffered_indices: Vec<u64>,
}

impl<T: DataType> DictEncoder<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            buffered_indices: Vec::new(),
        }
    }

    /// Interns `values`, buffering their dictionary indices until
    /// [`Self::write_indices`] flushes the current page.
    pub fn put(&mut self, values: &[T::T]) {
        for value in values {
            let index = match self.entries.iter().position(|entry| entry == value) {
                Some(index) => index,
                None => {
                    self.entries.push(value.clone());
                    self.entries.len() - 1
                }
            };
            self.buffered_indices.push(index as u64);
        }
    }

    /// Returns the RLE encoded indices buffered since the previous call,
    /// prefixed with their bit width.
    pub fn write_indices(&mut self) -> Bytes {
        let bit_width = num_required_bits(self.entries.len().saturating_sub(1) as u64);
        let mut encoder = RleEncoder::new(bit_width, self.buffered_indices.len());
        for index in self.buffered_indices.drain(..) {
            encoder.put(index);
        }
        let mut buffer = vec![bit_width];
        buffer.extend_from_slice(&encoder.consume());
        Bytes::from(buffer)
    }

    /// Returns all interned entries PLAIN encoded for the dictionary page.
    pub fn write_dict(&self) -> Bytes {
        Bytes::from(encode_plain::<T>(&self.entries))
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }
}

impl<T: DataType> Default for DictEncoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait DataPageBuilder {
    fn add_rep_levels(&mut self, max_level: i16, rep_levels: &[i16]);
    fn add_def_levels(&mut self, max_level: i16, def_levels: &[i16]);
    fn add_values<T: DataType>(&mut self, encoding: Encoding, values: &[T::T]);
    fn add_indices(&mut self, indices: Bytes);
    fn consume(self) -> Page;
}

/// A utility struct for building data pages (v1 or v2). Callers must call:
///   - add_rep_levels()
///   - add_def_levels()
///   - add_values() for normal data page / add_indices() for dictionary data page
///   - consume()
/// in order to populate and obtain a data page.
pub struct DataPageBuilderImpl {
    encoding: Option<Encoding>,
    num_values: u32,
    num_nulls: u32,
    num_rows: Option<u32>,
    buffer: Vec<u8>,
    rep_levels_byte_len: u32,
    def_levels_byte_len: u32,
    datapage_v2: bool,
}

impl DataPageBuilderImpl {
    // `num_values` is the number of levels in the page, which is also the
    // number of values when none are null.
    pub fn new(_desc: ColumnDescPtr, num_values: u32, datapage_v2: bool) -> Self {
        DataPageBuilderImpl {
            encoding: None,
            num_values,
            num_nulls: 0,
            num_rows: None,
            buffer: vec![],
            rep_levels_byte_len: 0,
            def_levels_byte_len: 0,
            datapage_v2,
        }
    }

    // Adds levels to the buffer and returns the number of encoded bytes,
    // excluding the length prefix a v1 page carries.
    fn add_levels(&mut self, max_level: i16, levels: &[i16]) -> u32 {
        if max_level <= 0 {
            return 0;
        }
        let bit_width = num_required_bits(max_level as u64);
        let mut encoder = RleEncoder::new(bit_width, levels.len());
        for level in levels {
            encoder.put(*level as u64);
        }
        let encoded_levels = encoder.consume();
        if self.datapage_v2 {
            // Data page v2 stores levels unframed, their byte lengths live in
            // the page header.
            self.buffer.extend_from_slice(&encoded_levels);
        } else {
            self.buffer
                .extend_from_slice(&(encoded_levels.len() as u32).to_le_bytes());
            self.buffer.extend_from_slice(&encoded_levels);
        }
        encoded_levels.len() as u32
    }
}

impl DataPageBuilder for DataPageBuilderImpl {
    fn add_rep_levels(&mut self, max_levels: i16, rep_levels: &[i16]) {
        self.num_values = rep_levels.len() as u32;
        self.num_rows = Some(rep_levels.iter().filter(|level| **level == 0).count() as u32);
        self.rep_levels_byte_len = self.add_levels(max_levels, rep_levels);
    }

    fn add_def_levels(&mut self, max_levels: i16, def_levels: &[i16]) {
        assert!(
            self.num_values == def_levels.len() as u32,
            "num_values: {}, def_levels.len(): {}",
            self.num_values,
            def_levels.len()
        );
        self.num_nulls = def_levels.iter().filter(|level| **level < max_levels).count() as u32;
        self.def_levels_byte_len = self.add_levels(max_levels, def_levels);
    }

    fn add_values<T: DataType>(&mut self, encoding: Encoding, values: &[T::T]) {
        assert!(
            self.num_values >= values.len() as u32,
            "num_values: {}, values.len(): {}",
            self.num_values,
            values.len()
        );
        self.encoding = Some(encoding);
        match encoding {
            Encoding::PLAIN => self.buffer.extend_from_slice(&encode_plain::<T>(values)),
            enc => panic!("Unexpected encoding {enc}"),
        }
    }

    fn add_indices(&mut self, indices: Bytes) {
        self.encoding = Some(Encoding::RLE_DICTIONARY);
        self.buffer.extend_from_slice(&indices);
    }

    fn consume(self) -> Page {
        if self.datapage_v2 {
            Page::DataPageV2 {
                buf: Bytes::from(self.buffer),
                num_values: self.num_values,
                encoding: self.encoding.unwrap(),
                num_nulls: self.num_nulls,
                num_rows: self.num_rows.unwrap_or(self.num_values),
                def_levels_byte_len: self.def_levels_byte_len,
                rep_levels_byte_len: self.rep_levels_byte_len,
                is_compressed: false,
            }
        } else {
            Page::DataPage {
                buf: Bytes::from(self.buffer),
                num_values: self.num_values,
                encoding: self.encoding.unwrap(),
                def_level_encoding: Encoding::RLE,
                rep_level_encoding: Encoding::RLE,
            }
        }
    }
}

/// A utility page reader which stores pages in memory.
pub struct InMemoryPageReader<P: Iterator<Item = Page>> {
    page_iter: P,
}

impl<P: Iterator<Item = Page>> InMemoryPageReader<P> {
    pub fn new(pages: impl IntoIterator<Item = Page, IntoIter = P>) -> Self {
        Self {
            page_iter: pages.into_iter(),
        }
    }
}

impl<P: Iterator<Item = Page> + Send> PageReader for InMemoryPageReader<P> {
    fn get_next_page(&mut self) -> Result<Option<Page>> {
        Ok(self.page_iter.next())
    }
}

impl<P: Iterator<Item = Page> + Send> Iterator for InMemoryPageReader<P> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_page().transpose()
    }
}
