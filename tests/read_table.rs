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

//! End to end tests that materialize tables from complete Parquet files.
//!
//! The files are assembled byte by byte: thrift compact footer metadata, page
//! headers, RLE levels and PLAIN/dictionary/delta encoded values, optionally
//! run through a real compression codec. Everything is then read back through
//! [`TableReader`] only.

use std::io::Write;

use bytes::Bytes;
use chrono::{NaiveDate, NaiveTime};
use flate2::write::GzEncoder;
use parquet_table::basic::{Compression, Encoding, PageType, Repetition, Type};
use parquet_table::errors::ParquetError;
use parquet_table::table::{ColumnType, ReadOptions, Table, TableReader};

const MAGIC: &[u8] = b"PAR1";

// ConvertedType wire values from the Parquet thrift definition.
const CONVERTED_UTF8: i32 = 0;
const CONVERTED_LIST: i32 = 3;
const CONVERTED_DECIMAL: i32 = 5;
const CONVERTED_DATE: i32 = 6;
const CONVERTED_TIME_MILLIS: i32 = 7;
const CONVERTED_TIME_MICROS: i32 = 8;
const CONVERTED_TIMESTAMP_MILLIS: i32 = 9;
const CONVERTED_TIMESTAMP_MICROS: i32 = 10;
const CONVERTED_UINT_32: i32 = 13;
const CONVERTED_INT_8: i32 = 15;
const CONVERTED_INT_16: i32 = 16;
const CONVERTED_INTERVAL: i32 = 21;

// ----------------------------------------------------------------------
// Thrift compact protocol writing

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn write_list_header(out: &mut Vec<u8>, elem_type: u8, len: usize) {
    if len < 15 {
        out.push(((len as u8) << 4) | elem_type);
    } else {
        out.push(0xF0 | elem_type);
        write_varint(out, len as u64);
    }
}

/// Emits the fields of one struct scope, tracking the field id delta.
struct FieldWriter {
    out: Vec<u8>,
    last_id: i16,
}

impl FieldWriter {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            last_id: 0,
        }
    }

    fn header(&mut self, id: i16, field_type: u8) {
        let delta = id - self.last_id;
        assert!((1..=15).contains(&delta), "field id delta out of range");
        self.out.push(((delta as u8) << 4) | field_type);
        self.last_id = id;
    }

    fn bool_field(&mut self, id: i16, value: bool) {
        self.header(id, if value { 1 } else { 2 });
    }

    fn i32_field(&mut self, id: i16, value: i32) {
        self.header(id, 5);
        write_varint(&mut self.out, zigzag(i64::from(value)));
    }

    fn i64_field(&mut self, id: i16, value: i64) {
        self.header(id, 6);
        write_varint(&mut self.out, zigzag(value));
    }

    fn string_field(&mut self, id: i16, value: &str) {
        self.header(id, 8);
        write_varint(&mut self.out, value.len() as u64);
        self.out.extend_from_slice(value.as_bytes());
    }

    fn i32_list_field(&mut self, id: i16, values: &[i32]) {
        self.header(id, 9);
        write_list_header(&mut self.out, 5, values.len());
        for value in values {
            write_varint(&mut self.out, zigzag(i64::from(*value)));
        }
    }

    fn string_list_field(&mut self, id: i16, values: &[&str]) {
        self.header(id, 9);
        write_list_header(&mut self.out, 8, values.len());
        for value in values {
            write_varint(&mut self.out, value.len() as u64);
            self.out.extend_from_slice(value.as_bytes());
        }
    }

    /// `body` must be a finished struct, stop byte included.
    fn struct_field(&mut self, id: i16, body: &[u8]) {
        self.header(id, 12);
        self.out.extend_from_slice(body);
    }

    fn struct_list_field(&mut self, id: i16, elements: &[Vec<u8>]) {
        self.header(id, 9);
        write_list_header(&mut self.out, 12, elements.len());
        for element in elements {
            self.out.extend_from_slice(element);
        }
    }

    fn finish(mut self) -> Vec<u8> {
        self.out.push(0);
        self.out
    }
}

// ----------------------------------------------------------------------
// Value, level and page encoding

fn bits_needed(value: u64) -> u8 {
    (64 - value.leading_zeros()) as u8
}

fn pack_bools(values: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; (values.len() + 7) / 8];
    for (i, value) in values.iter().enumerate() {
        if *value {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

/// Bit-packs `count` values LSB first, zero padded past the end of `values`.
fn pack_bits(values: &[u64], bit_width: usize, count: usize) -> Vec<u8> {
    let mut out = vec![0u8; (count * bit_width + 7) / 8];
    let mut bit = 0;
    for i in 0..count {
        let value = values.get(i).copied().unwrap_or(0);
        for b in 0..bit_width {
            if value >> b & 1 == 1 {
                out[(bit + b) / 8] |= 1 << ((bit + b) % 8);
            }
        }
        bit += bit_width;
    }
    out
}

/// RLE/bit-packed hybrid data made of one RLE run per group of equal values.
fn rle_encode(values: &[i16], bit_width: u8) -> Vec<u8> {
    let value_width = ((bit_width as usize) + 7) / 8;
    let mut out = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let mut j = i + 1;
        while j < values.len() && values[j] == values[i] {
            j += 1;
        }
        write_varint(&mut out, ((j - i) as u64) << 1);
        out.extend_from_slice(&values[i].to_le_bytes()[..value_width]);
        i = j;
    }
    out
}

/// DELTA_BINARY_PACKED stream with the standard 128 value block of 4 mini
/// blocks. Supports up to one mini block of deltas, enough for test data.
fn delta_bit_packed_encode(values: &[i64]) -> Vec<u8> {
    assert!(values.len() <= 33, "writer emits a single mini block");
    let mut out = Vec::new();
    write_varint(&mut out, 128);
    write_varint(&mut out, 4);
    write_varint(&mut out, values.len() as u64);
    write_varint(&mut out, zigzag(values.first().copied().unwrap_or(0)));
    if values.len() > 1 {
        let deltas: Vec<i64> = values.windows(2).map(|w| w[1].wrapping_sub(w[0])).collect();
        let min_delta = deltas.iter().copied().min().unwrap();
        write_varint(&mut out, zigzag(min_delta));
        let adjusted: Vec<u64> = deltas
            .iter()
            .map(|delta| delta.wrapping_sub(min_delta) as u64)
            .collect();
        let bit_width = adjusted.iter().map(|v| bits_needed(*v)).max().unwrap();
        out.push(bit_width);
        out.extend_from_slice(&[0, 0, 0]);
        out.extend_from_slice(&pack_bits(&adjusted, bit_width as usize, 32));
    }
    out
}

fn delta_length_byte_array_encode(values: &[&[u8]]) -> Vec<u8> {
    let lengths: Vec<i64> = values.iter().map(|v| v.len() as i64).collect();
    let mut out = delta_bit_packed_encode(&lengths);
    for value in values {
        out.extend_from_slice(value);
    }
    out
}

fn delta_byte_array_encode(values: &[&[u8]]) -> Vec<u8> {
    let mut prefix_lengths = Vec::new();
    let mut suffixes: Vec<&[u8]> = Vec::new();
    let mut previous: &[u8] = &[];
    for value in values {
        let common = previous
            .iter()
            .zip(value.iter())
            .take_while(|(a, b)| a == b)
            .count();
        prefix_lengths.push(common as i64);
        suffixes.push(&value[common..]);
        previous = value;
    }
    let mut out = delta_bit_packed_encode(&prefix_lengths);
    out.extend_from_slice(&delta_length_byte_array_encode(&suffixes));
    out
}

/// Deduplicates the PLAIN encodings of the values. Returns the dictionary page
/// payload, the entry count and the index section for the data page.
fn dict_encode(per_value: Vec<Vec<u8>>) -> (Vec<u8>, i32, Vec<u8>) {
    let mut entries: Vec<Vec<u8>> = Vec::new();
    let mut indices: Vec<i16> = Vec::new();
    for value in per_value {
        let index = match entries.iter().position(|entry| *entry == value) {
            Some(index) => index,
            None => {
                entries.push(value);
                entries.len() - 1
            }
        };
        indices.push(index as i16);
    }
    let bit_width = bits_needed(entries.len().saturating_sub(1) as u64).max(1);
    let mut index_bytes = vec![bit_width];
    index_bytes.extend_from_slice(&rle_encode(&indices, bit_width));
    (entries.concat(), entries.len() as i32, index_bytes)
}

fn compress(codec: Compression, data: &[u8]) -> Vec<u8> {
    match codec {
        Compression::UNCOMPRESSED => data.to_vec(),
        Compression::SNAPPY => snap::raw::Encoder::new()
            .compress_vec(data)
            .expect("snappy compression"),
        Compression::GZIP => {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).expect("gzip compression");
            encoder.finish().expect("gzip compression")
        }
        other => panic!("test writer cannot compress with {other}"),
    }
}

fn data_page_v1_header(
    num_values: i32,
    encoding: Encoding,
    uncompressed_size: i32,
    compressed_size: i32,
) -> Vec<u8> {
    let mut inner = FieldWriter::new();
    inner.i32_field(1, num_values);
    inner.i32_field(2, encoding as i32);
    inner.i32_field(3, Encoding::RLE as i32);
    inner.i32_field(4, Encoding::RLE as i32);
    let inner = inner.finish();

    let mut header = FieldWriter::new();
    header.i32_field(1, PageType::DATA_PAGE as i32);
    header.i32_field(2, uncompressed_size);
    header.i32_field(3, compressed_size);
    header.struct_field(5, &inner);
    header.finish()
}

struct V2PageHeader {
    num_values: i32,
    num_nulls: i32,
    num_rows: i32,
    encoding: Encoding,
    def_levels_byte_length: i32,
    rep_levels_byte_length: i32,
    uncompressed_size: i32,
    compressed_size: i32,
    is_compressed: bool,
}

fn data_page_v2_header(page: &V2PageHeader) -> Vec<u8> {
    let mut inner = FieldWriter::new();
    inner.i32_field(1, page.num_values);
    inner.i32_field(2, page.num_nulls);
    inner.i32_field(3, page.num_rows);
    inner.i32_field(4, page.encoding as i32);
    inner.i32_field(5, page.def_levels_byte_length);
    inner.i32_field(6, page.rep_levels_byte_length);
    inner.bool_field(7, page.is_compressed);
    let inner = inner.finish();

    let mut header = FieldWriter::new();
    header.i32_field(1, PageType::DATA_PAGE_V2 as i32);
    header.i32_field(2, page.uncompressed_size);
    header.i32_field(3, page.compressed_size);
    header.struct_field(8, &inner);
    header.finish()
}

fn dictionary_page_header(
    num_values: i32,
    encoding: Encoding,
    uncompressed_size: i32,
    compressed_size: i32,
) -> Vec<u8> {
    let mut inner = FieldWriter::new();
    inner.i32_field(1, num_values);
    inner.i32_field(2, encoding as i32);
    let inner = inner.finish();

    let mut header = FieldWriter::new();
    header.i32_field(1, PageType::DICTIONARY_PAGE as i32);
    header.i32_field(2, uncompressed_size);
    header.i32_field(3, compressed_size);
    header.struct_field(7, &inner);
    header.finish()
}

// ----------------------------------------------------------------------
// Column and file assembly

#[derive(Clone)]
struct SchemaField {
    name: &'static str,
    physical: Type,
    repetition: Repetition,
    converted: Option<i32>,
    type_length: Option<i32>,
    scale_precision: Option<(i32, i32)>,
}

#[derive(Clone)]
enum ColumnValues {
    Bool(Vec<Option<bool>>),
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    Int96(Vec<Option<[u32; 3]>>),
    Float(Vec<Option<f32>>),
    Double(Vec<Option<f64>>),
    Bytes(Vec<Option<Vec<u8>>>),
    RepeatedInt32(Vec<Option<Vec<i32>>>),
    RepeatedBytes(Vec<Option<Vec<Vec<u8>>>>),
}

impl ColumnValues {
    fn len(&self) -> usize {
        match self {
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::Int96(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Double(v) => v.len(),
            ColumnValues::Bytes(v) => v.len(),
            ColumnValues::RepeatedInt32(v) => v.len(),
            ColumnValues::RepeatedBytes(v) => v.len(),
        }
    }

    fn slice(&self, start: usize, len: usize) -> ColumnValues {
        match self {
            ColumnValues::Bool(v) => ColumnValues::Bool(v[start..start + len].to_vec()),
            ColumnValues::Int32(v) => ColumnValues::Int32(v[start..start + len].to_vec()),
            ColumnValues::Int64(v) => ColumnValues::Int64(v[start..start + len].to_vec()),
            ColumnValues::Int96(v) => ColumnValues::Int96(v[start..start + len].to_vec()),
            ColumnValues::Float(v) => ColumnValues::Float(v[start..start + len].to_vec()),
            ColumnValues::Double(v) => ColumnValues::Double(v[start..start + len].to_vec()),
            ColumnValues::Bytes(v) => ColumnValues::Bytes(v[start..start + len].to_vec()),
            ColumnValues::RepeatedInt32(v) => {
                ColumnValues::RepeatedInt32(v[start..start + len].to_vec())
            }
            ColumnValues::RepeatedBytes(v) => {
                ColumnValues::RepeatedBytes(v[start..start + len].to_vec())
            }
        }
    }

    fn present_mask(&self) -> Vec<bool> {
        match self {
            ColumnValues::Bool(v) => v.iter().map(Option::is_some).collect(),
            ColumnValues::Int32(v) => v.iter().map(Option::is_some).collect(),
            ColumnValues::Int64(v) => v.iter().map(Option::is_some).collect(),
            ColumnValues::Int96(v) => v.iter().map(Option::is_some).collect(),
            ColumnValues::Float(v) => v.iter().map(Option::is_some).collect(),
            ColumnValues::Double(v) => v.iter().map(Option::is_some).collect(),
            ColumnValues::Bytes(v) => v.iter().map(Option::is_some).collect(),
            _ => panic!("repeated values use repetition REPEATED"),
        }
    }

    fn repeated_row_lens(&self) -> Vec<Option<usize>> {
        match self {
            ColumnValues::RepeatedInt32(rows) => {
                rows.iter().map(|row| row.as_ref().map(Vec::len)).collect()
            }
            ColumnValues::RepeatedBytes(rows) => {
                rows.iter().map(|row| row.as_ref().map(Vec::len)).collect()
            }
            _ => panic!("not a repeated column"),
        }
    }

    /// Definition levels, repetition levels and the level entry count.
    fn levels(&self, repetition: Repetition) -> (Vec<i16>, Vec<i16>, usize) {
        match repetition {
            Repetition::REQUIRED => (Vec::new(), Vec::new(), self.len()),
            Repetition::OPTIONAL => {
                let def_levels: Vec<i16> = self
                    .present_mask()
                    .iter()
                    .map(|present| i16::from(*present))
                    .collect();
                let entries = def_levels.len();
                (def_levels, Vec::new(), entries)
            }
            Repetition::REPEATED => {
                let mut def_levels = Vec::new();
                let mut rep_levels = Vec::new();
                for row_len in self.repeated_row_lens() {
                    match row_len {
                        Some(len) if len > 0 => {
                            for i in 0..len {
                                def_levels.push(1);
                                rep_levels.push(i16::from(i > 0));
                            }
                        }
                        _ => {
                            def_levels.push(0);
                            rep_levels.push(0);
                        }
                    }
                }
                let entries = def_levels.len();
                (def_levels, rep_levels, entries)
            }
        }
    }

    /// PLAIN encoding of each present value, one buffer per value.
    fn plain_values(&self, field: &SchemaField) -> Vec<Vec<u8>> {
        match self {
            ColumnValues::Bool(_) => panic!("booleans are bit packed, use plain_section"),
            ColumnValues::Int32(v) => v
                .iter()
                .flatten()
                .map(|value| value.to_le_bytes().to_vec())
                .collect(),
            ColumnValues::Int64(v) => v
                .iter()
                .flatten()
                .map(|value| value.to_le_bytes().to_vec())
                .collect(),
            ColumnValues::Int96(v) => v
                .iter()
                .flatten()
                .map(|words| {
                    let mut out = Vec::with_capacity(12);
                    for word in words {
                        out.extend_from_slice(&word.to_le_bytes());
                    }
                    out
                })
                .collect(),
            ColumnValues::Float(v) => v
                .iter()
                .flatten()
                .map(|value| value.to_le_bytes().to_vec())
                .collect(),
            ColumnValues::Double(v) => v
                .iter()
                .flatten()
                .map(|value| value.to_le_bytes().to_vec())
                .collect(),
            ColumnValues::Bytes(v) => v
                .iter()
                .flatten()
                .map(|data| encode_binary(data, field))
                .collect(),
            ColumnValues::RepeatedInt32(rows) => rows
                .iter()
                .flatten()
                .flatten()
                .map(|value| value.to_le_bytes().to_vec())
                .collect(),
            ColumnValues::RepeatedBytes(rows) => rows
                .iter()
                .flatten()
                .flatten()
                .map(|data| encode_binary(data, field))
                .collect(),
        }
    }

    fn plain_section(&self, field: &SchemaField) -> Vec<u8> {
        match self {
            ColumnValues::Bool(v) => {
                let present: Vec<bool> = v.iter().flatten().copied().collect();
                pack_bools(&present)
            }
            _ => self.plain_values(field).concat(),
        }
    }

    fn present_ints(&self) -> Vec<i64> {
        match self {
            ColumnValues::Int32(v) => v.iter().flatten().map(|value| i64::from(*value)).collect(),
            ColumnValues::Int64(v) => v.iter().flatten().copied().collect(),
            _ => panic!("delta binary packed needs an integer column"),
        }
    }

    fn present_bytes(&self) -> Vec<Vec<u8>> {
        match self {
            ColumnValues::Bytes(v) => v.iter().flatten().cloned().collect(),
            _ => panic!("delta byte array needs a binary column"),
        }
    }
}

fn encode_binary(data: &[u8], field: &SchemaField) -> Vec<u8> {
    if field.physical == Type::FIXED_LEN_BYTE_ARRAY {
        let expected = field.type_length.expect("fixed field needs a length") as usize;
        assert_eq!(data.len(), expected, "fixed length value size");
        data.to_vec()
    } else {
        let mut out = (data.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(data);
        out
    }
}

struct ColumnSpec {
    field: SchemaField,
    encoding: Encoding,
    values: ColumnValues,
}

impl ColumnSpec {
    fn new(
        name: &'static str,
        physical: Type,
        repetition: Repetition,
        encoding: Encoding,
        values: ColumnValues,
    ) -> Self {
        Self {
            field: SchemaField {
                name,
                physical,
                repetition,
                converted: None,
                type_length: None,
                scale_precision: None,
            },
            encoding,
            values,
        }
    }

    fn with_converted(mut self, converted: i32) -> Self {
        self.field.converted = Some(converted);
        self
    }

    fn with_type_length(mut self, type_length: i32) -> Self {
        self.field.type_length = Some(type_length);
        self
    }

    fn with_decimal(mut self, precision: i32, scale: i32) -> Self {
        self.field.converted = Some(CONVERTED_DECIMAL);
        self.field.scale_precision = Some((scale, precision));
        self
    }
}

fn required(
    name: &'static str,
    physical: Type,
    encoding: Encoding,
    values: ColumnValues,
) -> ColumnSpec {
    ColumnSpec::new(name, physical, Repetition::REQUIRED, encoding, values)
}

fn optional(
    name: &'static str,
    physical: Type,
    encoding: Encoding,
    values: ColumnValues,
) -> ColumnSpec {
    ColumnSpec::new(name, physical, Repetition::OPTIONAL, encoding, values)
}

fn repeated(
    name: &'static str,
    physical: Type,
    encoding: Encoding,
    values: ColumnValues,
) -> ColumnSpec {
    ColumnSpec::new(name, physical, Repetition::REPEATED, encoding, values)
}

fn strings(values: &[Option<&str>]) -> ColumnValues {
    ColumnValues::Bytes(
        values
            .iter()
            .map(|value| value.map(|s| s.as_bytes().to_vec()))
            .collect(),
    )
}

fn string_lists(rows: &[Option<Vec<&str>>]) -> ColumnValues {
    ColumnValues::RepeatedBytes(
        rows.iter()
            .map(|row| {
                row.as_ref()
                    .map(|items| items.iter().map(|s| s.as_bytes().to_vec()).collect())
            })
            .collect(),
    )
}

struct FileBuilder {
    columns: Vec<ColumnSpec>,
    row_groups: Vec<usize>,
    codec: Compression,
    v2: bool,
    version: i32,
    num_rows_override: Option<i64>,
    declared_codec: Option<Compression>,
    data_page_offset_shift: i64,
    extra_declared_values: i32,
}

impl FileBuilder {
    fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            row_groups: Vec::new(),
            codec: Compression::UNCOMPRESSED,
            v2: false,
            version: 1,
            num_rows_override: None,
            declared_codec: None,
            data_page_offset_shift: 0,
            extra_declared_values: 0,
        }
    }

    fn with_codec(mut self, codec: Compression) -> Self {
        self.codec = codec;
        self
    }

    fn with_v2(mut self) -> Self {
        self.v2 = true;
        self
    }

    fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    fn with_row_groups(mut self, row_groups: &[usize]) -> Self {
        self.row_groups = row_groups.to_vec();
        self
    }

    fn with_num_rows(mut self, num_rows: i64) -> Self {
        self.num_rows_override = Some(num_rows);
        self
    }

    /// Writes `codec` into the column metadata while leaving pages uncompressed.
    fn with_declared_codec(mut self, codec: Compression) -> Self {
        self.declared_codec = Some(codec);
        self
    }

    fn with_data_page_offset_shift(mut self, shift: i64) -> Self {
        self.data_page_offset_shift = shift;
        self
    }

    /// Inflates every declared value count without writing more values.
    fn with_extra_declared_values(mut self, extra: i32) -> Self {
        self.extra_declared_values = extra;
        self
    }

    fn build(&self) -> Bytes {
        let total_rows = self.columns.first().map_or(0, |spec| spec.values.len());
        for spec in &self.columns {
            assert_eq!(spec.values.len(), total_rows, "ragged column {}", spec.field.name);
        }
        let groups = if self.row_groups.is_empty() {
            vec![total_rows]
        } else {
            assert_eq!(self.row_groups.iter().sum::<usize>(), total_rows);
            self.row_groups.clone()
        };

        let mut out = MAGIC.to_vec();
        let mut row_groups = Vec::new();
        let mut row_start = 0;
        for &group_rows in &groups {
            let group_start = out.len();
            let mut chunks = Vec::new();
            for spec in &self.columns {
                let values = spec.values.slice(row_start, group_rows);
                chunks.push(self.append_chunk(&mut out, spec, &values, group_rows));
            }
            let total_byte_size = (out.len() - group_start) as i64;
            let mut group = FieldWriter::new();
            group.struct_list_field(1, &chunks);
            group.i64_field(2, total_byte_size);
            group.i64_field(3, group_rows as i64);
            row_groups.push(group.finish());
            row_start += group_rows;
        }

        let mut schema = vec![root_element("schema", self.columns.len())];
        for spec in &self.columns {
            schema.push(schema_element(&spec.field));
        }

        let mut metadata = FieldWriter::new();
        metadata.i32_field(1, self.version);
        metadata.struct_list_field(2, &schema);
        metadata.i64_field(3, self.num_rows_override.unwrap_or(total_rows as i64));
        metadata.struct_list_field(4, &row_groups);
        metadata.string_field(6, "parquet-table test writer");
        let metadata = metadata.finish();

        out.extend_from_slice(&metadata);
        out.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
        out.extend_from_slice(MAGIC);
        Bytes::from(out)
    }

    /// Writes the pages of one column chunk into `out` and returns the
    /// serialized ColumnChunk metadata struct.
    fn append_chunk(
        &self,
        out: &mut Vec<u8>,
        spec: &ColumnSpec,
        values: &ColumnValues,
        group_rows: usize,
    ) -> Vec<u8> {
        let actual_codec = if self.declared_codec.is_some() {
            Compression::UNCOMPRESSED
        } else {
            self.codec
        };
        let declared_codec = self.declared_codec.unwrap_or(self.codec);

        let (def_levels, rep_levels, entries) = values.levels(spec.field.repetition);
        let declared_values = entries as i32 + self.extra_declared_values;

        let (dictionary, data_bytes) = match spec.encoding {
            Encoding::PLAIN | Encoding::BYTE_STREAM_SPLIT => {
                (None, values.plain_section(&spec.field))
            }
            Encoding::PLAIN_DICTIONARY | Encoding::RLE_DICTIONARY => {
                let (dict, dict_entries, indices) = dict_encode(values.plain_values(&spec.field));
                (Some((dict, dict_entries)), indices)
            }
            Encoding::DELTA_BINARY_PACKED => (None, delta_bit_packed_encode(&values.present_ints())),
            Encoding::DELTA_LENGTH_BYTE_ARRAY => {
                let owned = values.present_bytes();
                let refs: Vec<&[u8]> = owned.iter().map(Vec::as_slice).collect();
                (None, delta_length_byte_array_encode(&refs))
            }
            Encoding::DELTA_BYTE_ARRAY => {
                let owned = values.present_bytes();
                let refs: Vec<&[u8]> = owned.iter().map(Vec::as_slice).collect();
                (None, delta_byte_array_encode(&refs))
            }
            other => panic!("test writer cannot encode {other}"),
        };

        let mut uncompressed_total = 0i64;
        let mut dict_offset = None;
        if let Some((dict_bytes, dict_entries)) = &dictionary {
            let dict_page_encoding = if spec.encoding == Encoding::PLAIN_DICTIONARY {
                Encoding::PLAIN_DICTIONARY
            } else {
                Encoding::PLAIN
            };
            let compressed = compress(actual_codec, dict_bytes);
            let header = dictionary_page_header(
                *dict_entries,
                dict_page_encoding,
                dict_bytes.len() as i32,
                compressed.len() as i32,
            );
            dict_offset = Some(out.len() as i64);
            uncompressed_total += (header.len() + dict_bytes.len()) as i64;
            out.extend_from_slice(&header);
            out.extend_from_slice(&compressed);
        }

        let data_offset = out.len() as i64;
        if self.v2 {
            let rep_runs = if rep_levels.is_empty() {
                Vec::new()
            } else {
                rle_encode(&rep_levels, 1)
            };
            let def_runs = if def_levels.is_empty() {
                Vec::new()
            } else {
                rle_encode(&def_levels, 1)
            };
            let compressed_values = compress(actual_codec, &data_bytes);
            let num_nulls = def_levels.iter().filter(|level| **level == 0).count();
            let header = data_page_v2_header(&V2PageHeader {
                num_values: declared_values,
                num_nulls: num_nulls as i32,
                num_rows: group_rows as i32,
                encoding: spec.encoding,
                def_levels_byte_length: def_runs.len() as i32,
                rep_levels_byte_length: rep_runs.len() as i32,
                uncompressed_size: (rep_runs.len() + def_runs.len() + data_bytes.len()) as i32,
                compressed_size: (rep_runs.len() + def_runs.len() + compressed_values.len()) as i32,
                is_compressed: actual_codec != Compression::UNCOMPRESSED,
            });
            uncompressed_total +=
                (header.len() + rep_runs.len() + def_runs.len() + data_bytes.len()) as i64;
            out.extend_from_slice(&header);
            out.extend_from_slice(&rep_runs);
            out.extend_from_slice(&def_runs);
            out.extend_from_slice(&compressed_values);
        } else {
            let mut body = Vec::new();
            if !rep_levels.is_empty() {
                let runs = rle_encode(&rep_levels, 1);
                body.extend_from_slice(&(runs.len() as u32).to_le_bytes());
                body.extend_from_slice(&runs);
            }
            if !def_levels.is_empty() {
                let runs = rle_encode(&def_levels, 1);
                body.extend_from_slice(&(runs.len() as u32).to_le_bytes());
                body.extend_from_slice(&runs);
            }
            body.extend_from_slice(&data_bytes);
            let compressed = compress(actual_codec, &body);
            let header = data_page_v1_header(
                declared_values,
                spec.encoding,
                body.len() as i32,
                compressed.len() as i32,
            );
            uncompressed_total += (header.len() + body.len()) as i64;
            out.extend_from_slice(&header);
            out.extend_from_slice(&compressed);
        }

        let chunk_start = dict_offset.unwrap_or(data_offset);
        let total_compressed = out.len() as i64 - chunk_start;
        let shift = self.data_page_offset_shift;

        let mut meta = FieldWriter::new();
        meta.i32_field(1, spec.field.physical as i32);
        meta.i32_list_field(2, &[spec.encoding as i32, Encoding::RLE as i32]);
        meta.string_list_field(3, &[spec.field.name]);
        meta.i32_field(4, declared_codec as i32);
        meta.i64_field(5, i64::from(declared_values));
        meta.i64_field(6, uncompressed_total);
        meta.i64_field(7, total_compressed);
        meta.i64_field(9, data_offset + shift);
        if let Some(offset) = dict_offset {
            meta.i64_field(11, offset + shift);
        }
        let meta = meta.finish();

        let mut chunk = FieldWriter::new();
        chunk.i64_field(2, data_offset + shift);
        chunk.struct_field(3, &meta);
        chunk.finish()
    }
}

fn root_element(name: &str, num_children: usize) -> Vec<u8> {
    let mut element = FieldWriter::new();
    element.string_field(4, name);
    element.i32_field(5, num_children as i32);
    element.finish()
}

fn schema_element(field: &SchemaField) -> Vec<u8> {
    let mut element = FieldWriter::new();
    element.i32_field(1, field.physical as i32);
    if let Some(type_length) = field.type_length {
        element.i32_field(2, type_length);
    }
    element.i32_field(3, field.repetition as i32);
    element.string_field(4, field.name);
    if let Some(converted) = field.converted {
        element.i32_field(6, converted);
    }
    if let Some((scale, precision)) = field.scale_precision {
        element.i32_field(7, scale);
        element.i32_field(8, precision);
    }
    element.finish()
}

// ----------------------------------------------------------------------
// Reading helpers

fn read_table(file: Bytes, name: &str) -> Table {
    TableReader::new(ReadOptions::default())
        .read_bytes(file, name)
        .unwrap()
}

fn read_error(file: Bytes) -> ParquetError {
    TableReader::new(ReadOptions::default())
        .read_bytes(file, "broken.parquet")
        .unwrap_err()
}

fn column_types(table: &Table) -> Vec<ColumnType> {
    table
        .columns()
        .iter()
        .map(|column| column.column_type())
        .collect()
}

// ----------------------------------------------------------------------
// Materialization

#[test]
fn test_dictionary_encoded_file() {
    let file = FileBuilder::new(vec![
        optional(
            "id",
            Type::INT32,
            Encoding::PLAIN_DICTIONARY,
            ColumnValues::Int32(vec![Some(0), Some(1)]),
        ),
        optional(
            "bool_col",
            Type::BOOLEAN,
            Encoding::PLAIN,
            ColumnValues::Bool(vec![Some(true), Some(false)]),
        ),
        optional(
            "tinyint_col",
            Type::INT32,
            Encoding::PLAIN_DICTIONARY,
            ColumnValues::Int32(vec![Some(0), Some(1)]),
        ),
        optional(
            "smallint_col",
            Type::INT32,
            Encoding::PLAIN_DICTIONARY,
            ColumnValues::Int32(vec![Some(0), Some(1)]),
        ),
        optional(
            "int_col",
            Type::INT32,
            Encoding::PLAIN_DICTIONARY,
            ColumnValues::Int32(vec![Some(0), Some(1)]),
        ),
        optional(
            "bigint_col",
            Type::INT64,
            Encoding::PLAIN_DICTIONARY,
            ColumnValues::Int64(vec![Some(0), Some(10)]),
        ),
        optional(
            "float_col",
            Type::FLOAT,
            Encoding::PLAIN_DICTIONARY,
            ColumnValues::Float(vec![Some(0.0), Some(1.1)]),
        ),
        optional(
            "double_col",
            Type::DOUBLE,
            Encoding::PLAIN_DICTIONARY,
            ColumnValues::Double(vec![Some(0.0), Some(10.1)]),
        ),
        optional(
            "date_string_col",
            Type::BYTE_ARRAY,
            Encoding::PLAIN_DICTIONARY,
            strings(&[Some("01/01/09"), Some("02/01/09")]),
        ),
        optional(
            "string_col",
            Type::BYTE_ARRAY,
            Encoding::PLAIN_DICTIONARY,
            strings(&[Some("0"), Some("1")]),
        ),
        optional(
            "timestamp_col",
            Type::INT96,
            Encoding::PLAIN,
            ColumnValues::Int96(vec![
                Some([0, 0, 2_440_588]),
                Some([1_000_000_000, 0, 2_440_588]),
            ]),
        ),
    ])
    .build();

    let table = read_table(file, "alltypes_dictionary.parquet");
    assert_eq!(table.name(), "alltypes_dictionary.parquet");
    assert_eq!(table.num_columns(), 11);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(
        column_types(&table),
        vec![
            ColumnType::Integer,
            ColumnType::Boolean,
            ColumnType::Integer,
            ColumnType::Integer,
            ColumnType::Integer,
            ColumnType::Long,
            ColumnType::Float,
            ColumnType::Double,
            ColumnType::String,
            ColumnType::String,
            ColumnType::String,
        ]
    );

    assert_eq!(table.column(0).get_integer(0), Some(0));
    assert_eq!(table.column(0).get_integer(1), Some(1));
    assert_eq!(table.column(1).get_boolean(0), Some(true));
    assert_eq!(table.column(1).get_boolean(1), Some(false));
    assert_eq!(table.column(5).get_long(1), Some(10));
    assert_eq!(table.column(6).get_float(1), Some(1.1));
    assert_eq!(table.column(7).get_double(1), Some(10.1));
    assert_eq!(table.column(8).get_str(0), Some("01/01/09"));
    assert_eq!(table.column(9).get_str(1), Some("1"));
    // without the conversion option INT96 comes back as a string column
    assert_eq!(table.column(10).column_type(), ColumnType::String);
    assert!(table.column(10).get_str(0).is_some());
}

#[test]
fn test_int96_timestamp_conversion_option() {
    let file = FileBuilder::new(vec![optional(
        "timestamp_col",
        Type::INT96,
        Encoding::PLAIN,
        ColumnValues::Int96(vec![
            Some([1_000_000_000, 0, 2_459_335]),
            Some([0, 0, 2_440_588]),
        ]),
    )])
    .build();

    let options = ReadOptions {
        convert_int96_to_timestamp: true,
        ..Default::default()
    };
    let table = TableReader::new(options)
        .read_bytes(file.clone(), "int96.parquet")
        .unwrap();
    let column = table.column(0);
    assert_eq!(column.column_type(), ColumnType::Instant);
    assert_eq!(
        column.get_instant(0),
        Some(
            NaiveDate::from_ymd_opt(2021, 4, 30)
                .unwrap()
                .and_hms_opt(0, 0, 1)
                .unwrap()
                .and_utc()
        )
    );
    assert_eq!(
        column.get_instant(1),
        Some(
            NaiveDate::from_ymd_opt(1970, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc()
        )
    );

    // flag off: raw twelve bytes, hex rendered when binary is not decoded
    let options = ReadOptions {
        treat_unannotated_binary_as_string: false,
        ..Default::default()
    };
    let table = TableReader::new(options)
        .read_bytes(file, "int96.parquet")
        .unwrap();
    let column = table.column(0);
    assert_eq!(column.column_type(), ColumnType::String);
    assert_eq!(column.get_str(1), Some("00000000000000008c3d2500"));
}

#[test]
fn test_unannotated_binary_columns() {
    let file = FileBuilder::new(vec![
        optional(
            "foo",
            Type::BYTE_ARRAY,
            Encoding::PLAIN,
            ColumnValues::Bytes(vec![Some(vec![0]), Some(vec![1])]),
        ),
        optional(
            "fixed",
            Type::FIXED_LEN_BYTE_ARRAY,
            Encoding::PLAIN,
            ColumnValues::Bytes(vec![Some(b"abc".to_vec()), Some(vec![0x00, 0x0A, 0xFF])]),
        )
        .with_type_length(3),
    ])
    .build();

    // default: bytes are decoded as UTF-8
    let table = read_table(file.clone(), "binary.parquet");
    assert_eq!(table.column(0).column_type(), ColumnType::String);
    assert_eq!(table.column(0).get_str(0), Some("\u{0}"));
    assert_eq!(table.column(0).get_str(1), Some("\u{1}"));
    assert_eq!(table.column(1).get_str(0), Some("abc"));

    // opt out: bytes render as hex pairs
    let options = ReadOptions {
        treat_unannotated_binary_as_string: false,
        ..Default::default()
    };
    let table = TableReader::new(options)
        .read_bytes(file, "binary.parquet")
        .unwrap();
    assert_eq!(table.column(0).get_str(0), Some("00"));
    assert_eq!(table.column(0).get_str(1), Some("01"));
    assert_eq!(table.column(1).get_str(0), Some("616263"));
    assert_eq!(table.column(1).get_str(1), Some("000aff"));
}

#[test]
fn test_data_page_v2_file() {
    let file = FileBuilder::new(vec![
        optional(
            "a",
            Type::BYTE_ARRAY,
            Encoding::RLE_DICTIONARY,
            strings(&[Some("abc"), Some("b"), None, Some("abc"), Some("")]),
        )
        .with_converted(CONVERTED_UTF8),
        optional(
            "b",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(1), None, Some(3), Some(4), Some(5)]),
        ),
        optional(
            "c",
            Type::DOUBLE,
            Encoding::PLAIN,
            ColumnValues::Double(vec![Some(1.5), Some(2.5), Some(3.5), None, Some(5.5)]),
        ),
        optional(
            "d",
            Type::BOOLEAN,
            Encoding::PLAIN,
            ColumnValues::Bool(vec![
                Some(true),
                Some(false),
                Some(true),
                None,
                Some(false),
            ]),
        ),
        repeated(
            "e",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::RepeatedInt32(vec![
                Some(vec![1, 2]),
                None,
                Some(vec![3]),
                Some(vec![4, 5, 6]),
                Some(vec![7]),
            ]),
        ),
    ])
    .with_v2()
    .with_version(2)
    .build();

    let table = read_table(file, "datapage_v2.parquet");
    assert_eq!(table.num_columns(), 5);
    assert_eq!(table.num_rows(), 5);
    assert_eq!(
        column_types(&table),
        vec![
            ColumnType::String,
            ColumnType::Integer,
            ColumnType::Double,
            ColumnType::Boolean,
            ColumnType::Text,
        ]
    );

    let a = table.column(0);
    assert_eq!(a.get_str(0), Some("abc"));
    assert_eq!(a.get_str(1), Some("b"));
    assert!(a.is_null(2));
    assert_eq!(a.get_str(3), Some("abc"));
    assert_eq!(a.get_str(4), Some(""));

    let b = table.column(1);
    assert_eq!(b.get_integer(0), Some(1));
    assert!(b.is_null(1));
    assert_eq!(b.get_integer(4), Some(5));

    let c = table.column(2);
    assert_eq!(c.get_double(0), Some(1.5));
    assert!(c.is_null(3));

    let d = table.column(3);
    assert_eq!(d.get_boolean(0), Some(true));
    assert!(d.is_null(3));
    assert_eq!(d.get_boolean(4), Some(false));

    let e = table.column(4);
    assert_eq!(e.get_str(0), Some("[1, 2]"));
    assert!(e.is_null(1));
    assert_eq!(e.get_str(2), Some("[3]"));
    assert_eq!(e.get_str(3), Some("[4, 5, 6]"));
    assert_eq!(e.get_str(4), Some("[7]"));
}

#[test]
fn test_delta_encoded_columns() {
    let file = FileBuilder::new(vec![
        required(
            "a",
            Type::INT32,
            Encoding::DELTA_BINARY_PACKED,
            ColumnValues::Int32(vec![Some(7), Some(5), Some(3), Some(1), Some(2)]),
        ),
        required(
            "b",
            Type::INT64,
            Encoding::DELTA_BINARY_PACKED,
            ColumnValues::Int64(vec![
                Some(10_000_000_000),
                Some(10_000_000_010),
                Some(9_999_999_990),
                Some(10_000_000_000),
                Some(10_000_000_001),
            ]),
        ),
        required(
            "c",
            Type::BYTE_ARRAY,
            Encoding::DELTA_LENGTH_BYTE_ARRAY,
            strings(&[Some("hello"), Some(""), Some("world"), Some("δδ"), Some("x")]),
        )
        .with_converted(CONVERTED_UTF8),
        required(
            "d",
            Type::BYTE_ARRAY,
            Encoding::DELTA_BYTE_ARRAY,
            strings(&[
                Some("axis"),
                Some("axle"),
                Some("beta"),
                Some("betas"),
                Some("caret"),
            ]),
        )
        .with_converted(CONVERTED_UTF8),
    ])
    .with_v2()
    .with_version(2)
    .build();

    let table = read_table(file, "delta.parquet");
    assert_eq!(table.num_rows(), 5);

    let a = table.column(0);
    for (row, expected) in [7, 5, 3, 1, 2].iter().enumerate() {
        assert_eq!(a.get_integer(row), Some(*expected));
    }

    let b = table.column(1);
    assert_eq!(b.get_long(0), Some(10_000_000_000));
    assert_eq!(b.get_long(2), Some(9_999_999_990));
    assert_eq!(b.get_long(4), Some(10_000_000_001));

    let c = table.column(2);
    assert_eq!(c.get_str(0), Some("hello"));
    assert_eq!(c.get_str(1), Some(""));
    assert_eq!(c.get_str(2), Some("world"));
    assert_eq!(c.get_str(3), Some("δδ"));
    assert_eq!(c.get_str(4), Some("x"));

    let d = table.column(3);
    assert_eq!(d.get_str(0), Some("axis"));
    assert_eq!(d.get_str(1), Some("axle"));
    assert_eq!(d.get_str(2), Some("beta"));
    assert_eq!(d.get_str(3), Some("betas"));
    assert_eq!(d.get_str(4), Some("caret"));
}

#[test]
fn test_annotated_column_conversions() {
    let file = FileBuilder::new(vec![
        optional(
            "date",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(0), Some(18_747)]),
        )
        .with_converted(CONVERTED_DATE),
        optional(
            "time_ms",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(0), Some(86_399_999)]),
        )
        .with_converted(CONVERTED_TIME_MILLIS),
        optional(
            "time_us",
            Type::INT64,
            Encoding::PLAIN,
            ColumnValues::Int64(vec![Some(0), Some(1_500_000)]),
        )
        .with_converted(CONVERTED_TIME_MICROS),
        optional(
            "amount",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(123), Some(-50)]),
        )
        .with_decimal(9, 2),
        optional(
            "big_amount",
            Type::INT64,
            Encoding::PLAIN,
            ColumnValues::Int64(vec![Some(1_234_567), Some(-1_000)]),
        )
        .with_decimal(18, 3),
        optional(
            "ts_us",
            Type::INT64,
            Encoding::PLAIN,
            ColumnValues::Int64(vec![
                Some(1_619_136_000_000_000),
                Some(1_619_136_001_500_000),
            ]),
        )
        .with_converted(CONVERTED_TIMESTAMP_MICROS),
        optional(
            "count",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(-1), Some(0)]),
        )
        .with_converted(CONVERTED_UINT_32),
    ])
    .build();

    let table = read_table(file, "annotated.parquet");
    assert_eq!(
        column_types(&table),
        vec![
            ColumnType::Date,
            ColumnType::Time,
            ColumnType::Time,
            ColumnType::Double,
            ColumnType::Double,
            ColumnType::DateTime,
            ColumnType::Long,
        ]
    );

    let date = table.column(0);
    assert_eq!(date.get_date(0), NaiveDate::from_ymd_opt(1970, 1, 1));
    assert_eq!(date.get_date(1), NaiveDate::from_ymd_opt(2021, 4, 30));

    let time_ms = table.column(1);
    assert_eq!(time_ms.get_time(0), NaiveTime::from_hms_opt(0, 0, 0));
    assert_eq!(
        time_ms.get_time(1),
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    );

    let time_us = table.column(2);
    assert_eq!(
        time_us.get_time(1),
        NaiveTime::from_hms_micro_opt(0, 0, 1, 500_000)
    );

    let amount = table.column(3);
    assert_eq!(amount.get_double(0), Some(123.0 / 100.0));
    assert_eq!(amount.get_double(1), Some(-50.0 / 100.0));

    let big_amount = table.column(4);
    assert_eq!(big_amount.get_double(0), Some(1_234_567.0 / 1_000.0));
    assert_eq!(big_amount.get_double(1), Some(-1.0));

    let ts_us = table.column(5);
    assert_eq!(
        ts_us.get_date_time(0),
        Some(
            NaiveDate::from_ymd_opt(2021, 4, 23)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        )
    );
    assert_eq!(
        ts_us.get_date_time(1),
        Some(
            NaiveDate::from_ymd_opt(2021, 4, 23)
                .unwrap()
                .and_hms_micro_opt(0, 0, 1, 500_000)
                .unwrap()
        )
    );

    // unsigned 32 bit values widen to long instead of going negative
    let count = table.column(6);
    assert_eq!(count.get_long(0), Some(4_294_967_295));
    assert_eq!(count.get_long(1), Some(0));
}

#[test]
fn test_int_annotations_and_nulls() {
    let file = FileBuilder::new(vec![
        optional(
            "bool",
            Type::BOOLEAN,
            Encoding::PLAIN,
            ColumnValues::Bool(vec![Some(true), Some(false)]),
        ),
        optional(
            "int8_a",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(0), Some(127)]),
        )
        .with_converted(CONVERTED_INT_8),
        optional(
            "int8_b",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(-127), Some(1)]),
        )
        .with_converted(CONVERTED_INT_8),
        optional(
            "int16_a",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(0), Some(32_767)]),
        )
        .with_converted(CONVERTED_INT_16),
        optional(
            "int16_b",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(0), Some(-32_767)]),
        )
        .with_converted(CONVERTED_INT_16),
        optional(
            "int32_a",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(0), Some(65_000)]),
        ),
        optional(
            "int32_b",
            Type::INT32,
            Encoding::PLAIN,
            ColumnValues::Int32(vec![Some(0), Some(-65_000)]),
        ),
        optional(
            "int64_a",
            Type::INT64,
            Encoding::PLAIN,
            ColumnValues::Int64(vec![Some(0), Some(1_000_000_000)]),
        ),
        optional(
            "int64_b",
            Type::INT64,
            Encoding::PLAIN,
            ColumnValues::Int64(vec![Some(0), Some(-1_000_000_000)]),
        ),
        optional(
            "double_a",
            Type::DOUBLE,
            Encoding::PLAIN,
            ColumnValues::Double(vec![None, Some(1.5)]),
        ),
        optional(
            "double_b",
            Type::DOUBLE,
            Encoding::PLAIN,
            ColumnValues::Double(vec![Some(2.5), None]),
        ),
        optional(
            "ts_ms",
            Type::INT64,
            Encoding::PLAIN,
            ColumnValues::Int64(vec![Some(1_619_136_000_000), Some(1_619_136_001_000)]),
        )
        .with_converted(CONVERTED_TIMESTAMP_MILLIS),
        optional(
            "text",
            Type::BYTE_ARRAY,
            Encoding::PLAIN,
            strings(&[Some("string1"), Some("string2")]),
        )
        .with_converted(CONVERTED_UTF8),
    ])
    .build();

    let table = read_table(file, "pandas_pyarrow.parquet");
    assert_eq!(table.name(), "pandas_pyarrow.parquet");
    assert_eq!(table.num_columns(), 13);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(
        column_types(&table),
        vec![
            ColumnType::Boolean,
            ColumnType::Integer,
            ColumnType::Integer,
            ColumnType::Integer,
            ColumnType::Integer,
            ColumnType::Integer,
            ColumnType::Integer,
            ColumnType::Long,
            ColumnType::Long,
            ColumnType::Double,
            ColumnType::Double,
            ColumnType::DateTime,
            ColumnType::String,
        ]
    );

    assert_eq!(table.column(1).get_integer(1), Some(127));
    assert_eq!(table.column(2).get_integer(0), Some(-127));
    assert_eq!(table.column(3).get_integer(1), Some(32_767));
    assert_eq!(table.column(4).get_integer(1), Some(-32_767));
    assert_eq!(table.column(5).get_integer(1), Some(65_000));
    assert_eq!(table.column(6).get_integer(1), Some(-65_000));
    assert_eq!(table.column(7).get_long(1), Some(1_000_000_000));
    assert_eq!(table.column(8).get_long(1), Some(-1_000_000_000));

    let double_a = table.column(9);
    assert!(double_a.is_null(0));
    assert_eq!(double_a.get_double(0), None);
    assert_eq!(double_a.get_double(1), Some(1.5));

    let double_b = table.column(10);
    assert_eq!(double_b.get_double(0), Some(2.5));
    assert!(double_b.is_null(1));

    let ts_ms = table.column(11);
    assert_eq!(
        ts_ms.get_date_time(0),
        Some(
            NaiveDate::from_ymd_opt(2021, 4, 23)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        )
    );
    assert_eq!(
        ts_ms.get_date_time(1),
        Some(
            NaiveDate::from_ymd_opt(2021, 4, 23)
                .unwrap()
                .and_hms_opt(0, 0, 1)
                .unwrap()
        )
    );

    assert_eq!(table.column(12).get_str(0), Some("string1"));
    assert_eq!(table.column(12).get_str(1), Some("string2"));
}

#[test]
fn test_multiple_row_groups_concatenate() {
    let values: Vec<Option<i64>> = (10..15).map(Some).collect();
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT64,
        Encoding::PLAIN,
        ColumnValues::Int64(values),
    )])
    .with_row_groups(&[3, 2])
    .build();

    let table = read_table(file, "groups.parquet");
    assert_eq!(table.num_rows(), 5);
    let column = table.column(0);
    for row in 0..5 {
        assert_eq!(column.get_long(row), Some(10 + row as i64));
    }
}

#[test]
fn test_repeated_column_renders_lists() {
    let file = FileBuilder::new(vec![repeated(
        "tags",
        Type::BYTE_ARRAY,
        Encoding::PLAIN,
        string_lists(&[Some(vec!["a", "b"]), None, Some(vec!["c"])]),
    )
    .with_converted(CONVERTED_UTF8)])
    .build();

    let table = read_table(file, "tags.parquet");
    let column = table.column(0);
    assert_eq!(column.column_type(), ColumnType::Text);
    assert_eq!(column.get_str(0), Some("[a, b]"));
    assert!(column.is_null(1));
    assert_eq!(column.get_str(2), Some("[c]"));
}

// ----------------------------------------------------------------------
// Compression

fn compressed_file(codec: Compression, v2: bool) -> Bytes {
    let numbers: Vec<Option<i64>> = (0..100).map(|v| Some(v * 3)).collect();
    let words = ["alpha", "beta", "gamma"];
    let labels: Vec<Option<Vec<u8>>> = (0..100)
        .map(|i| Some(words[i % 3].as_bytes().to_vec()))
        .collect();
    let label_encoding = if v2 {
        Encoding::RLE_DICTIONARY
    } else {
        Encoding::PLAIN_DICTIONARY
    };
    let mut builder = FileBuilder::new(vec![
        required(
            "numbers",
            Type::INT64,
            Encoding::PLAIN,
            ColumnValues::Int64(numbers),
        ),
        optional(
            "labels",
            Type::BYTE_ARRAY,
            label_encoding,
            ColumnValues::Bytes(labels),
        )
        .with_converted(CONVERTED_UTF8),
    ])
    .with_codec(codec);
    if v2 {
        builder = builder.with_v2().with_version(2);
    }
    builder.build()
}

fn check_compressed(codec: Compression, v2: bool) {
    let table = read_table(compressed_file(codec, v2), "compressed.parquet");
    assert_eq!(table.num_rows(), 100);
    let numbers = table.column(0);
    let labels = table.column(1);
    let words = ["alpha", "beta", "gamma"];
    for row in 0..100 {
        assert_eq!(numbers.get_long(row), Some(row as i64 * 3));
        assert_eq!(labels.get_str(row), Some(words[row % 3]));
    }
}

#[test]
fn test_snappy_compressed_pages() {
    check_compressed(Compression::SNAPPY, false);
}

#[test]
fn test_gzip_compressed_pages() {
    check_compressed(Compression::GZIP, false);
}

#[test]
fn test_snappy_compressed_v2_pages() {
    check_compressed(Compression::SNAPPY, true);
}

// ----------------------------------------------------------------------
// Table naming

#[test]
fn test_table_name_from_path() {
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT32,
        Encoding::PLAIN,
        ColumnValues::Int32(vec![Some(42)]),
    )])
    .build();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("measurements.parquet");
    std::fs::write(&path, file.as_ref()).unwrap();

    let table = TableReader::new(ReadOptions::default())
        .read_path(&path)
        .unwrap();
    assert_eq!(table.name(), "measurements.parquet");
    assert_eq!(table.column(0).get_integer(0), Some(42));

    let options = ReadOptions {
        table_name: Some("ANOTHERNAME".to_string()),
        ..Default::default()
    };
    let table = TableReader::new(options).read_path(&path).unwrap();
    assert_eq!(table.name(), "ANOTHERNAME");
}

// ----------------------------------------------------------------------
// Malformed and unsupported files

#[test]
fn test_corrupt_footer_magic() {
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT32,
        Encoding::PLAIN,
        ColumnValues::Int32(vec![Some(1)]),
    )])
    .build();
    let mut bytes = file.to_vec();
    let last = bytes.len() - 1;
    bytes[last] = b'X';

    let err = read_error(Bytes::from(bytes));
    assert!(matches!(err, ParquetError::CorruptFooter(_)), "{err}");
    assert!(err.to_string().contains("Magic bytes"), "{err}");
}

#[test]
fn test_corrupt_footer_length() {
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT32,
        Encoding::PLAIN,
        ColumnValues::Int32(vec![Some(1)]),
    )])
    .build();
    let mut bytes = file.to_vec();
    let len_offset = bytes.len() - 8;
    bytes[len_offset..len_offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());

    let err = read_error(Bytes::from(bytes));
    assert!(matches!(err, ParquetError::CorruptFooter(_)), "{err}");
    assert!(err.to_string().contains("Reported metadata length"), "{err}");
}

#[test]
fn test_unsupported_schema_version() {
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT32,
        Encoding::PLAIN,
        ColumnValues::Int32(vec![Some(1)]),
    )])
    .with_version(3)
    .build();

    let err = read_error(file);
    assert!(
        matches!(err, ParquetError::UnsupportedSchemaVersion(3)),
        "{err}"
    );
}

#[test]
fn test_unsupported_compression_codec() {
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT32,
        Encoding::PLAIN,
        ColumnValues::Int32(vec![Some(1), Some(2)]),
    )])
    .with_declared_codec(Compression::LZO)
    .build();

    let err = read_error(file);
    assert!(
        matches!(err, ParquetError::UnsupportedCompressionCodec(_)),
        "{err}"
    );
    assert!(err.to_string().contains("LZO"), "{err}");
}

#[test]
fn test_unsupported_encoding() {
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT32,
        Encoding::BYTE_STREAM_SPLIT,
        ColumnValues::Int32(vec![Some(1), Some(2)]),
    )])
    .build();

    let err = read_error(file);
    assert!(matches!(err, ParquetError::UnsupportedEncoding(_)), "{err}");
    assert!(err.to_string().contains("BYTE_STREAM_SPLIT"), "{err}");
}

#[test]
fn test_truncated_file() {
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT32,
        Encoding::PLAIN,
        ColumnValues::Int32(vec![Some(1), Some(2)]),
    )])
    .with_data_page_offset_shift(1 << 20)
    .build();

    let err = read_error(file);
    assert!(matches!(err, ParquetError::TruncatedFile(_)), "{err}");
}

#[test]
fn test_truncated_page_values() {
    // the page header declares five values but only two are encoded
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT32,
        Encoding::PLAIN,
        ColumnValues::Int32(vec![Some(1), Some(2)]),
    )])
    .with_extra_declared_values(3)
    .build();

    let err = read_error(file);
    assert!(matches!(err, ParquetError::TruncatedPage(_)), "{err}");
}

#[test]
fn test_row_count_mismatch() {
    let file = FileBuilder::new(vec![required(
        "value",
        Type::INT32,
        Encoding::PLAIN,
        ColumnValues::Int32(vec![Some(1), Some(2)]),
    )])
    .with_num_rows(3)
    .build();

    let err = read_error(file);
    assert!(matches!(err, ParquetError::RowCountMismatch(_)), "{err}");
}

#[test]
fn test_nested_schema_rejected() {
    // schema: root -> optional group a_list (LIST) -> repeated element
    let mut root = FieldWriter::new();
    root.string_field(4, "schema");
    root.i32_field(5, 1);
    let root = root.finish();

    let mut group = FieldWriter::new();
    group.i32_field(3, Repetition::OPTIONAL as i32);
    group.string_field(4, "a_list");
    group.i32_field(5, 1);
    group.i32_field(6, CONVERTED_LIST);
    let group = group.finish();

    let mut leaf = FieldWriter::new();
    leaf.i32_field(1, Type::BYTE_ARRAY as i32);
    leaf.i32_field(3, Repetition::REPEATED as i32);
    leaf.string_field(4, "element");
    leaf.i32_field(6, CONVERTED_UTF8);
    let leaf = leaf.finish();

    let mut metadata = FieldWriter::new();
    metadata.i32_field(1, 1);
    metadata.struct_list_field(2, &[root, group, leaf]);
    metadata.i64_field(3, 0);
    metadata.struct_list_field(4, &[]);
    let metadata = metadata.finish();

    let mut out = MAGIC.to_vec();
    out.extend_from_slice(&metadata);
    out.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
    out.extend_from_slice(MAGIC);

    let err = read_error(Bytes::from(out));
    assert!(matches!(err, ParquetError::UnsupportedSchema(_)), "{err}");
    assert!(err.to_string().contains("a_list.element"), "{err}");
}

#[test]
fn test_interval_annotation_rejected() {
    let file = FileBuilder::new(vec![optional(
        "span",
        Type::FIXED_LEN_BYTE_ARRAY,
        Encoding::PLAIN,
        ColumnValues::Bytes(vec![Some(vec![0; 12])]),
    )
    .with_type_length(12)
    .with_converted(CONVERTED_INTERVAL)])
    .build();

    let err = read_error(file);
    assert!(matches!(err, ParquetError::UnsupportedSchema(_)), "{err}");
    assert!(err.to_string().contains("INTERVAL"), "{err}");
}
