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

//! Contains all supported decoders for Parquet.

use std::{cmp, marker::PhantomData, mem};

use bytes::Bytes;
use num::cast::AsPrimitive;
use num::FromPrimitive;

use super::rle::RleDecoder;

use crate::basic::*;
use crate::data_type::private::ParquetValueType;
use crate::data_type::*;
use crate::ensure_phys_ty;
use crate::errors::{ParquetError, Result};
use crate::schema::types::ColumnDescPtr;
use crate::util::bit_util::{self, BitReader, FromBytes};

// ----------------------------------------------------------------------
// Decoders

/// A decoder for the values of a data page, one variant per supported pairing
/// of encoding and physical type.
///
/// The variant is resolved once per column chunk through
/// [`ValueDecoder::try_new`], every later call dispatches on the tag. The
/// dictionary variant is the exception, it is established from the dictionary
/// page through [`DictDecoder::set_dict`].
pub enum ValueDecoder<T: DataType> {
    /// PLAIN encoded values
    Plain(PlainDecoder<T>),
    /// RLE/bit-packed hybrid encoded boolean values
    RleValue(RleValueDecoder<T>),
    /// DELTA_BINARY_PACKED encoded integer values
    DeltaBitPack(DeltaBitPackDecoder),
    /// DELTA_LENGTH_BYTE_ARRAY encoded byte array values
    DeltaLengthByteArray(DeltaLengthByteArrayDecoder<T>),
    /// DELTA_BYTE_ARRAY encoded byte array values
    DeltaByteArray(DeltaByteArrayDecoder<T>),
    /// Dictionary indices resolved against a decoded dictionary page
    Dictionary(DictDecoder<T>),
}

impl<T: DataType> ValueDecoder<T> {
    /// Resolves the decoder for `encoding` on a column of this physical type.
    ///
    /// Returns [`ParquetError::UnsupportedEncoding`] when the encoding does not
    /// apply to the physical type. Dictionary encodings cannot be initialized
    /// through this function.
    pub fn try_new(descr: &ColumnDescPtr, encoding: Encoding) -> Result<Self> {
        match (encoding, T::get_physical_type()) {
            (Encoding::PLAIN, _) => Ok(Self::Plain(PlainDecoder::new(descr.type_length()))),
            (Encoding::RLE_DICTIONARY | Encoding::PLAIN_DICTIONARY, _) => Err(general_err!(
                "Cannot initialize this encoding through this function"
            )),
            (Encoding::RLE, Type::BOOLEAN) => Ok(Self::RleValue(RleValueDecoder::new())),
            (Encoding::DELTA_BINARY_PACKED, Type::INT32 | Type::INT64) => {
                Ok(Self::DeltaBitPack(DeltaBitPackDecoder::new()))
            }
            (Encoding::DELTA_LENGTH_BYTE_ARRAY, Type::BYTE_ARRAY) => {
                Ok(Self::DeltaLengthByteArray(DeltaLengthByteArrayDecoder::new()))
            }
            (Encoding::DELTA_BYTE_ARRAY, Type::BYTE_ARRAY | Type::FIXED_LEN_BYTE_ARRAY) => {
                Ok(Self::DeltaByteArray(DeltaByteArrayDecoder::new()))
            }
            (encoding, physical_type) => Err(ParquetError::UnsupportedEncoding(format!(
                "{encoding} for {physical_type} column"
            ))),
        }
    }

    /// Sets the data of a page to decode, which should contain `num_values` of
    /// values to decode.
    pub fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        match self {
            Self::Plain(d) => d.set_data(data, num_values),
            Self::RleValue(d) => d.set_data(data, num_values),
            Self::DeltaBitPack(d) => d.set_data(data, num_values),
            Self::DeltaLengthByteArray(d) => d.set_data(data, num_values),
            Self::DeltaByteArray(d) => d.set_data(data, num_values),
            Self::Dictionary(d) => d.set_data(data, num_values),
        }
    }

    /// Consumes values from this decoder and writes the results to `buffer`.
    /// This will try to fill up `buffer`.
    ///
    /// Returns the actual number of values decoded, which should be equal to
    /// `buffer.len()` unless the remaining number of values is less than
    /// `buffer.len()`.
    pub fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        match self {
            Self::Plain(d) => d.get(buffer),
            Self::RleValue(d) => d.get(buffer),
            Self::DeltaBitPack(d) => T::T::delta_decode(d, buffer),
            Self::DeltaLengthByteArray(d) => d.get(buffer),
            Self::DeltaByteArray(d) => d.get(buffer),
            Self::Dictionary(d) => d.get(buffer),
        }
    }

    /// Returns the number of values left in this decoder stream.
    pub fn values_left(&self) -> usize {
        match self {
            Self::Plain(d) => d.values_left(),
            Self::RleValue(d) => d.values_left(),
            Self::DeltaBitPack(d) => d.values_left(),
            Self::DeltaLengthByteArray(d) => d.values_left(),
            Self::DeltaByteArray(d) => d.values_left(),
            Self::Dictionary(d) => d.values_left(),
        }
    }

    /// Returns the encoding for this decoder.
    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Plain(_) => Encoding::PLAIN,
            Self::RleValue(_) => Encoding::RLE,
            Self::DeltaBitPack(_) => Encoding::DELTA_BINARY_PACKED,
            Self::DeltaLengthByteArray(_) => Encoding::DELTA_LENGTH_BYTE_ARRAY,
            Self::DeltaByteArray(_) => Encoding::DELTA_BYTE_ARRAY,
            Self::Dictionary(_) => Encoding::RLE_DICTIONARY,
        }
    }
}

// ----------------------------------------------------------------------
// PLAIN Decoding

#[derive(Default)]
pub struct PlainDecoderDetails {
    // The remaining number of values in the byte array
    pub(crate) num_values: usize,

    // The current starting index in the byte array. Not used when `T` is bool.
    pub(crate) start: usize,

    // The length for the type `T`. Only used when `T` is `FixedLenByteArrayType`
    pub(crate) type_length: i32,

    // The byte array to decode from. Not set if `T` is bool.
    pub(crate) data: Option<Bytes>,

    // Read `data` bit by bit. Only set if `T` is bool.
    pub(crate) bit_reader: Option<BitReader>,
}

/// Plain decoding that supports all types.
/// Values are encoded back to back. For native types, data is encoded as little endian.
/// Floating point types are encoded in IEEE.
pub struct PlainDecoder<T: DataType> {
    // The binary details needed for decoding
    inner: PlainDecoderDetails,

    // To allow `T` in the generic parameter for this struct. This doesn't take any
    // space.
    _phantom: PhantomData<T>,
}

impl<T: DataType> PlainDecoder<T> {
    /// Creates new plain decoder.
    pub fn new(type_length: i32) -> Self {
        PlainDecoder {
            inner: PlainDecoderDetails {
                type_length,
                num_values: 0,
                start: 0,
                data: None,
                bit_reader: None,
            },
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        T::T::set_data(&mut self.inner, data, num_values);
        Ok(())
    }

    #[inline]
    pub fn values_left(&self) -> usize {
        self.inner.num_values
    }

    #[inline]
    pub fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        T::T::decode(buffer, &mut self.inner)
    }
}

// ----------------------------------------------------------------------
// RLE_DICTIONARY/PLAIN_DICTIONARY Decoding

/// Dictionary decoder.
/// The dictionary encoding builds a dictionary of values encountered in a given column.
/// The dictionary is stored in a dictionary page per column chunk, the data pages then
/// hold RLE/bit-packed indices into it.
pub struct DictDecoder<T: DataType> {
    // The dictionary, which maps ids to the values
    dictionary: Vec<T::T>,

    // Whether `dictionary` has been initialized
    has_dictionary: bool,

    // The decoder for the value ids
    rle_decoder: Option<RleDecoder>,

    // Number of values left in the data stream
    num_values: usize,
}

impl<T: DataType> DictDecoder<T> {
    /// Creates new dictionary decoder.
    pub fn new() -> Self {
        Self {
            dictionary: vec![],
            has_dictionary: false,
            rle_decoder: None,
            num_values: 0,
        }
    }

    /// Decodes the dictionary page values using `decoder` and stores them for lookup.
    pub fn set_dict(&mut self, mut decoder: PlainDecoder<T>) -> Result<()> {
        let num_values = decoder.values_left();
        self.dictionary.resize(num_values, T::T::default());
        let _ = decoder.get(&mut self.dictionary)?;
        self.has_dictionary = true;
        Ok(())
    }

    pub fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        // First byte in `data` is bit width
        let bit_width = *data.first().ok_or_else(|| {
            ParquetError::TruncatedPage("missing bit width for dictionary indices".to_string())
        })?;
        // Indices are 32 bit at most
        if bit_width > 32 {
            return Err(general_err!(
                "Invalid or corrupted dictionary index bit width {}",
                bit_width
            ));
        }
        let mut rle_decoder = RleDecoder::new(bit_width);
        rle_decoder.set_data(data.slice(1..));
        self.num_values = num_values;
        self.rle_decoder = Some(rle_decoder);
        Ok(())
    }

    pub fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        assert!(self.rle_decoder.is_some());
        assert!(self.has_dictionary, "Must call set_dict() first!");

        let rle = self.rle_decoder.as_mut().unwrap();
        let num_values = cmp::min(buffer.len(), self.num_values);
        let values_read = rle.get_batch_with_dict(&self.dictionary[..], buffer, num_values)?;
        self.num_values -= values_read;
        Ok(values_read)
    }

    /// Number of values left in this decoder stream
    pub fn values_left(&self) -> usize {
        self.num_values
    }
}

// ----------------------------------------------------------------------
// RLE Decoding

/// RLE/Bit-Packing hybrid decoding for values.
/// Currently is used only for boolean values, with a bit width of 1.
pub struct RleValueDecoder<T: DataType> {
    values_left: usize,
    decoder: RleDecoder,
    _phantom: PhantomData<T>,
}

impl<T: DataType> RleValueDecoder<T> {
    pub fn new() -> Self {
        Self {
            values_left: 0,
            decoder: RleDecoder::new(1),
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        // Only support RLE value reader for boolean values with bit width of 1.
        ensure_phys_ty!(Type::BOOLEAN, "RleValueDecoder only supports BoolType");

        // The data stream carries an i32 length prefix that we need to remove.
        const I32_SIZE: usize = mem::size_of::<i32>();
        if data.len() < I32_SIZE {
            return Err(ParquetError::TruncatedPage(
                "RLE value data is shorter than its length prefix".to_string(),
            ));
        }
        let data_size = bit_util::read_num_bytes::<i32>(I32_SIZE, data.as_ref());
        let end = usize::try_from(data_size)
            .ok()
            .and_then(|size| size.checked_add(I32_SIZE))
            .filter(|end| *end <= data.len())
            .ok_or_else(|| {
                ParquetError::TruncatedPage(format!(
                    "RLE value data declares {} bytes, page holds {}",
                    data_size,
                    data.len() - I32_SIZE
                ))
            })?;
        self.decoder = RleDecoder::new(1);
        self.decoder.set_data(data.slice(I32_SIZE..end));
        self.values_left = num_values;
        Ok(())
    }

    #[inline]
    pub fn values_left(&self) -> usize {
        self.values_left
    }

    #[inline]
    pub fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        let num_values = cmp::min(buffer.len(), self.values_left);
        let values_read = self.decoder.get_batch(&mut buffer[..num_values])?;
        self.values_left -= values_read;
        Ok(values_read)
    }
}

// ----------------------------------------------------------------------
// DELTA_BINARY_PACKED Decoding

/// Delta binary packed decoder.
/// Supports INT32 and INT64 types, the block state is tracked as `i64` and
/// narrowed to the value width when values are read.
pub struct DeltaBitPackDecoder {
    bit_reader: BitReader,
    initialized: bool,

    // Header info
    /// The number of values in each block
    block_size: usize,
    /// The number of values that remain to be read in the current page
    values_left: usize,
    /// The number of mini-blocks in each block
    mini_blocks_per_block: usize,
    /// The number of values in each mini block
    values_per_mini_block: usize,

    // Per block info
    /// The minimum delta in the block
    min_delta: i64,
    /// The byte offset of the end of the current block
    block_end_offset: usize,
    /// The index on the current mini block
    mini_block_idx: usize,
    /// The bit widths of each mini block in the current block
    mini_block_bit_widths: Vec<u8>,
    /// The number of values remaining in the current mini block
    mini_block_remaining: usize,

    /// The first value from the block header if not consumed
    first_value: Option<i64>,
    /// The last value to compute offsets from
    last_value: i64,
}

impl DeltaBitPackDecoder {
    /// Creates new delta bit packed decoder.
    pub fn new() -> Self {
        Self {
            bit_reader: BitReader::from(vec![]),
            initialized: false,
            block_size: 0,
            values_left: 0,
            mini_blocks_per_block: 0,
            values_per_mini_block: 0,
            min_delta: 0,
            block_end_offset: 0,
            mini_block_idx: 0,
            mini_block_bit_widths: vec![],
            mini_block_remaining: 0,
            first_value: None,
            last_value: 0,
        }
    }

    /// Returns the current offset
    pub fn get_offset(&self) -> usize {
        assert!(self.initialized, "Bit reader is not initialized");
        match self.values_left {
            // If we've exhausted this page report the end of the current block
            // as we may not have consumed the trailing padding
            //
            // The max is necessary to handle pages which don't contain more than
            // one value and therefore have no blocks, but still contain a page header
            0 => self.bit_reader.get_byte_offset().max(self.block_end_offset),
            _ => self.bit_reader.get_byte_offset(),
        }
    }

    /// Initializes the next block and the first mini block within it
    #[inline]
    fn next_block(&mut self) -> Result<()> {
        let min_delta = self
            .bit_reader
            .get_zigzag_vlq_int()
            .ok_or_else(|| eof_err!("Not enough data to decode 'min_delta'"))?;

        self.min_delta = min_delta;

        self.mini_block_bit_widths.clear();
        self.bit_reader
            .get_aligned_bytes(&mut self.mini_block_bit_widths, self.mini_blocks_per_block);

        let mut offset = self.bit_reader.get_byte_offset();
        let mut remaining = self.values_left;

        // Compute the end offset of the current block
        for b in &mut self.mini_block_bit_widths {
            if remaining == 0 {
                // Specification requires handling arbitrary bit widths
                // for trailing mini blocks
                *b = 0;
            }
            remaining = remaining.saturating_sub(self.values_per_mini_block);
            offset += *b as usize * self.values_per_mini_block / 8;
        }
        self.block_end_offset = offset;

        if self.mini_block_bit_widths.len() != self.mini_blocks_per_block {
            return Err(eof_err!("insufficient mini block bit widths"));
        }

        self.mini_block_remaining = self.values_per_mini_block;
        self.mini_block_idx = 0;

        Ok(())
    }

    /// Initializes the next mini block
    #[inline]
    fn next_mini_block(&mut self) -> Result<()> {
        if self.mini_block_idx + 1 < self.mini_block_bit_widths.len() {
            self.mini_block_idx += 1;
            self.mini_block_remaining = self.values_per_mini_block;
            Ok(())
        } else {
            self.next_block()
        }
    }

    /// Sets the data to decode. The number of values is derived from the
    /// encoded data rather than from `_index`.
    pub fn set_data(&mut self, data: Bytes, _index: usize) -> Result<()> {
        self.bit_reader = BitReader::new(data);
        self.initialized = true;

        // Read header information
        self.block_size = self
            .bit_reader
            .get_vlq_int()
            .ok_or_else(|| eof_err!("Not enough data to decode 'block_size'"))?
            .try_into()
            .map_err(|_| general_err!("invalid 'block_size'"))?;

        self.mini_blocks_per_block = self
            .bit_reader
            .get_vlq_int()
            .ok_or_else(|| eof_err!("Not enough data to decode 'mini_blocks_per_block'"))?
            .try_into()
            .map_err(|_| general_err!("invalid 'mini_blocks_per_block'"))?;

        self.values_left = self
            .bit_reader
            .get_vlq_int()
            .ok_or_else(|| eof_err!("Not enough data to decode 'values_left'"))?
            .try_into()
            .map_err(|_| general_err!("invalid 'values_left'"))?;

        let first_value = self
            .bit_reader
            .get_zigzag_vlq_int()
            .ok_or_else(|| eof_err!("Not enough data to decode 'first_value'"))?;

        self.first_value = Some(first_value);

        if self.block_size % 128 != 0 {
            return Err(general_err!(
                "'block_size' must be a multiple of 128, got {}",
                self.block_size
            ));
        }

        if self.mini_blocks_per_block == 0 {
            return Err(general_err!("invalid 'mini_blocks_per_block'"));
        }

        if self.block_size % self.mini_blocks_per_block != 0 {
            return Err(general_err!(
                "'block_size' must be a multiple of 'mini_blocks_per_block' got {} and {}",
                self.block_size,
                self.mini_blocks_per_block
            ));
        }

        // Reset decoding state
        self.mini_block_idx = 0;
        self.values_per_mini_block = self.block_size / self.mini_blocks_per_block;
        self.mini_block_remaining = 0;
        self.mini_block_bit_widths.clear();
        self.block_end_offset = 0;
        self.min_delta = 0;
        self.last_value = 0;

        if self.values_per_mini_block % 32 != 0 {
            return Err(general_err!(
                "'values_per_mini_block' must be a multiple of 32 got {}",
                self.values_per_mini_block
            ));
        }

        Ok(())
    }

    /// Number of values left in this decoder stream
    pub fn values_left(&self) -> usize {
        self.values_left
    }

    pub(crate) fn get<I>(&mut self, buffer: &mut [I]) -> Result<usize>
    where
        I: FromBytes + FromPrimitive + Into<i64> + Copy + 'static,
        i64: AsPrimitive<I>,
    {
        assert!(self.initialized, "Bit reader is not initialized");

        let to_read = buffer.len().min(self.values_left);
        if to_read == 0 {
            return Ok(0);
        }

        let mut read = 0;

        if let Some(value) = self.first_value.take() {
            let first = I::from_i64(value).ok_or_else(|| general_err!("first value too large"))?;
            self.last_value = value;
            buffer[0] = first;
            read += 1;
            self.values_left -= 1;
        }

        while read != to_read {
            if self.mini_block_remaining == 0 {
                self.next_mini_block()?;
                if I::from_i64(self.min_delta).is_none() {
                    return Err(general_err!("'min_delta' too large"));
                }
            }

            let bit_width = self.mini_block_bit_widths[self.mini_block_idx] as usize;
            if bit_width > mem::size_of::<I>() * 8 {
                return Err(general_err!("invalid mini block bit width {}", bit_width));
            }
            let batch_to_read = self.mini_block_remaining.min(to_read - read);

            let batch_read = self
                .bit_reader
                .get_batch(&mut buffer[read..read + batch_to_read], bit_width);

            if batch_read != batch_to_read {
                return Err(general_err!(
                    "Expected to read {} values from miniblock got {}",
                    batch_to_read,
                    batch_read
                ));
            }

            // At this point `buffer` holds the deltas, offset these to get back the
            // original values. It is OK for deltas to contain "overflowed" values after
            // encoding, e.g. i64::MAX - i64::MIN, the `wrapping_add` "overflows" again
            // and restores the original value.
            for v in &mut buffer[read..read + batch_read] {
                let delta: i64 = (*v).into();
                let value = delta
                    .wrapping_add(self.min_delta)
                    .wrapping_add(self.last_value);
                self.last_value = value;
                *v = value.as_();
            }

            read += batch_read;
            self.mini_block_remaining -= batch_read;
            self.values_left -= batch_read;
        }

        Ok(to_read)
    }
}

// ----------------------------------------------------------------------
// DELTA_LENGTH_BYTE_ARRAY Decoding

/// Delta length byte array decoder.
/// Only applied to byte arrays to separate the length values and the data, the lengths
/// are encoded using DELTA_BINARY_PACKED encoding.
pub struct DeltaLengthByteArrayDecoder<T: DataType> {
    // Lengths for each byte array in `data`
    lengths: Vec<i32>,

    // Current index into `lengths`
    current_idx: usize,

    // Concatenated byte array data
    data: Option<Bytes>,

    // Offset into `data`, always point to the beginning of next byte array.
    offset: usize,

    // Number of values left in this decoder stream
    num_values: usize,

    // Placeholder to allow `T` as generic parameter
    _phantom: PhantomData<T>,
}

impl<T: DataType> DeltaLengthByteArrayDecoder<T> {
    /// Creates new delta length byte array decoder.
    pub fn new() -> Self {
        Self {
            lengths: vec![],
            current_idx: 0,
            data: None,
            offset: 0,
            num_values: 0,
            _phantom: PhantomData,
        }
    }

    pub fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        match T::get_physical_type() {
            Type::BYTE_ARRAY => {
                let mut len_decoder = DeltaBitPackDecoder::new();
                len_decoder.set_data(data.clone(), num_values)?;
                let num_lengths = len_decoder.values_left();
                self.lengths.resize(num_lengths, 0);
                len_decoder.get::<i32>(&mut self.lengths[..])?;

                if self.lengths.iter().any(|len| *len < 0) {
                    return Err(general_err!(
                        "negative byte array length in DELTA_LENGTH_BYTE_ARRAY"
                    ));
                }

                let lengths_end = len_decoder.get_offset();
                if lengths_end > data.len() {
                    return Err(ParquetError::TruncatedPage(format!(
                        "byte array lengths occupy {} bytes, page holds {}",
                        lengths_end,
                        data.len()
                    )));
                }

                self.data = Some(data.slice(lengths_end..));
                self.offset = 0;
                self.current_idx = 0;
                self.num_values = num_lengths;
                Ok(())
            }
            _ => Err(general_err!(
                "DeltaLengthByteArrayDecoder only support ByteArrayType"
            )),
        }
    }

    pub fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        match T::get_physical_type() {
            Type::BYTE_ARRAY => {
                assert!(self.data.is_some());

                let data = self.data.as_ref().unwrap();
                let num_values = cmp::min(buffer.len(), self.num_values);

                for item in buffer.iter_mut().take(num_values) {
                    let len = self.lengths[self.current_idx] as usize;

                    let end = self
                        .offset
                        .checked_add(len)
                        .filter(|end| *end <= data.len())
                        .ok_or_else(|| {
                            ParquetError::TruncatedPage(format!(
                                "byte array of length {len} extends past end of page"
                            ))
                        })?;

                    item.as_mut_any()
                        .downcast_mut::<ByteArray>()
                        .unwrap()
                        .set_data(data.slice(self.offset..end));

                    self.offset = end;
                    self.current_idx += 1;
                }

                self.num_values -= num_values;
                Ok(num_values)
            }
            _ => Err(general_err!(
                "DeltaLengthByteArrayDecoder only support ByteArrayType"
            )),
        }
    }

    pub fn values_left(&self) -> usize {
        self.num_values
    }
}

// ----------------------------------------------------------------------
// DELTA_BYTE_ARRAY Decoding

/// Delta byte array decoder.
/// Prefix lengths are encoded using `DELTA_BINARY_PACKED` encoding, suffixes are stored
/// using `DELTA_LENGTH_BYTE_ARRAY` encoding.
pub struct DeltaByteArrayDecoder<T: DataType> {
    // Prefix lengths for each byte array
    prefix_lengths: Vec<i32>,

    // The current index into `prefix_lengths`,
    current_idx: usize,

    // Decoder for all suffixes, the # of which should be the same as
    // `prefix_lengths.len()`
    suffix_decoder: Option<DeltaLengthByteArrayDecoder<ByteArrayType>>,

    // The last byte array, used to derive the current prefix
    previous_value: Vec<u8>,

    // Number of values left
    num_values: usize,

    // Placeholder to allow `T` as generic parameter
    _phantom: PhantomData<T>,
}

impl<T: DataType> DeltaByteArrayDecoder<T> {
    /// Creates new delta byte array decoder.
    pub fn new() -> Self {
        Self {
            prefix_lengths: vec![],
            current_idx: 0,
            suffix_decoder: None,
            previous_value: vec![],
            num_values: 0,
            _phantom: PhantomData,
        }
    }

    pub fn set_data(&mut self, data: Bytes, num_values: usize) -> Result<()> {
        match T::get_physical_type() {
            Type::BYTE_ARRAY | Type::FIXED_LEN_BYTE_ARRAY => {
                let mut prefix_len_decoder = DeltaBitPackDecoder::new();
                prefix_len_decoder.set_data(data.clone(), num_values)?;
                let num_prefixes = prefix_len_decoder.values_left();
                self.prefix_lengths.resize(num_prefixes, 0);
                prefix_len_decoder.get::<i32>(&mut self.prefix_lengths[..])?;

                if self.prefix_lengths.iter().any(|len| *len < 0) {
                    return Err(general_err!("negative prefix length in DELTA_BYTE_ARRAY"));
                }

                let prefixes_end = prefix_len_decoder.get_offset();
                if prefixes_end > data.len() {
                    return Err(ParquetError::TruncatedPage(format!(
                        "prefix lengths occupy {} bytes, page holds {}",
                        prefixes_end,
                        data.len()
                    )));
                }

                let mut suffix_decoder = DeltaLengthByteArrayDecoder::new();
                suffix_decoder.set_data(data.slice(prefixes_end..), num_values)?;
                self.suffix_decoder = Some(suffix_decoder);
                self.num_values = num_prefixes;
                self.current_idx = 0;
                self.previous_value.clear();
                Ok(())
            }
            _ => Err(general_err!(
                "DeltaByteArrayDecoder only supports ByteArrayType and FixedLenByteArrayType"
            )),
        }
    }

    pub fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
        match T::get_physical_type() {
            ty @ Type::BYTE_ARRAY | ty @ Type::FIXED_LEN_BYTE_ARRAY => {
                let num_values = cmp::min(buffer.len(), self.num_values);
                let mut v = [ByteArray::new()];
                for item in buffer.iter_mut().take(num_values) {
                    // Process suffix
                    let suffix_decoder = self
                        .suffix_decoder
                        .as_mut()
                        .expect("decoder not initialized");
                    if suffix_decoder.get(&mut v[..])? != 1 {
                        return Err(ParquetError::TruncatedPage(
                            "fewer suffixes than prefix lengths in DELTA_BYTE_ARRAY".to_string(),
                        ));
                    }
                    let suffix = v[0].data();

                    // Extract current prefix length, can be 0
                    let prefix_len = self.prefix_lengths[self.current_idx] as usize;
                    if prefix_len > self.previous_value.len() {
                        return Err(general_err!(
                            "prefix length {} longer than the previous value",
                            prefix_len
                        ));
                    }

                    // Concatenate prefix with suffix
                    let mut result = Vec::new();
                    result.extend_from_slice(&self.previous_value[0..prefix_len]);
                    result.extend_from_slice(suffix);

                    let data = Bytes::from(result.clone());

                    match ty {
                        Type::BYTE_ARRAY => item
                            .as_mut_any()
                            .downcast_mut::<ByteArray>()
                            .unwrap()
                            .set_data(data),
                        Type::FIXED_LEN_BYTE_ARRAY => item
                            .as_mut_any()
                            .downcast_mut::<FixedLenByteArray>()
                            .unwrap()
                            .set_data(data),
                        _ => unreachable!(),
                    };

                    self.previous_value = result;
                    self.current_idx += 1;
                }

                self.num_values -= num_values;
                Ok(num_values)
            }
            _ => Err(general_err!(
                "DeltaByteArrayDecoder only supports ByteArrayType and FixedLenByteArrayType"
            )),
        }
    }

    pub fn values_left(&self) -> usize {
        self.num_values
    }
}
