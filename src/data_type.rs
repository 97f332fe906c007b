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

//! Data types that connect Parquet physical types with their Rust-specific
//! representations.

use std::cmp;
use std::fmt;
use std::mem;
use std::str::from_utf8;

use bytes::Bytes;

use crate::basic::Type;
use crate::column::reader::{ColumnReader, ColumnReaderImpl};
use crate::data_type::private::ParquetValueType;
use crate::errors::{ParquetError, Result};
use crate::util::bit_util::{read_num_bytes, BitReader, FromBytes};

/// Rust representation for the INT96 physical type, a deprecated timestamp split
/// into nanoseconds within the day and a Julian day number. Value is backed by an
/// array of `u32`, stored little endian as on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Int96 {
    value: [u32; 3],
}

const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;
const SECONDS_PER_DAY: i64 = 86_400;
const NANOSECONDS_PER_SECOND: i64 = 1_000_000_000;

impl Int96 {
    /// Creates new INT96 type struct with no data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns underlying data as slice of [`u32`].
    pub fn data(&self) -> &[u32] {
        &self.value
    }

    /// Sets data for this INT96 type.
    pub fn set_data(&mut self, elem0: u32, elem1: u32, elem2: u32) {
        self.value = [elem0, elem1, elem2];
    }

    /// Converts this INT96 into an i64 representing the number of nanoseconds
    /// since the epoch.
    ///
    /// Will wrap around on overflow.
    pub fn to_nanos(&self) -> i64 {
        let (day, nanos) = self.data_as_days_and_nanos();
        (day - JULIAN_DAY_OF_EPOCH)
            .wrapping_mul(SECONDS_PER_DAY)
            .wrapping_mul(NANOSECONDS_PER_SECOND)
            .wrapping_add(nanos)
    }

    fn data_as_days_and_nanos(&self) -> (i64, i64) {
        let day = self.value[2] as i64;
        let nanos = ((self.value[1] as i64) << 32) + self.value[0] as i64;
        (day, nanos)
    }
}

impl fmt::Display for Int96 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.data())
    }
}

/// Rust representation for BYTE_ARRAY and FIXED_LEN_BYTE_ARRAY Parquet physical
/// types. Value is backed by a byte buffer.
#[derive(Clone, Debug, Default)]
pub struct ByteArray {
    data: Option<Bytes>,
}

impl ByteArray {
    /// Creates new byte array with no data set.
    pub fn new() -> Self {
        ByteArray { data: None }
    }

    /// Gets length of the underlying byte buffer.
    pub fn len(&self) -> usize {
        assert!(self.data.is_some());
        self.data.as_ref().unwrap().len()
    }

    /// Checks if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns slice of data.
    pub fn data(&self) -> &[u8] {
        self.data
            .as_ref()
            .expect("set_data should have been called")
            .as_ref()
    }

    /// Set data from a byte buffer.
    pub fn set_data(&mut self, data: Bytes) {
        self.data = Some(data);
    }

    /// Returns `ByteArray` instance with slice of values for a data.
    pub fn slice(&self, start: usize, len: usize) -> Self {
        Self::from(
            self.data
                .as_ref()
                .expect("set_data should have been called")
                .slice(start..start + len),
        )
    }

    /// Try to convert the byte array to a utf8 slice.
    pub fn as_utf8(&self) -> Result<&str> {
        self.data
            .as_ref()
            .map(|ptr| ptr.as_ref())
            .ok_or_else(|| general_err!("Can't convert empty byte array to utf8"))
            .and_then(|bytes| from_utf8(bytes).map_err(|e| e.into()))
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(buf: Vec<u8>) -> ByteArray {
        Self {
            data: Some(buf.into()),
        }
    }
}

impl From<&str> for ByteArray {
    fn from(s: &str) -> ByteArray {
        let mut v = Vec::new();
        v.extend_from_slice(s.as_bytes());
        Self {
            data: Some(v.into()),
        }
    }
}

impl From<Bytes> for ByteArray {
    fn from(value: Bytes) -> Self {
        Self { data: Some(value) }
    }
}

impl From<ByteArray> for Bytes {
    fn from(value: ByteArray) -> Self {
        value.data.unwrap_or_default()
    }
}

impl PartialEq for ByteArray {
    fn eq(&self, other: &ByteArray) -> bool {
        match (&self.data, &other.data) {
            (Some(d1), Some(d2)) => d1.as_ref() == d2.as_ref(),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ByteArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.data())
    }
}

/// Wrapper type for performance reasons, this represents `FIXED_LEN_BYTE_ARRAY` but
/// in all other considerations behaves the same as `ByteArray`.
///
/// The length is fixed by the column schema rather than a per-value prefix.
#[derive(Clone, Debug, Default)]
pub struct FixedLenByteArray(ByteArray);

impl PartialEq for FixedLenByteArray {
    fn eq(&self, other: &FixedLenByteArray) -> bool {
        self.0.eq(&other.0)
    }
}

impl PartialEq<ByteArray> for FixedLenByteArray {
    fn eq(&self, other: &ByteArray) -> bool {
        self.0.eq(other)
    }
}

impl PartialEq<FixedLenByteArray> for ByteArray {
    fn eq(&self, other: &FixedLenByteArray) -> bool {
        self.eq(&other.0)
    }
}

impl fmt::Display for FixedLenByteArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::ops::Deref for FixedLenByteArray {
    type Target = ByteArray;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for FixedLenByteArray {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<ByteArray> for FixedLenByteArray {
    fn from(other: ByteArray) -> Self {
        Self(other)
    }
}

impl From<Vec<u8>> for FixedLenByteArray {
    fn from(buf: Vec<u8>) -> FixedLenByteArray {
        FixedLenByteArray(ByteArray::from(buf))
    }
}

impl From<FixedLenByteArray> for ByteArray {
    fn from(other: FixedLenByteArray) -> Self {
        other.0
    }
}

// These impls exist to satisfy the `FromBytes` constraint on the generic
// decoders, the decoder resolution table never routes these types through a
// byte-width based read.

impl FromBytes for Int96 {
    type Buffer = [u8; 12];

    fn try_from_le_slice(b: &[u8]) -> Result<Self> {
        let bytes: Self::Buffer = b
            .try_into()
            .map_err(|_| general_err!("Int96 from little endian slice failed"))?;
        Ok(Self::from_le_bytes(bytes))
    }

    fn from_le_bytes(bs: Self::Buffer) -> Self {
        let mut i = Int96::new();
        i.set_data(
            u32::try_from_le_slice(&bs[0..4]).unwrap(),
            u32::try_from_le_slice(&bs[4..8]).unwrap(),
            u32::try_from_le_slice(&bs[8..12]).unwrap(),
        );
        i
    }
}

impl FromBytes for ByteArray {
    type Buffer = Vec<u8>;

    fn try_from_le_slice(b: &[u8]) -> Result<Self> {
        Ok(b.to_vec().into())
    }

    fn from_le_bytes(bs: Self::Buffer) -> Self {
        bs.into()
    }
}

impl FromBytes for FixedLenByteArray {
    type Buffer = Vec<u8>;

    fn try_from_le_slice(b: &[u8]) -> Result<Self> {
        Ok(b.to_vec().into())
    }

    fn from_le_bytes(bs: Self::Buffer) -> Self {
        bs.into()
    }
}

pub(crate) mod private {
    //! The physical value traits are private to this crate, they are the glue
    //! between the decoders and the rest of the library, allowing decode
    //! implementations to be selected by physical type without dynamic dispatch.

    use super::*;
    use crate::encodings::decoding::{DeltaBitPackDecoder, PlainDecoderDetails};

    /// A physical value stored in a Parquet column.
    ///
    /// Carries the PLAIN decode implementation for the type, so that generic
    /// decoders can be written against [`DataType`](super::DataType) without a
    /// per-type match on every value.
    pub trait ParquetValueType:
        PartialEq + fmt::Debug + fmt::Display + Default + Clone + Send + FromBytes + 'static
    {
        /// The physical type of this value.
        const PHYSICAL_TYPE: Type;

        /// Establish the data that will be decoded in a buffer.
        fn set_data(decoder: &mut PlainDecoderDetails, data: Bytes, num_values: usize);

        /// Decode the values from the PLAIN encoded buffer previously set.
        fn decode(buffer: &mut [Self], decoder: &mut PlainDecoderDetails) -> Result<usize>;

        /// Decode DELTA_BINARY_PACKED values. Only supported for INT32 and INT64,
        /// the decoder resolution table never routes other types here.
        fn delta_decode(decoder: &mut DeltaBitPackDecoder, buffer: &mut [Self]) -> Result<usize> {
            let _ = (decoder, buffer);
            Err(general_err!(
                "DELTA_BINARY_PACKED is only supported for INT32 and INT64"
            ))
        }

        /// Return the value as an opaque `Any`.
        fn as_any(&self) -> &dyn std::any::Any;

        /// Return the value as a mutable opaque `Any`.
        fn as_mut_any(&mut self) -> &mut dyn std::any::Any;
    }

    impl ParquetValueType for bool {
        const PHYSICAL_TYPE: Type = Type::BOOLEAN;

        fn set_data(decoder: &mut PlainDecoderDetails, data: Bytes, num_values: usize) {
            decoder.bit_reader.replace(BitReader::new(data));
            decoder.num_values = num_values;
        }

        fn decode(buffer: &mut [Self], decoder: &mut PlainDecoderDetails) -> Result<usize> {
            let bit_reader = decoder
                .bit_reader
                .as_mut()
                .ok_or_else(|| general_err!("set_data must be called before decode"))?;
            let num_values = cmp::min(buffer.len(), decoder.num_values);
            let values_read = bit_reader.get_batch(&mut buffer[..num_values], 1);
            decoder.num_values -= values_read;
            Ok(values_read)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_mut_any(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    /// Decodes a run of little endian values, each `size_of::<T>()` bytes wide.
    fn decode_fixed_width<T>(buffer: &mut [T], decoder: &mut PlainDecoderDetails) -> Result<usize>
    where
        T: FromBytes,
    {
        let data = decoder
            .data
            .as_ref()
            .ok_or_else(|| general_err!("set_data must be called before decode"))?;
        let num_values = cmp::min(buffer.len(), decoder.num_values);
        let type_size = mem::size_of::<T>();
        let bytes_to_decode = type_size * num_values;
        let bytes_left = data.len() - decoder.start;
        if bytes_left < bytes_to_decode {
            return Err(ParquetError::TruncatedPage(format!(
                "expected {bytes_to_decode} bytes of PLAIN values, page holds {bytes_left}"
            )));
        }

        let raw = &data.as_ref()[decoder.start..decoder.start + bytes_to_decode];
        for (value, chunk) in buffer.iter_mut().zip(raw.chunks_exact(type_size)) {
            *value = T::try_from_le_slice(chunk)?;
        }
        decoder.start += bytes_to_decode;
        decoder.num_values -= num_values;
        Ok(num_values)
    }

    macro_rules! impl_parquet_value_type {
        ($ty:ty, $physical_ty:path $(, $delta:ident)?) => {
            impl ParquetValueType for $ty {
                const PHYSICAL_TYPE: Type = $physical_ty;

                fn set_data(decoder: &mut PlainDecoderDetails, data: Bytes, num_values: usize) {
                    decoder.data.replace(data);
                    decoder.start = 0;
                    decoder.num_values = num_values;
                }

                fn decode(buffer: &mut [Self], decoder: &mut PlainDecoderDetails) -> Result<usize> {
                    decode_fixed_width(buffer, decoder)
                }

                $(
                    fn $delta(
                        decoder: &mut DeltaBitPackDecoder,
                        buffer: &mut [Self],
                    ) -> Result<usize> {
                        decoder.get(buffer)
                    }
                )?

                fn as_any(&self) -> &dyn std::any::Any {
                    self
                }

                fn as_mut_any(&mut self) -> &mut dyn std::any::Any {
                    self
                }
            }
        };
    }

    impl_parquet_value_type!(i32, Type::INT32, delta_decode);
    impl_parquet_value_type!(i64, Type::INT64, delta_decode);
    impl_parquet_value_type!(f32, Type::FLOAT);
    impl_parquet_value_type!(f64, Type::DOUBLE);

    impl ParquetValueType for Int96 {
        const PHYSICAL_TYPE: Type = Type::INT96;

        fn set_data(decoder: &mut PlainDecoderDetails, data: Bytes, num_values: usize) {
            decoder.data.replace(data);
            decoder.start = 0;
            decoder.num_values = num_values;
        }

        fn decode(buffer: &mut [Self], decoder: &mut PlainDecoderDetails) -> Result<usize> {
            let data = decoder
                .data
                .as_ref()
                .ok_or_else(|| general_err!("set_data must be called before decode"))?;
            let num_values = cmp::min(buffer.len(), decoder.num_values);
            let bytes_to_decode = 12 * num_values;
            let bytes_left = data.len() - decoder.start;
            if bytes_left < bytes_to_decode {
                return Err(ParquetError::TruncatedPage(format!(
                    "expected {bytes_to_decode} bytes of INT96 values, page holds {bytes_left}"
                )));
            }

            let raw = &data.as_ref()[decoder.start..decoder.start + bytes_to_decode];
            for (item, chunk) in buffer.iter_mut().zip(raw.chunks_exact(12)) {
                item.set_data(
                    u32::try_from_le_slice(&chunk[0..4])?,
                    u32::try_from_le_slice(&chunk[4..8])?,
                    u32::try_from_le_slice(&chunk[8..12])?,
                );
            }
            decoder.start += bytes_to_decode;
            decoder.num_values -= num_values;
            Ok(num_values)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_mut_any(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    impl ParquetValueType for ByteArray {
        const PHYSICAL_TYPE: Type = Type::BYTE_ARRAY;

        fn set_data(decoder: &mut PlainDecoderDetails, data: Bytes, num_values: usize) {
            decoder.data.replace(data);
            decoder.start = 0;
            decoder.num_values = num_values;
        }

        fn decode(buffer: &mut [Self], decoder: &mut PlainDecoderDetails) -> Result<usize> {
            let data = decoder
                .data
                .as_ref()
                .ok_or_else(|| general_err!("set_data must be called before decode"))?;
            let num_values = cmp::min(buffer.len(), decoder.num_values);
            for val_array in buffer.iter_mut().take(num_values) {
                let len_size = mem::size_of::<u32>();
                if data.len() < decoder.start + len_size {
                    return Err(ParquetError::TruncatedPage(
                        "byte array length prefix extends past end of page".to_string(),
                    ));
                }
                let len = read_num_bytes::<u32>(len_size, &data.as_ref()[decoder.start..]) as usize;
                decoder.start += len_size;
                if data.len() < decoder.start + len {
                    return Err(ParquetError::TruncatedPage(format!(
                        "byte array of length {len} extends past end of page"
                    )));
                }
                val_array.set_data(data.slice(decoder.start..decoder.start + len));
                decoder.start += len;
            }
            decoder.num_values -= num_values;
            Ok(num_values)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_mut_any(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    impl ParquetValueType for FixedLenByteArray {
        const PHYSICAL_TYPE: Type = Type::FIXED_LEN_BYTE_ARRAY;

        fn set_data(decoder: &mut PlainDecoderDetails, data: Bytes, num_values: usize) {
            decoder.data.replace(data);
            decoder.start = 0;
            decoder.num_values = num_values;
        }

        fn decode(buffer: &mut [Self], decoder: &mut PlainDecoderDetails) -> Result<usize> {
            assert!(decoder.type_length > 0);
            let type_length = decoder.type_length as usize;
            let data = decoder
                .data
                .as_ref()
                .ok_or_else(|| general_err!("set_data must be called before decode"))?;
            let num_values = cmp::min(buffer.len(), decoder.num_values);
            for item in buffer.iter_mut().take(num_values) {
                if data.len() < decoder.start + type_length {
                    return Err(ParquetError::TruncatedPage(format!(
                        "fixed length byte array of length {type_length} extends past end of page"
                    )));
                }
                item.set_data(data.slice(decoder.start..decoder.start + type_length));
                decoder.start += type_length;
            }
            decoder.num_values -= num_values;
            Ok(num_values)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_mut_any(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }
}

/// Asserts the physical type of a generic [`DataType`] parameter, for decoders
/// that only apply to a subset of the physical types.
#[macro_export]
macro_rules! ensure_phys_ty {
    ($($ty:pat_param)|+ , $err: literal) => {
        match T::get_physical_type() {
            $($ty => (),)*
            _ => panic!($err),
        };
    }
}

/// Contains the Parquet physical type information as well as the Rust type used to
/// represent those values.
pub trait DataType: 'static + Send {
    /// The physical type of the Parquet data type.
    type T: private::ParquetValueType;

    /// Returns Parquet physical type.
    fn get_physical_type() -> Type {
        Self::T::PHYSICAL_TYPE
    }

    /// Returns size in bytes for Rust representation of the physical type.
    fn get_type_size() -> usize;

    /// Downcasts a [`ColumnReader`] to the typed reader for this data type, or
    /// `None` if the reader holds a different type.
    fn get_column_reader(column_reader: ColumnReader) -> Option<ColumnReaderImpl<Self>>
    where
        Self: Sized;
}

macro_rules! make_type {
    ($name:ident, $reader_ident:ident, $native_ty:ty, $size:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone)]
        pub struct $name {}

        impl DataType for $name {
            type T = $native_ty;

            fn get_type_size() -> usize {
                $size
            }

            fn get_column_reader(column_reader: ColumnReader) -> Option<ColumnReaderImpl<Self>> {
                match column_reader {
                    ColumnReader::$reader_ident(r) => Some(r),
                    _ => None,
                }
            }
        }
    };
}

// Generate structs for all physical types.

make_type!(
    BoolType,
    BoolColumnReader,
    bool,
    1,
    "Parquet data type for the BOOLEAN physical type."
);
make_type!(
    Int32Type,
    Int32ColumnReader,
    i32,
    4,
    "Parquet data type for the INT32 physical type."
);
make_type!(
    Int64Type,
    Int64ColumnReader,
    i64,
    8,
    "Parquet data type for the INT64 physical type."
);
make_type!(
    Int96Type,
    Int96ColumnReader,
    Int96,
    mem::size_of::<Int96>(),
    "Parquet data type for the deprecated INT96 physical type."
);
make_type!(
    FloatType,
    FloatColumnReader,
    f32,
    4,
    "Parquet data type for the FLOAT physical type."
);
make_type!(
    DoubleType,
    DoubleColumnReader,
    f64,
    8,
    "Parquet data type for the DOUBLE physical type."
);
make_type!(
    ByteArrayType,
    ByteArrayColumnReader,
    ByteArray,
    mem::size_of::<ByteArray>(),
    "Parquet data type for the BYTE_ARRAY physical type."
);
make_type!(
    FixedLenByteArrayType,
    FixedLenByteArrayColumnReader,
    FixedLenByteArray,
    mem::size_of::<FixedLenByteArray>(),
    "Parquet data type for the FIXED_LEN_BYTE_ARRAY physical type."
);
