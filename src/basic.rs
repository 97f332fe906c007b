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

//! Contains Rust mappings for Thrift definition.
//! Refer to [`parquet.thrift`] to see raw definitions.
//!
//! [`parquet.thrift`]: https://github.com/apache/parquet-format/blob/master/src/main/thrift/parquet.thrift

use std::fmt;

use crate::errors::{ParquetError, Result};
use crate::thrift::{FieldType, ThriftCompactInputProtocol};

// ----------------------------------------------------------------------
// Types from the Thrift definition

// ----------------------------------------------------------------------
// Mirrors thrift enum `Type`

thrift_enum!(
/// Types supported by Parquet.
///
/// These physical types are intended to be used in combination with the encodings to
/// control the on disk storage format.
/// For example INT16 is not included as a type since a good encoding of INT32
/// would handle this.
enum Type {
  BOOLEAN = 0;
  INT32 = 1;
  INT64 = 2;
  INT96 = 3;
  FLOAT = 4;
  DOUBLE = 5;
  BYTE_ARRAY = 6;
  FIXED_LEN_BYTE_ARRAY = 7;
}
);

// ----------------------------------------------------------------------
// Mirrors thrift enum `ConvertedType`

/// Common types (converted types) used by frameworks when using Parquet.
/// This helps map between types in those frameworks to the base types in Parquet.
/// This is only metadata and not needed to read or write the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum ConvertedType {
    /// No converted type annotation.
    NONE,
    /// A BYTE_ARRAY actually contains UTF8 encoded chars.
    UTF8,

    /// A map is converted as an optional field containing a repeated key/value pair.
    MAP,

    /// A key/value pair is converted into a group of two fields.
    MAP_KEY_VALUE,

    /// A list is converted into an optional field containing a repeated field for its
    /// values.
    LIST,

    /// An enum is converted into a binary field
    ENUM,

    /// A decimal value.
    ///
    /// This may be used to annotate binary or fixed primitive types. The
    /// underlying byte array stores the unscaled value encoded as two's
    /// complement using big-endian byte order (the most significant byte is the
    /// zeroth element).
    ///
    /// This must be accompanied by a (maximum) precision and a scale in the
    /// SchemaElement. The precision specifies the number of digits in the decimal
    /// and the scale stores the location of the decimal point. For example 1.23
    /// would have precision 3 (3 total digits) and scale 2 (the decimal point is
    /// 2 digits over).
    DECIMAL,

    /// A date stored as days since Unix epoch, encoded as the INT32 physical type.
    DATE,

    /// The total number of milliseconds since midnight. The value is stored as an INT32
    /// physical type.
    TIME_MILLIS,

    /// The total number of microseconds since midnight. The value is stored as an INT64
    /// physical type.
    TIME_MICROS,

    /// Date and time recorded as milliseconds since the Unix epoch.
    /// Recorded as a physical type of INT64.
    TIMESTAMP_MILLIS,

    /// Date and time recorded as microseconds since the Unix epoch.
    /// The value is stored as an INT64 physical type.
    TIMESTAMP_MICROS,

    /// An unsigned 8 bit integer value stored as INT32 physical type.
    UINT_8,

    /// An unsigned 16 bit integer value stored as INT32 physical type.
    UINT_16,

    /// An unsigned 32 bit integer value stored as INT32 physical type.
    UINT_32,

    /// An unsigned 64 bit integer value stored as INT64 physical type.
    UINT_64,

    /// A signed 8 bit integer value stored as INT32 physical type.
    INT_8,

    /// A signed 16 bit integer value stored as INT32 physical type.
    INT_16,

    /// A signed 32 bit integer value stored as INT32 physical type.
    INT_32,

    /// A signed 64 bit integer value stored as INT64 physical type.
    INT_64,

    /// A JSON document embedded within a single UTF8 column.
    JSON,

    /// A BSON document embedded within a single BINARY column.
    BSON,

    /// An interval of time.
    ///
    /// This type annotates data stored as a FIXED_LEN_BYTE_ARRAY of length 12.
    /// This data is composed of three separate little endian unsigned integers.
    /// Each stores a component of a duration of time. The first integer identifies
    /// the number of months associated with the duration, the second identifies
    /// the number of days associated with the duration and the third identifies
    /// the number of milliseconds associated with the provided duration.
    /// This duration of time is independent of any particular timezone or date.
    INTERVAL,
}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for ConvertedType {
    type Error = ParquetError;
    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        let val = prot.read_i32()?;
        Ok(match val {
            0 => ConvertedType::UTF8,
            1 => ConvertedType::MAP,
            2 => ConvertedType::MAP_KEY_VALUE,
            3 => ConvertedType::LIST,
            4 => ConvertedType::ENUM,
            5 => ConvertedType::DECIMAL,
            6 => ConvertedType::DATE,
            7 => ConvertedType::TIME_MILLIS,
            8 => ConvertedType::TIME_MICROS,
            9 => ConvertedType::TIMESTAMP_MILLIS,
            10 => ConvertedType::TIMESTAMP_MICROS,
            11 => ConvertedType::UINT_8,
            12 => ConvertedType::UINT_16,
            13 => ConvertedType::UINT_32,
            14 => ConvertedType::UINT_64,
            15 => ConvertedType::INT_8,
            16 => ConvertedType::INT_16,
            17 => ConvertedType::INT_32,
            18 => ConvertedType::INT_64,
            19 => ConvertedType::JSON,
            20 => ConvertedType::BSON,
            21 => ConvertedType::INTERVAL,
            _ => return Err(general_err!("Unexpected ConvertedType {}", val)),
        })
    }
}

// ----------------------------------------------------------------------
// Mirrors thrift union `TimeUnit`

/// Time unit for logical time and timestamp annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TimeUnit {
    /// Millisecond precision.
    MILLIS,
    /// Microsecond precision.
    MICROS,
    /// Nanosecond precision.
    NANOS,
}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for TimeUnit {
    type Error = ParquetError;
    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        prot.read_struct_begin()?;
        let field_ident = prot.read_field_begin()?;
        let ret = match field_ident.id {
            1 => TimeUnit::MILLIS,
            2 => TimeUnit::MICROS,
            3 => TimeUnit::NANOS,
            _ => {
                return Err(general_err!(
                    "Unexpected TimeUnit field id {}",
                    field_ident.id
                ))
            }
        };
        prot.skip_empty_struct()?;
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type != FieldType::Stop {
            return Err(general_err!("TimeUnit union holds more than one field"));
        }
        prot.read_struct_end()?;
        Ok(ret)
    }
}

// ----------------------------------------------------------------------
// Mirrors thrift union `LogicalType`

/// Logical types used by version 2.4.0+ of the Parquet format.
///
/// Replaces the deprecated [`ConvertedType`] annotations, which are still
/// written alongside for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    /// A UTF8 encoded string.
    String,
    /// A map of key-value pairs.
    Map,
    /// A list of values.
    List,
    /// An enumeration.
    Enum,
    /// A decimal value with a scale and precision.
    Decimal {
        /// The number of digits after the decimal point.
        scale: i32,
        /// The total number of digits.
        precision: i32,
    },
    /// A date, stored as days since the Unix epoch.
    Date,
    /// A time of day.
    Time {
        /// Whether the time is adjusted to UTC.
        is_adjusted_to_u_t_c: bool,
        /// The unit the time is stored in.
        unit: TimeUnit,
    },
    /// A date and time.
    Timestamp {
        /// Whether the timestamp is adjusted to UTC.
        is_adjusted_to_u_t_c: bool,
        /// The unit the timestamp is stored in.
        unit: TimeUnit,
    },
    /// An integer with a known bit width and signedness.
    Integer {
        /// The number of bits the integer uses.
        bit_width: i8,
        /// Whether the integer is signed.
        is_signed: bool,
    },
    /// A value whose logical type is unknown, always null.
    Unknown,
    /// A JSON document.
    Json,
    /// A BSON document.
    Bson,
    /// A 16 byte UUID.
    Uuid,
}

fn read_decimal_type(prot: &mut ThriftCompactInputProtocol<'_>) -> Result<(i32, i32)> {
    let mut scale: Option<i32> = None;
    let mut precision: Option<i32> = None;
    prot.read_struct_begin()?;
    loop {
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type == FieldType::Stop {
            break;
        }
        match field_ident.id {
            1 => scale = Some(prot.read_i32()?),
            2 => precision = Some(prot.read_i32()?),
            _ => prot.skip(field_ident.field_type)?,
        }
    }
    prot.read_struct_end()?;
    let scale = scale.ok_or_else(|| general_err!("Required field scale is missing"))?;
    let precision = precision.ok_or_else(|| general_err!("Required field precision is missing"))?;
    Ok((scale, precision))
}

fn read_time_type(prot: &mut ThriftCompactInputProtocol<'_>) -> Result<(bool, TimeUnit)> {
    let mut is_adjusted_to_u_t_c: Option<bool> = None;
    let mut unit: Option<TimeUnit> = None;
    prot.read_struct_begin()?;
    loop {
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type == FieldType::Stop {
            break;
        }
        match field_ident.id {
            1 => is_adjusted_to_u_t_c = Some(prot.read_bool()?),
            2 => unit = Some(TimeUnit::try_from(&mut *prot)?),
            _ => prot.skip(field_ident.field_type)?,
        }
    }
    prot.read_struct_end()?;
    let is_adjusted_to_u_t_c = is_adjusted_to_u_t_c
        .ok_or_else(|| general_err!("Required field isAdjustedToUTC is missing"))?;
    let unit = unit.ok_or_else(|| general_err!("Required field unit is missing"))?;
    Ok((is_adjusted_to_u_t_c, unit))
}

fn read_int_type(prot: &mut ThriftCompactInputProtocol<'_>) -> Result<(i8, bool)> {
    let mut bit_width: Option<i8> = None;
    let mut is_signed: Option<bool> = None;
    prot.read_struct_begin()?;
    loop {
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type == FieldType::Stop {
            break;
        }
        match field_ident.id {
            1 => bit_width = Some(prot.read_i8()?),
            2 => is_signed = Some(prot.read_bool()?),
            _ => prot.skip(field_ident.field_type)?,
        }
    }
    prot.read_struct_end()?;
    let bit_width = bit_width.ok_or_else(|| general_err!("Required field bitWidth is missing"))?;
    let is_signed = is_signed.ok_or_else(|| general_err!("Required field isSigned is missing"))?;
    Ok((bit_width, is_signed))
}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for LogicalType {
    type Error = ParquetError;
    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        prot.read_struct_begin()?;
        let field_ident = prot.read_field_begin()?;
        let ret = match field_ident.id {
            1 => {
                prot.skip_empty_struct()?;
                LogicalType::String
            }
            2 => {
                prot.skip_empty_struct()?;
                LogicalType::Map
            }
            3 => {
                prot.skip_empty_struct()?;
                LogicalType::List
            }
            4 => {
                prot.skip_empty_struct()?;
                LogicalType::Enum
            }
            5 => {
                let (scale, precision) = read_decimal_type(prot)?;
                LogicalType::Decimal { scale, precision }
            }
            6 => {
                prot.skip_empty_struct()?;
                LogicalType::Date
            }
            7 => {
                let (is_adjusted_to_u_t_c, unit) = read_time_type(prot)?;
                LogicalType::Time {
                    is_adjusted_to_u_t_c,
                    unit,
                }
            }
            8 => {
                let (is_adjusted_to_u_t_c, unit) = read_time_type(prot)?;
                LogicalType::Timestamp {
                    is_adjusted_to_u_t_c,
                    unit,
                }
            }
            10 => {
                let (bit_width, is_signed) = read_int_type(prot)?;
                LogicalType::Integer {
                    bit_width,
                    is_signed,
                }
            }
            11 => {
                prot.skip_empty_struct()?;
                LogicalType::Unknown
            }
            12 => {
                prot.skip_empty_struct()?;
                LogicalType::Json
            }
            13 => {
                prot.skip_empty_struct()?;
                LogicalType::Bson
            }
            14 => {
                prot.skip_empty_struct()?;
                LogicalType::Uuid
            }
            _ => {
                return Err(general_err!(
                    "Unexpected LogicalType field id {}",
                    field_ident.id
                ))
            }
        };
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type != FieldType::Stop {
            return Err(general_err!("LogicalType union holds more than one field"));
        }
        prot.read_struct_end()?;
        Ok(ret)
    }
}

// ----------------------------------------------------------------------
// Mirrors thrift enum `FieldRepetitionType`

thrift_enum!(
/// Representation of field types in schema.
enum Repetition {
  /// Field is required (can not be null) and each record has exactly 1 value.
  REQUIRED = 0;
  /// Field is optional (can be null) and each record has 0 or 1 values.
  OPTIONAL = 1;
  /// Field is repeated and can contain 0 or more values.
  REPEATED = 2;
}
);

// ----------------------------------------------------------------------
// Mirrors thrift enum `Encoding`

thrift_enum!(
/// Encodings supported by Parquet.
///
/// Not all encodings are valid for all types. These enums are also used to specify the
/// encoding of definition and repetition levels.
enum Encoding {
  /// Default byte encoding.
  /// - BOOLEAN - 1 bit per value, 0 is false; 1 is true.
  /// - INT32 - 4 bytes per value, stored as little-endian.
  /// - INT64 - 8 bytes per value, stored as little-endian.
  /// - FLOAT - 4 bytes per value, stored as little-endian.
  /// - DOUBLE - 8 bytes per value, stored as little-endian.
  /// - BYTE_ARRAY - 4 byte length stored as little endian, followed by bytes.
  /// - FIXED_LEN_BYTE_ARRAY - just the bytes are stored.
  PLAIN = 0;
  /// **Deprecated** dictionary encoding.
  ///
  /// The values in the dictionary are encoded using PLAIN encoding.
  /// Since it is deprecated, RLE_DICTIONARY encoding is used for a data page, and
  /// PLAIN encoding is used for dictionary page.
  PLAIN_DICTIONARY = 2;
  /// Group packed run length encoding.
  ///
  /// Usable for definition/repetition levels encoding and boolean values.
  RLE = 3;
  /// **Deprecated** bit packed encoding.
  ///
  /// This can only be used if the data has a known max width.
  /// Usable for definition/repetition levels encoding.
  BIT_PACKED = 4;
  /// Delta encoding for integers, either INT32 or INT64.
  ///
  /// Works best on sorted data.
  DELTA_BINARY_PACKED = 5;
  /// Encoding for byte arrays to separate the length values and the data.
  ///
  /// The lengths are encoded using DELTA_BINARY_PACKED encoding.
  DELTA_LENGTH_BYTE_ARRAY = 6;
  /// Incremental encoding for byte arrays.
  ///
  /// Prefix lengths are encoded using DELTA_BINARY_PACKED encoding.
  /// Suffixes are stored using DELTA_LENGTH_BYTE_ARRAY encoding.
  DELTA_BYTE_ARRAY = 7;
  /// Dictionary encoding.
  ///
  /// The ids are encoded using the RLE encoding.
  RLE_DICTIONARY = 8;
  /// Encoding for floating-point data.
  ///
  /// K byte-streams are created where K is the size in bytes of the data type.
  /// The individual bytes of an FP value are scattered to the corresponding stream and
  /// the streams are concatenated.
  /// This itself does not reduce the size of the data but can lead to better compression
  /// afterwards.
  BYTE_STREAM_SPLIT = 9;
}
);

// ----------------------------------------------------------------------
// Mirrors thrift enum `CompressionCodec`

thrift_enum!(
/// Supported block compression algorithms.
enum Compression {
  UNCOMPRESSED = 0;
  SNAPPY = 1;
  GZIP = 2;
  LZO = 3;
  BROTLI = 4;
  LZ4 = 5;
  ZSTD = 6;
  LZ4_RAW = 7;
}
);

// ----------------------------------------------------------------------
// Mirrors thrift enum `PageType`

thrift_enum!(
/// Available data pages for Parquet file format.
/// Note that some of the page types may not be supported.
enum PageType {
  DATA_PAGE = 0;
  INDEX_PAGE = 1;
  DICTIONARY_PAGE = 2;
  DATA_PAGE_V2 = 3;
}
);

impl fmt::Display for ConvertedType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// Note: To prevent type loss when converting from ConvertedType to LogicalType,
// the conversion from ConvertedType -> LogicalType is not implemented.
// Such type loss includes:
// - Not knowing the decimal scale and precision of ConvertedType
// - Time and timestamp nanosecond precision, that is not supported in ConvertedType.

impl From<Option<LogicalType>> for ConvertedType {
    fn from(value: Option<LogicalType>) -> Self {
        match value {
            Some(value) => match value {
                LogicalType::String => ConvertedType::UTF8,
                LogicalType::Map => ConvertedType::MAP,
                LogicalType::List => ConvertedType::LIST,
                LogicalType::Enum => ConvertedType::ENUM,
                LogicalType::Decimal { .. } => ConvertedType::DECIMAL,
                LogicalType::Date => ConvertedType::DATE,
                LogicalType::Time { unit, .. } => match unit {
                    TimeUnit::MILLIS => ConvertedType::TIME_MILLIS,
                    TimeUnit::MICROS => ConvertedType::TIME_MICROS,
                    TimeUnit::NANOS => ConvertedType::NONE,
                },
                LogicalType::Timestamp { unit, .. } => match unit {
                    TimeUnit::MILLIS => ConvertedType::TIMESTAMP_MILLIS,
                    TimeUnit::MICROS => ConvertedType::TIMESTAMP_MICROS,
                    TimeUnit::NANOS => ConvertedType::NONE,
                },
                LogicalType::Integer {
                    bit_width,
                    is_signed,
                } => match (bit_width, is_signed) {
                    (8, true) => ConvertedType::INT_8,
                    (16, true) => ConvertedType::INT_16,
                    (32, true) => ConvertedType::INT_32,
                    (64, true) => ConvertedType::INT_64,
                    (8, false) => ConvertedType::UINT_8,
                    (16, false) => ConvertedType::UINT_16,
                    (32, false) => ConvertedType::UINT_32,
                    (64, false) => ConvertedType::UINT_64,
                    _ => ConvertedType::NONE,
                },
                LogicalType::Unknown => ConvertedType::NONE,
                LogicalType::Json => ConvertedType::JSON,
                LogicalType::Bson => ConvertedType::BSON,
                LogicalType::Uuid => ConvertedType::NONE,
            },
            None => ConvertedType::NONE,
        }
    }
}
