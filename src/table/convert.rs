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

//! Conversion from Parquet physical values to table cells.
//!
//! Every column resolves to a [`ColumnPlan`] before any value is decoded, so
//! the combination of physical type, annotation and read options is checked
//! exactly once per column and value conversion is a closed match from there
//! on.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::basic::{ConvertedType, LogicalType, TimeUnit, Type as PhysicalType};
use crate::data_type::Int96;
use crate::errors::{ParquetError, Result};
use crate::schema::types::ColumnDescriptor;
use crate::table::reader::ReadOptions;
use crate::table::ColumnType;

/// Number of days between the Julian day epoch and the Unix epoch.
const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;

const NANOSECONDS_PER_DAY: i64 = 86_400_000_000_000;

/// Number of days between 0001-01-01 and the Unix epoch in the proleptic
/// Gregorian calendar, matching `NaiveDate::from_num_days_from_ce_opt`.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single converted cell on its way into a column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Instant(DateTime<Utc>),
}

impl CellValue {
    /// Renders the value the way a repeated cell prints its items.
    pub(crate) fn render(&self) -> String {
        match self {
            CellValue::Boolean(v) => v.to_string(),
            CellValue::Integer(v) => v.to_string(),
            CellValue::Long(v) => v.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Double(v) => v.to_string(),
            CellValue::String(v) => v.clone(),
            CellValue::Date(v) => v.to_string(),
            CellValue::Time(v) => v.to_string(),
            CellValue::DateTime(v) => v.to_string(),
            CellValue::Instant(v) => v.to_string(),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CellValue::Boolean(_) => "boolean",
            CellValue::Integer(_) => "integer",
            CellValue::Long(_) => "long",
            CellValue::Float(_) => "float",
            CellValue::Double(_) => "double",
            CellValue::String(_) => "string",
            CellValue::Date(_) => "date",
            CellValue::Time(_) => "time",
            CellValue::DateTime(_) => "date-time",
            CellValue::Instant(_) => "instant",
        }
    }
}

/// Conversion plan for one column, keyed by its physical type.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ColumnPlan {
    Boolean,
    Int32(Int32Kind),
    Int64(Int64Kind),
    Int96(Int96Kind),
    Float,
    Double,
    ByteArray(BinaryKind),
    FixedLenByteArray(BinaryKind),
}

/// Interpretation of an INT32 column.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Int32Kind {
    Integer,
    /// UINT_32 widens losslessly into an i64.
    Long,
    Date,
    TimeMillis,
    /// Scaled decimal, carrying the divisor `10^scale`.
    Decimal(f64),
}

/// Interpretation of an INT64 column.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Int64Kind {
    Long,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    TimestampNanos,
    Decimal(f64),
}

/// Interpretation of an INT96 column.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Int96Kind {
    /// Julian day plus nanoseconds within the day, read as a UTC instant.
    Instant,
    /// The raw twelve bytes, handled like unannotated binary.
    Binary(BinaryKind),
}

/// Interpretation of a binary column.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BinaryKind {
    Utf8,
    Hex,
}

/// Resolves the conversion plan for a leaf column.
///
/// Columns nested below the schema root are rejected here, before any page of
/// the file is touched.
pub(crate) fn column_plan(descr: &ColumnDescriptor, options: &ReadOptions) -> Result<ColumnPlan> {
    if descr.path().parts().len() > 1 {
        return Err(ParquetError::UnsupportedSchema(format!(
            "column {} is nested; only flat columns and single-level repeated fields are readable",
            descr.path().string()
        )));
    }
    let plan = match descr.physical_type() {
        PhysicalType::BOOLEAN => ColumnPlan::Boolean,
        PhysicalType::INT32 => ColumnPlan::Int32(int32_kind(descr)?),
        PhysicalType::INT64 => ColumnPlan::Int64(int64_kind(descr)?),
        PhysicalType::INT96 => {
            if options.convert_int96_to_timestamp {
                ColumnPlan::Int96(Int96Kind::Instant)
            } else {
                ColumnPlan::Int96(Int96Kind::Binary(unannotated_kind(options)))
            }
        }
        PhysicalType::FLOAT => ColumnPlan::Float,
        PhysicalType::DOUBLE => ColumnPlan::Double,
        PhysicalType::BYTE_ARRAY => ColumnPlan::ByteArray(binary_kind(descr, options)?),
        PhysicalType::FIXED_LEN_BYTE_ARRAY => {
            ColumnPlan::FixedLenByteArray(binary_kind(descr, options)?)
        }
    };
    Ok(plan)
}

/// Returns the output type a plan materializes into.
///
/// A repeated leaf renders its collected items into a text cell regardless of
/// the element plan.
pub(crate) fn output_type(plan: &ColumnPlan, repeated: bool) -> ColumnType {
    if repeated {
        return ColumnType::Text;
    }
    match plan {
        ColumnPlan::Boolean => ColumnType::Boolean,
        ColumnPlan::Int32(kind) => match kind {
            Int32Kind::Integer => ColumnType::Integer,
            Int32Kind::Long => ColumnType::Long,
            Int32Kind::Date => ColumnType::Date,
            Int32Kind::TimeMillis => ColumnType::Time,
            Int32Kind::Decimal(_) => ColumnType::Double,
        },
        ColumnPlan::Int64(kind) => match kind {
            Int64Kind::Long => ColumnType::Long,
            Int64Kind::TimeMicros => ColumnType::Time,
            Int64Kind::TimestampMillis
            | Int64Kind::TimestampMicros
            | Int64Kind::TimestampNanos => ColumnType::DateTime,
            Int64Kind::Decimal(_) => ColumnType::Double,
        },
        ColumnPlan::Int96(kind) => match kind {
            Int96Kind::Instant => ColumnType::Instant,
            Int96Kind::Binary(_) => ColumnType::String,
        },
        ColumnPlan::Float => ColumnType::Float,
        ColumnPlan::Double => ColumnType::Double,
        ColumnPlan::ByteArray(_) | ColumnPlan::FixedLenByteArray(_) => ColumnType::String,
    }
}

fn int32_kind(descr: &ColumnDescriptor) -> Result<Int32Kind> {
    let kind = match (descr.logical_type(), descr.converted_type()) {
        (
            Some(LogicalType::Integer {
                bit_width: 8 | 16 | 32,
                is_signed: true,
            }),
            _,
        ) => Int32Kind::Integer,
        (
            Some(LogicalType::Integer {
                bit_width: 8 | 16,
                is_signed: false,
            }),
            _,
        ) => Int32Kind::Integer,
        (
            Some(LogicalType::Integer {
                bit_width: 32,
                is_signed: false,
            }),
            _,
        ) => Int32Kind::Long,
        (Some(LogicalType::Date), _) => Int32Kind::Date,
        (
            Some(LogicalType::Time {
                unit: TimeUnit::MILLIS,
                ..
            }),
            _,
        ) => Int32Kind::TimeMillis,
        (Some(LogicalType::Decimal { scale, .. }), _) => Int32Kind::Decimal(10f64.powi(scale)),
        (
            None,
            ConvertedType::NONE
            | ConvertedType::INT_8
            | ConvertedType::INT_16
            | ConvertedType::INT_32
            | ConvertedType::UINT_8
            | ConvertedType::UINT_16,
        ) => Int32Kind::Integer,
        (None, ConvertedType::UINT_32) => Int32Kind::Long,
        (None, ConvertedType::DATE) => Int32Kind::Date,
        (None, ConvertedType::TIME_MILLIS) => Int32Kind::TimeMillis,
        (None, ConvertedType::DECIMAL) => Int32Kind::Decimal(10f64.powi(descr.type_scale())),
        (logical, converted) => return Err(unsupported_annotation(descr, logical, converted)),
    };
    Ok(kind)
}

fn int64_kind(descr: &ColumnDescriptor) -> Result<Int64Kind> {
    let kind = match (descr.logical_type(), descr.converted_type()) {
        (Some(LogicalType::Integer { bit_width: 64, .. }), _) => Int64Kind::Long,
        (
            Some(LogicalType::Time {
                unit: TimeUnit::MICROS,
                ..
            }),
            _,
        ) => Int64Kind::TimeMicros,
        (Some(LogicalType::Timestamp { unit, .. }), _) => match unit {
            TimeUnit::MILLIS => Int64Kind::TimestampMillis,
            TimeUnit::MICROS => Int64Kind::TimestampMicros,
            TimeUnit::NANOS => Int64Kind::TimestampNanos,
        },
        (Some(LogicalType::Decimal { scale, .. }), _) => Int64Kind::Decimal(10f64.powi(scale)),
        (
            None,
            ConvertedType::NONE | ConvertedType::INT_64 | ConvertedType::UINT_64,
        ) => Int64Kind::Long,
        (None, ConvertedType::TIMESTAMP_MILLIS) => Int64Kind::TimestampMillis,
        (None, ConvertedType::TIMESTAMP_MICROS) => Int64Kind::TimestampMicros,
        (None, ConvertedType::TIME_MICROS) => Int64Kind::TimeMicros,
        (None, ConvertedType::DECIMAL) => Int64Kind::Decimal(10f64.powi(descr.type_scale())),
        (logical, converted) => return Err(unsupported_annotation(descr, logical, converted)),
    };
    Ok(kind)
}

fn binary_kind(descr: &ColumnDescriptor, options: &ReadOptions) -> Result<BinaryKind> {
    match (descr.logical_type(), descr.converted_type()) {
        (Some(LogicalType::String | LogicalType::Enum | LogicalType::Json), _) => {
            Ok(BinaryKind::Utf8)
        }
        (None, ConvertedType::UTF8 | ConvertedType::ENUM | ConvertedType::JSON) => {
            Ok(BinaryKind::Utf8)
        }
        (None, ConvertedType::NONE) => Ok(unannotated_kind(options)),
        (logical, converted) => Err(unsupported_annotation(descr, logical, converted)),
    }
}

fn unannotated_kind(options: &ReadOptions) -> BinaryKind {
    if options.treat_unannotated_binary_as_string {
        BinaryKind::Utf8
    } else {
        BinaryKind::Hex
    }
}

fn unsupported_annotation(
    descr: &ColumnDescriptor,
    logical: Option<LogicalType>,
    converted: ConvertedType,
) -> ParquetError {
    ParquetError::UnsupportedSchema(format!(
        "no output type for column {} with physical type {} annotated {:?}/{}",
        descr.path().string(),
        descr.physical_type(),
        logical,
        converted
    ))
}

impl Int32Kind {
    pub(crate) fn convert(&self, value: i32) -> Result<CellValue> {
        match self {
            Int32Kind::Integer => Ok(CellValue::Integer(value)),
            Int32Kind::Long => Ok(CellValue::Long(i64::from(value as u32))),
            Int32Kind::Date => UNIX_EPOCH_DAYS_FROM_CE
                .checked_add(value)
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .map(CellValue::Date)
                .ok_or_else(|| {
                    general_err!("date of {} days since the epoch is out of range", value)
                }),
            Int32Kind::TimeMillis => u32::try_from(value)
                .ok()
                .and_then(|millis| {
                    NaiveTime::from_num_seconds_from_midnight_opt(
                        millis / 1_000,
                        (millis % 1_000) * 1_000_000,
                    )
                })
                .map(CellValue::Time)
                .ok_or_else(|| {
                    general_err!("time of {} ms since midnight is out of range", value)
                }),
            Int32Kind::Decimal(divisor) => Ok(CellValue::Double(f64::from(value) / divisor)),
        }
    }
}

impl Int64Kind {
    pub(crate) fn convert(&self, value: i64) -> Result<CellValue> {
        match self {
            Int64Kind::Long => Ok(CellValue::Long(value)),
            Int64Kind::TimeMicros => u64::try_from(value)
                .ok()
                .and_then(|micros| {
                    let seconds = u32::try_from(micros / 1_000_000).ok()?;
                    NaiveTime::from_num_seconds_from_midnight_opt(
                        seconds,
                        ((micros % 1_000_000) * 1_000) as u32,
                    )
                })
                .map(CellValue::Time)
                .ok_or_else(|| {
                    general_err!("time of {} us since midnight is out of range", value)
                }),
            Int64Kind::TimestampMillis => DateTime::from_timestamp_millis(value)
                .map(|instant| CellValue::DateTime(instant.naive_utc()))
                .ok_or_else(|| timestamp_out_of_range(value, "ms")),
            Int64Kind::TimestampMicros => DateTime::from_timestamp_micros(value)
                .map(|instant| CellValue::DateTime(instant.naive_utc()))
                .ok_or_else(|| timestamp_out_of_range(value, "us")),
            Int64Kind::TimestampNanos => DateTime::from_timestamp(
                value.div_euclid(1_000_000_000),
                value.rem_euclid(1_000_000_000) as u32,
            )
            .map(|instant| CellValue::DateTime(instant.naive_utc()))
            .ok_or_else(|| timestamp_out_of_range(value, "ns")),
            Int64Kind::Decimal(divisor) => Ok(CellValue::Double(value as f64 / divisor)),
        }
    }
}

fn timestamp_out_of_range(value: i64, unit: &str) -> ParquetError {
    general_err!("timestamp of {value} {unit} since the epoch is out of range")
}

impl Int96Kind {
    pub(crate) fn convert(&self, value: &Int96) -> Result<CellValue> {
        match self {
            Int96Kind::Instant => {
                let words = value.data();
                let nanos_in_day = (i64::from(words[1]) << 32) + i64::from(words[0]);
                let julian_day = i64::from(words[2]);
                julian_day
                    .checked_sub(JULIAN_DAY_OF_EPOCH)
                    .and_then(|days| days.checked_mul(NANOSECONDS_PER_DAY))
                    .and_then(|nanos| nanos.checked_add(nanos_in_day))
                    .and_then(|nanos| {
                        DateTime::from_timestamp(
                            nanos.div_euclid(1_000_000_000),
                            nanos.rem_euclid(1_000_000_000) as u32,
                        )
                    })
                    .map(CellValue::Instant)
                    .ok_or_else(|| {
                        general_err!(
                            "INT96 timestamp on Julian day {} is outside the representable range",
                            julian_day
                        )
                    })
            }
            Int96Kind::Binary(kind) => {
                let mut bytes = [0u8; 12];
                for (chunk, word) in bytes.chunks_exact_mut(4).zip(value.data()) {
                    chunk.copy_from_slice(&word.to_le_bytes());
                }
                Ok(kind.convert(&bytes))
            }
        }
    }
}

impl BinaryKind {
    pub(crate) fn convert(&self, bytes: &[u8]) -> CellValue {
        match self {
            BinaryKind::Utf8 => CellValue::String(String::from_utf8_lossy(bytes).into_owned()),
            BinaryKind::Hex => CellValue::String(hex_string(bytes)),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    const ALPHABET: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(ALPHABET[usize::from(byte >> 4)] as char);
        out.push(ALPHABET[usize::from(byte & 0x0f)] as char);
    }
    out
}
