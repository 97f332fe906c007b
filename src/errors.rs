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

//! Common Parquet errors and macros.

use std::error::Error;
use std::{io, result, str};

/// Parquet error enumeration
#[derive(Debug)]
#[non_exhaustive]
pub enum ParquetError {
    /// General Parquet error.
    /// Returned when code violates normal workflow of working with Parquet files.
    General(String),
    /// "Not yet implemented" Parquet error.
    /// Returned when functionality is not yet available.
    NYI(String),
    /// "End of file" Parquet error.
    /// Returned when IO related failures occur, e.g. when there are not enough bytes to
    /// decode.
    EOF(String),
    /// Returned when the footer magic is absent or the footer metadata cannot be decoded.
    CorruptFooter(String),
    /// Returned when the footer declares a format version this crate does not read.
    UnsupportedSchemaVersion(i32),
    /// Returned when a page holds fewer bytes than its header declares.
    TruncatedPage(String),
    /// Returned when the file holds fewer bytes than its metadata declares.
    TruncatedFile(String),
    /// Returned when a column chunk declares a compression codec this crate cannot
    /// decompress. Carries the codec name.
    UnsupportedCompressionCodec(String),
    /// Returned when a page declares an encoding this crate cannot decode. Carries the
    /// encoding name.
    UnsupportedEncoding(String),
    /// Returned when a decoded column disagrees with the declared row count.
    RowCountMismatch(String),
    /// Returned when the file schema uses a shape this crate does not reconstruct, e.g.
    /// multi-level nested lists or maps.
    UnsupportedSchema(String),
    /// Error when the requested index is more than the
    /// number of items expected
    IndexOutOfBound(usize, usize),
    /// An external error variant
    External(Box<dyn Error + Send + Sync>),
}

impl std::fmt::Display for ParquetError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self {
            ParquetError::General(message) => {
                write!(fmt, "Parquet error: {message}")
            }
            ParquetError::NYI(message) => write!(fmt, "NYI: {message}"),
            ParquetError::EOF(message) => write!(fmt, "EOF: {message}"),
            ParquetError::CorruptFooter(message) => write!(fmt, "Corrupt footer: {message}"),
            ParquetError::UnsupportedSchemaVersion(version) => {
                write!(fmt, "Unsupported schema version: {version}")
            }
            ParquetError::TruncatedPage(message) => write!(fmt, "Truncated page: {message}"),
            ParquetError::TruncatedFile(message) => write!(fmt, "Truncated file: {message}"),
            ParquetError::UnsupportedCompressionCodec(codec) => {
                write!(fmt, "Unsupported compression codec: {codec}")
            }
            ParquetError::UnsupportedEncoding(encoding) => {
                write!(fmt, "Unsupported encoding: {encoding}")
            }
            ParquetError::RowCountMismatch(message) => {
                write!(fmt, "Row count mismatch: {message}")
            }
            ParquetError::UnsupportedSchema(message) => {
                write!(fmt, "Unsupported schema: {message}")
            }
            ParquetError::IndexOutOfBound(index, bound) => {
                write!(fmt, "Index {index} out of bound: {bound}")
            }
            ParquetError::External(e) => write!(fmt, "External: {e}"),
        }
    }
}

impl Error for ParquetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParquetError::External(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for ParquetError {
    fn from(e: io::Error) -> ParquetError {
        ParquetError::External(Box::new(e))
    }
}

impl From<str::Utf8Error> for ParquetError {
    fn from(e: str::Utf8Error) -> ParquetError {
        ParquetError::External(Box::new(e))
    }
}

impl From<std::num::TryFromIntError> for ParquetError {
    fn from(e: std::num::TryFromIntError) -> ParquetError {
        ParquetError::General(format!("Integer overflow: {e}"))
    }
}

#[cfg(any(feature = "snap", test))]
impl From<snap::Error> for ParquetError {
    fn from(e: snap::Error) -> ParquetError {
        ParquetError::External(Box::new(e))
    }
}

/// A specialized `Result` for Parquet errors.
pub type Result<T, E = ParquetError> = result::Result<T, E>;

// ----------------------------------------------------------------------
// Conversion from `ParquetError` to other types of `Error`s

impl From<ParquetError> for io::Error {
    fn from(e: ParquetError) -> Self {
        io::Error::new(io::ErrorKind::Other, e)
    }
}

// ----------------------------------------------------------------------
// Convenient macros for different errors

macro_rules! general_err {
    ($fmt:expr) => (crate::errors::ParquetError::General($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::errors::ParquetError::General(format!($fmt, $($args),*)));
    ($e:expr, $fmt:expr) => (crate::errors::ParquetError::General($fmt.to_owned(), $e));
    ($e:ident, $fmt:expr, $($args:tt),*) => (
        crate::errors::ParquetError::General(&format!($fmt, $($args),*), $e));
}

macro_rules! nyi_err {
    ($fmt:expr) => (crate::errors::ParquetError::NYI($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::errors::ParquetError::NYI(format!($fmt, $($args),*)));
}

macro_rules! eof_err {
    ($fmt:expr) => (crate::errors::ParquetError::EOF($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::errors::ParquetError::EOF(format!($fmt, $($args),*)));
}
