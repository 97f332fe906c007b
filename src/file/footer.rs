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

//! Module for working with Parquet file footers.

use std::io::Read;

use crate::errors::{ParquetError, Result};
use crate::file::metadata::thrift::parquet_metadata_from_bytes;
use crate::file::metadata::ParquetMetaData;
use crate::file::reader::ChunkReader;
use crate::file::{FOOTER_SIZE, PARQUET_MAGIC, PARQUET_MAGIC_ENCR_FOOTER};

/// The last 8 bytes of a Parquet file
///
/// There are 8 bytes at the end of the Parquet footer with the following layout:
/// * 4 bytes for the metadata length
/// * 4 bytes for the magic bytes 'PAR1' or 'PARE' (encrypted footer)
///
/// ```text
/// +-----+------------------+
/// | len | 'PAR1' or 'PARE' |
/// +-----+------------------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterTail {
    metadata_length: usize,
    encrypted_footer: bool,
}

impl FooterTail {
    /// Try to decode the footer tail from the given 8 bytes
    pub fn try_new(slice: &[u8; FOOTER_SIZE]) -> Result<Self> {
        let magic = &slice[4..];
        let encrypted_footer = if magic == PARQUET_MAGIC_ENCR_FOOTER {
            true
        } else if magic == PARQUET_MAGIC {
            false
        } else {
            return Err(ParquetError::CorruptFooter(
                "Invalid Parquet file. Magic bytes not found in footer".to_string(),
            ));
        };
        // u32 won't be larger than usize
        let metadata_length = u32::from_le_bytes(slice[..4].try_into().unwrap()) as usize;
        Ok(Self {
            metadata_length,
            encrypted_footer,
        })
    }

    /// The length of the footer metadata in bytes
    pub fn metadata_length(&self) -> usize {
        self.metadata_length
    }

    /// Whether the footer metadata is encrypted
    pub fn is_encrypted_footer(&self) -> bool {
        self.encrypted_footer
    }
}

/// Reads the [`ParquetMetaData`] from the footer of the Parquet source.
///
/// # Layout of Parquet file
/// ```text
/// +---------------------------+-----+---+
/// |      Rest of file         |  B  | A |
/// +---------------------------+-----+---+
/// ```
/// where
/// * `A`: parquet footer which stores the length of the metadata and the magic bytes
/// * `B`: parquet metadata
pub fn parse_metadata<R: ChunkReader>(chunk_reader: &R) -> Result<ParquetMetaData> {
    // check file is large enough to hold footer
    let file_size = chunk_reader.len();
    if file_size < (FOOTER_SIZE + PARQUET_MAGIC.len()) as u64 {
        return Err(ParquetError::CorruptFooter(
            "Invalid Parquet file. Size is smaller than header + footer".to_string(),
        ));
    }

    let mut footer = [0_u8; FOOTER_SIZE];
    chunk_reader
        .get_read(file_size - FOOTER_SIZE as u64)?
        .read_exact(&mut footer)?;

    let footer = FooterTail::try_new(&footer)?;
    if footer.is_encrypted_footer() {
        return Err(nyi_err!(
            "Parquet files with an encrypted footer are not supported"
        ));
    }

    let metadata_len = footer.metadata_length();
    let footer_metadata_len = FOOTER_SIZE + metadata_len;
    if footer_metadata_len as u64 > file_size {
        return Err(ParquetError::CorruptFooter(format!(
            "Invalid Parquet file. Reported metadata length of {} + {} byte footer, but file is only {} bytes",
            metadata_len, FOOTER_SIZE, file_size
        )));
    }

    let start = file_size - footer_metadata_len as u64;
    decode_metadata(chunk_reader.get_bytes(start, metadata_len)?.as_ref())
}

/// Decodes [`ParquetMetaData`] from the provided bytes.
///
/// Typically this is used to decode the metadata from the end of a parquet
/// file. The format of `buf` is the Thrift compact binary protocol, as specified
/// by the [Parquet Spec]. It does **NOT** include the 8-byte footer.
///
/// [Parquet Spec]: https://github.com/apache/parquet-format#metadata
pub fn decode_metadata(buf: &[u8]) -> Result<ParquetMetaData> {
    parquet_metadata_from_bytes(buf).map_err(|e| match e {
        // thrift level decode failures mean the footer bytes cannot be trusted
        ParquetError::General(msg) | ParquetError::EOF(msg) => ParquetError::CorruptFooter(msg),
        other => other,
    })
}
