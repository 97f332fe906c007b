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

//! Contains implementations of the reader traits FileReader, RowGroupReader and PageReader

use std::{fs::File, path::Path, sync::Arc};

use bytes::Bytes;

use crate::basic::PageType;
use crate::column::page::{Page, PageReader};
use crate::compression::{create_codec, Codec};
use crate::errors::{ParquetError, Result};
use crate::file::footer;
use crate::file::metadata::thrift::PageHeader;
use crate::file::{metadata::*, reader::*};
use crate::thrift::ThriftCompactInputProtocol;

impl TryFrom<File> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(file: File) -> Result<Self> {
        Self::new(file)
    }
}

impl TryFrom<&Path> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::try_from(file)
    }
}

impl TryFrom<String> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(path: String) -> Result<Self> {
        Self::try_from(Path::new(&path))
    }
}

impl TryFrom<&str> for SerializedFileReader<File> {
    type Error = ParquetError;

    fn try_from(path: &str) -> Result<Self> {
        Self::try_from(Path::new(&path))
    }
}

// ----------------------------------------------------------------------
// Implementations of file & row group readers

/// A serialized implementation for Parquet [`FileReader`].
pub struct SerializedFileReader<R: ChunkReader> {
    chunk_reader: Arc<R>,
    metadata: Arc<ParquetMetaData>,
}

impl<R: 'static + ChunkReader> SerializedFileReader<R> {
    /// Creates file reader from a Parquet file.
    /// Returns an error if the Parquet file does not exist or is corrupt.
    pub fn new(chunk_reader: R) -> Result<Self> {
        let metadata = footer::parse_metadata(&chunk_reader)?;
        Ok(Self {
            chunk_reader: Arc::new(chunk_reader),
            metadata: Arc::new(metadata),
        })
    }
}

impl<R: 'static + ChunkReader> FileReader for SerializedFileReader<R> {
    fn metadata(&self) -> &ParquetMetaData {
        &self.metadata
    }

    fn num_row_groups(&self) -> usize {
        self.metadata.num_row_groups()
    }

    fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>> {
        let row_group_metadata = self.metadata.row_group(i);
        // Row groups should be processed sequentially.
        let f = Arc::clone(&self.chunk_reader);
        Ok(Box::new(SerializedRowGroupReader::new(
            f,
            row_group_metadata,
        )))
    }
}

/// A serialized implementation for Parquet [`RowGroupReader`].
pub struct SerializedRowGroupReader<'a, R: ChunkReader> {
    chunk_reader: Arc<R>,
    metadata: &'a RowGroupMetaData,
}

impl<'a, R: ChunkReader> SerializedRowGroupReader<'a, R> {
    /// Creates new row group reader from a file and row group metadata.
    pub fn new(chunk_reader: Arc<R>, metadata: &'a RowGroupMetaData) -> Self {
        Self {
            chunk_reader,
            metadata,
        }
    }
}

impl<R: 'static + ChunkReader> RowGroupReader for SerializedRowGroupReader<'_, R> {
    fn metadata(&self) -> &RowGroupMetaData {
        self.metadata
    }

    fn num_columns(&self) -> usize {
        self.metadata.num_columns()
    }

    fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader>> {
        let col = self.metadata.column(i);
        Ok(Box::new(SerializedPageReader::new(
            Arc::clone(&self.chunk_reader),
            col,
        )?))
    }
}

/// Decodes a [`Page`] from the provided `buffer`
pub(crate) fn decode_page(
    page_header: PageHeader,
    buffer: Bytes,
    decompressor: Option<&mut Box<dyn Codec>>,
) -> Result<Page> {
    // When processing data page v2, depending on enabled compression for the
    // page, we should account for uncompressed data ('offset') of
    // repetition and definition levels.
    //
    // We always use 0 offset for other pages other than v2, `true` flag means
    // that compression will be applied if decompressor is defined
    let mut offset: usize = 0;
    let mut can_decompress = true;

    if let Some(ref header_v2) = page_header.data_page_header_v2 {
        if header_v2.num_nulls > header_v2.num_values {
            return Err(general_err!(
                "Invalid page header: num_nulls ({}) is greater than num_values ({})",
                header_v2.num_nulls,
                header_v2.num_values
            ));
        }
        // sum in i64, the individual lengths can be anywhere in i32 range
        let def_levels_len = i64::from(header_v2.definition_levels_byte_length);
        let rep_levels_len = i64::from(header_v2.repetition_levels_byte_length);
        if def_levels_len < 0
            || rep_levels_len < 0
            || def_levels_len + rep_levels_len > i64::from(page_header.uncompressed_page_size)
        {
            return Err(ParquetError::TruncatedPage(format!(
                "DataPage v2 header contains implausible values \
                    for definition_levels_byte_length ({def_levels_len}) \
                    and repetition_levels_byte_length ({rep_levels_len}) \
                    given DataPage header provides uncompressed_page_size ({})",
                page_header.uncompressed_page_size
            )));
        }
        offset = usize::try_from(def_levels_len + rep_levels_len)?;
        can_decompress = header_v2.is_compressed;
    }

    let buffer = match decompressor {
        Some(decompressor) if can_decompress => {
            let uncompressed_page_size = usize::try_from(page_header.uncompressed_page_size)?;
            if offset > buffer.len() || offset > uncompressed_page_size {
                return Err(ParquetError::TruncatedPage(format!(
                    "level section of {offset} bytes does not fit in a page of {} \
                        compressed and {uncompressed_page_size} uncompressed bytes",
                    buffer.len()
                )));
            }
            let decompressed_size = uncompressed_page_size - offset;
            let mut decompressed = Vec::with_capacity(uncompressed_page_size);
            decompressed.extend_from_slice(&buffer[..offset]);
            // decompressed size of zero corresponds to a page with no non-null values
            if decompressed_size > 0 {
                let compressed = &buffer[offset..];
                decompressor.decompress(compressed, &mut decompressed, Some(decompressed_size))?;
            }

            if decompressed.len() != uncompressed_page_size {
                return Err(ParquetError::TruncatedPage(format!(
                    "Actual decompressed size doesn't match the expected one ({} vs {})",
                    decompressed.len(),
                    uncompressed_page_size
                )));
            }

            Bytes::from(decompressed)
        }
        _ => buffer,
    };

    let result = match page_header.type_ {
        PageType::DICTIONARY_PAGE => {
            let dict_header = page_header.dictionary_page_header.as_ref().ok_or_else(|| {
                ParquetError::General("Missing dictionary page header".to_string())
            })?;
            let is_sorted = dict_header.is_sorted.unwrap_or(false);
            Page::DictionaryPage {
                buf: buffer,
                num_values: dict_header.num_values.try_into()?,
                encoding: dict_header.encoding,
                is_sorted,
            }
        }
        PageType::DATA_PAGE => {
            let header = page_header
                .data_page_header
                .ok_or_else(|| ParquetError::General("Missing V1 data page header".to_string()))?;
            Page::DataPage {
                buf: buffer,
                num_values: header.num_values.try_into()?,
                encoding: header.encoding,
                def_level_encoding: header.definition_level_encoding,
                rep_level_encoding: header.repetition_level_encoding,
            }
        }
        PageType::DATA_PAGE_V2 => {
            let header = page_header
                .data_page_header_v2
                .ok_or_else(|| ParquetError::General("Missing V2 data page header".to_string()))?;
            Page::DataPageV2 {
                buf: buffer,
                num_values: header.num_values.try_into()?,
                encoding: header.encoding,
                num_nulls: header.num_nulls.try_into()?,
                num_rows: header.num_rows.try_into()?,
                def_levels_byte_len: header.definition_levels_byte_length.try_into()?,
                rep_levels_byte_len: header.repetition_levels_byte_length.try_into()?,
                is_compressed: header.is_compressed,
            }
        }
        _ => {
            return Err(general_err!(
                "Page type {:?} is not supported",
                page_header.type_
            ));
        }
    };

    Ok(result)
}

/// Starting number of bytes fetched when parsing a page header. Headers that
/// turn out larger are retried with a doubled window, up to the bytes left in
/// the column chunk.
const PAGE_HEADER_WINDOW_SIZE: u64 = 4096;

fn verify_page_size(
    compressed_size: i32,
    uncompressed_size: i32,
    remaining_bytes: u64,
) -> Result<()> {
    // The page's compressed size should not exceed the remaining bytes that are
    // available to read. The page's uncompressed size is the expected size
    // after decompression, which can never be negative.
    if compressed_size < 0 || compressed_size as u64 > remaining_bytes || uncompressed_size < 0 {
        return Err(ParquetError::TruncatedPage(format!(
            "page claims {compressed_size} compressed and {uncompressed_size} uncompressed \
                bytes, but its column chunk has only {remaining_bytes} bytes left"
        )));
    }
    Ok(())
}

/// A serialized implementation for Parquet [`PageReader`].
pub struct SerializedPageReader<R: ChunkReader> {
    /// The chunk reader
    reader: Arc<R>,

    /// The compression codec for this column chunk. Only set for non-PLAIN codec.
    decompressor: Option<Box<dyn Codec>>,

    /// The current byte offset in the reader
    offset: u64,

    /// The number of bytes left in the column chunk
    remaining_bytes: u64,
}

impl<R: ChunkReader> SerializedPageReader<R> {
    /// Creates a new serialized page reader from a chunk reader and metadata
    pub fn new(reader: Arc<R>, meta: &ColumnChunkMetaData) -> Result<Self> {
        let decompressor = create_codec(meta.compression())?;
        let (start, len) = meta.byte_range()?;
        Ok(Self {
            reader,
            decompressor,
            offset: start,
            remaining_bytes: len,
        })
    }

    /// Reads the page header at `offset`, returning it and its length in bytes.
    ///
    /// The header length is not recorded in the file, so a fixed window is
    /// fetched and parsing is retried with a larger one while it fails with an
    /// unexpected EOF. Once the window covers the rest of the column chunk an
    /// EOF means the chunk itself is cut short.
    fn read_page_header_len(&self, offset: u64, remaining_bytes: u64) -> Result<(usize, PageHeader)> {
        let mut window = PAGE_HEADER_WINDOW_SIZE.min(remaining_bytes);
        loop {
            let buffer = self.reader.get_bytes(offset, usize::try_from(window)?)?;
            let mut prot = ThriftCompactInputProtocol::new(buffer.as_ref());
            match PageHeader::try_from(&mut prot) {
                Ok(header) => {
                    let header_len = buffer.len() - prot.as_slice().len();
                    return Ok((header_len, header));
                }
                Err(ParquetError::EOF(_)) if window < remaining_bytes => {
                    window = window.saturating_mul(2).min(remaining_bytes);
                }
                Err(ParquetError::EOF(_)) => {
                    return Err(ParquetError::TruncatedPage(format!(
                        "page header extends past the end of the column chunk \
                            ({remaining_bytes} bytes left)"
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: ChunkReader> Iterator for SerializedPageReader<R> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_page().transpose()
    }
}

impl<R: ChunkReader> PageReader for SerializedPageReader<R> {
    fn get_next_page(&mut self) -> Result<Option<Page>> {
        loop {
            if self.remaining_bytes == 0 {
                return Ok(None);
            }

            let (header_len, header) =
                self.read_page_header_len(self.offset, self.remaining_bytes)?;
            self.offset += header_len as u64;
            self.remaining_bytes -= header_len as u64;

            verify_page_size(
                header.compressed_page_size,
                header.uncompressed_page_size,
                self.remaining_bytes,
            )?;
            let data_len = header.compressed_page_size as usize;
            let data_start = self.offset;
            self.offset += data_len as u64;
            self.remaining_bytes -= data_len as u64;

            if header.type_ == PageType::INDEX_PAGE {
                continue;
            }

            let buffer = self.reader.get_bytes(data_start, data_len)?;
            return Ok(Some(decode_page(
                header,
                buffer,
                self.decompressor.as_mut(),
            )?));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{Compression, Encoding};
    use crate::file::PARQUET_MAGIC;
    use std::io::Write;

    // ----------------------------------------------------------------------
    // Helpers that hand encode a single column Parquet file. The metadata is
    // written with the thrift compact protocol, one byte at a time.

    fn write_varint(out: &mut Vec<u8>, mut v: u64) {
        while v & !0x7F != 0 {
            out.push((v & 0x7F) as u8 | 0x80);
            v >>= 7;
        }
        out.push(v as u8);
    }

    fn zigzag(v: i64) -> u64 {
        ((v << 1) ^ (v >> 63)) as u64
    }

    // short form field header, works while field id deltas stay below 16
    fn write_i32_field(out: &mut Vec<u8>, delta: u8, v: i32) {
        out.push((delta << 4) | 0x05);
        write_varint(out, zigzag(v as i64));
    }

    fn write_i64_field(out: &mut Vec<u8>, delta: u8, v: i64) {
        out.push((delta << 4) | 0x06);
        write_varint(out, zigzag(v));
    }

    fn data_page_v1_header(
        uncompressed_size: i32,
        compressed_size: i32,
        num_values: i32,
        encoding: Encoding,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        write_i32_field(&mut out, 1, PageType::DATA_PAGE as i32);
        write_i32_field(&mut out, 1, uncompressed_size);
        write_i32_field(&mut out, 1, compressed_size);
        out.push(0x2c); // 5: data_page_header, struct
        write_i32_field(&mut out, 1, num_values);
        write_i32_field(&mut out, 1, encoding as i32);
        write_i32_field(&mut out, 1, Encoding::RLE as i32);
        write_i32_field(&mut out, 1, Encoding::RLE as i32);
        out.push(0x00); // stop (DataPageHeader)
        out.push(0x00); // stop (PageHeader)
        out
    }

    fn data_page_v2_header(
        uncompressed_size: i32,
        compressed_size: i32,
        num_values: i32,
        num_nulls: i32,
        num_rows: i32,
        encoding: Encoding,
        def_levels_byte_length: i32,
        rep_levels_byte_length: i32,
        is_compressed: bool,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        write_i32_field(&mut out, 1, PageType::DATA_PAGE_V2 as i32);
        write_i32_field(&mut out, 1, uncompressed_size);
        write_i32_field(&mut out, 1, compressed_size);
        out.push(0x5c); // 8: data_page_header_v2, struct
        write_i32_field(&mut out, 1, num_values);
        write_i32_field(&mut out, 1, num_nulls);
        write_i32_field(&mut out, 1, num_rows);
        write_i32_field(&mut out, 1, encoding as i32);
        write_i32_field(&mut out, 1, def_levels_byte_length);
        write_i32_field(&mut out, 1, rep_levels_byte_length);
        out.push(if is_compressed { 0x11 } else { 0x12 }); // 7: is_compressed
        out.push(0x00); // stop (DataPageHeaderV2)
        out.push(0x00); // stop (PageHeader)
        out
    }

    fn dictionary_page_header(
        uncompressed_size: i32,
        compressed_size: i32,
        num_values: i32,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        write_i32_field(&mut out, 1, PageType::DICTIONARY_PAGE as i32);
        write_i32_field(&mut out, 1, uncompressed_size);
        write_i32_field(&mut out, 1, compressed_size);
        out.push(0x4c); // 7: dictionary_page_header, struct
        write_i32_field(&mut out, 1, num_values);
        write_i32_field(&mut out, 1, Encoding::PLAIN_DICTIONARY as i32);
        out.push(0x00); // stop (DictionaryPageHeader)
        out.push(0x00); // stop (PageHeader)
        out
    }

    fn index_page_header(compressed_size: i32) -> Vec<u8> {
        let mut out = Vec::new();
        write_i32_field(&mut out, 1, PageType::INDEX_PAGE as i32);
        write_i32_field(&mut out, 1, compressed_size);
        write_i32_field(&mut out, 1, compressed_size);
        out.push(0x00); // stop (PageHeader)
        out
    }

    // schema with a single required INT32 column named "a"
    fn schema_bytes() -> Vec<u8> {
        vec![
            0x19, 0x2c, // 2: schema, list of 2 structs
            0x48, 0x06, b's', b'c', b'h', b'e', b'm', b'a', // 4: name = "schema"
            0x15, 0x02, // 5: num_children = 1
            0x00, // stop (SchemaElement)
            0x15, 0x02, // 1: type = 1 (INT32)
            0x25, 0x00, // 3: repetition_type = 0 (REQUIRED)
            0x18, 0x01, b'a', // 4: name = "a"
            0x00, // stop (SchemaElement)
        ]
    }

    fn column_chunk_bytes(
        codec: Compression,
        num_values: i64,
        total_compressed_size: i64,
        data_page_offset: i64,
        dictionary_page_offset: Option<i64>,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        write_i64_field(&mut out, 2, 0); // 2: file_offset = 0
        out.push(0x1c); // 3: meta_data, struct
        write_i32_field(&mut out, 1, 1); // 1: type = INT32
        out.push(0x19); // 2: encodings
        out.push(0x25); // list of 2 i32
        write_varint(&mut out, zigzag(Encoding::PLAIN as i64));
        write_varint(&mut out, zigzag(Encoding::RLE as i64));
        write_i32_field(&mut out, 2, codec as i32); // 4: codec
        write_i64_field(&mut out, 1, num_values); // 5: num_values
        write_i64_field(&mut out, 1, total_compressed_size); // 6: total_uncompressed_size
        write_i64_field(&mut out, 1, total_compressed_size); // 7: total_compressed_size
        write_i64_field(&mut out, 2, data_page_offset); // 9: data_page_offset
        if let Some(offset) = dictionary_page_offset {
            write_i64_field(&mut out, 2, offset); // 11: dictionary_page_offset
        }
        out.push(0x00); // stop (ColumnMetaData)
        out.push(0x00); // stop (ColumnChunk)
        out
    }

    fn metadata_bytes(num_rows: i64, row_group: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        write_i32_field(&mut out, 1, 1); // 1: version = 1
        out.extend_from_slice(&schema_bytes()); // 2: schema
        write_i64_field(&mut out, 1, num_rows); // 3: num_rows
        out.push(0x19); // 4: row_groups
        out.push(0x1c); // list of 1 struct
        out.extend_from_slice(row_group);
        out.push(0x00); // stop (FileMetaData)
        out
    }

    struct TestPage {
        header: Vec<u8>,
        data: Vec<u8>,
        is_dictionary: bool,
    }

    impl TestPage {
        fn new(header: Vec<u8>, data: Vec<u8>) -> Self {
            Self {
                header,
                data,
                is_dictionary: false,
            }
        }

        fn dictionary(header: Vec<u8>, data: Vec<u8>) -> Self {
            Self {
                header,
                data,
                is_dictionary: true,
            }
        }
    }

    // assembles a complete single column file around the provided pages
    fn build_single_column_file(
        pages: Vec<TestPage>,
        codec: Compression,
        num_values: i64,
        num_rows: i64,
    ) -> Bytes {
        let mut out = Vec::new();
        out.extend_from_slice(&PARQUET_MAGIC);

        let mut dict_offset = None;
        let mut data_offset = None;
        for page in &pages {
            let offset = out.len() as i64;
            if page.is_dictionary {
                dict_offset = Some(offset);
            } else if data_offset.is_none() {
                data_offset = Some(offset);
            }
            out.extend_from_slice(&page.header);
            out.extend_from_slice(&page.data);
        }
        let col_start = dict_offset.or(data_offset).unwrap();
        let total_compressed_size = out.len() as i64 - col_start;

        let column = column_chunk_bytes(
            codec,
            num_values,
            total_compressed_size,
            data_offset.unwrap(),
            dict_offset,
        );
        let mut row_group = Vec::new();
        row_group.push(0x19); // 1: columns
        row_group.push(0x1c); // list of 1 struct
        row_group.extend_from_slice(&column);
        write_i64_field(&mut row_group, 1, total_compressed_size); // 2: total_byte_size
        write_i64_field(&mut row_group, 1, num_rows); // 3: num_rows
        row_group.push(0x00); // stop (RowGroup)

        let metadata = metadata_bytes(num_rows, &row_group);
        out.extend_from_slice(&metadata);
        out.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
        out.extend_from_slice(&PARQUET_MAGIC);
        out.into()
    }

    fn plain_i32_bytes(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn collect_pages(data: Bytes) -> Result<Vec<Page>> {
        let reader = SerializedFileReader::new(data)?;
        let row_group = reader.get_row_group(0)?;
        let page_reader = row_group.get_column_page_reader(0)?;
        page_reader.collect()
    }

    #[test]
    fn test_read_plain_v1_pages() {
        let first = plain_i32_bytes(&[1, 2, 3, 4, 5]);
        let second = plain_i32_bytes(&[6, 7, 8]);
        let data = build_single_column_file(
            vec![
                TestPage::new(
                    data_page_v1_header(first.len() as i32, first.len() as i32, 5, Encoding::PLAIN),
                    first.clone(),
                ),
                TestPage::new(
                    data_page_v1_header(
                        second.len() as i32,
                        second.len() as i32,
                        3,
                        Encoding::PLAIN,
                    ),
                    second.clone(),
                ),
            ],
            Compression::UNCOMPRESSED,
            8,
            8,
        );

        let reader = SerializedFileReader::new(data).unwrap();
        assert_eq!(reader.num_row_groups(), 1);
        assert_eq!(reader.metadata().file_metadata().num_rows(), 8);

        let row_group = reader.get_row_group(0).unwrap();
        assert_eq!(row_group.num_columns(), 1);
        assert_eq!(row_group.metadata().num_rows(), 8);

        let mut page_reader = row_group.get_column_page_reader(0).unwrap();
        let page = page_reader.get_next_page().unwrap().unwrap();
        match page {
            Page::DataPage {
                buf,
                num_values,
                encoding,
                def_level_encoding,
                rep_level_encoding,
            } => {
                assert_eq!(buf.as_ref(), first.as_slice());
                assert_eq!(num_values, 5);
                assert_eq!(encoding, Encoding::PLAIN);
                assert_eq!(def_level_encoding, Encoding::RLE);
                assert_eq!(rep_level_encoding, Encoding::RLE);
            }
            other => panic!("expected a v1 data page, got {:?}", other.page_type()),
        }
        let page = page_reader.get_next_page().unwrap().unwrap();
        assert_eq!(page.buffer().as_ref(), second.as_slice());
        assert_eq!(page.num_values(), 3);
        assert!(page_reader.get_next_page().unwrap().is_none());
    }

    #[test]
    fn test_read_dictionary_and_data_page() {
        let dict = plain_i32_bytes(&[10, 20, 30]);
        // bit width 2 followed by one bit-packed group of indices
        let indices = vec![2u8, 0x03, 0x24, 0x01];
        let data = build_single_column_file(
            vec![
                TestPage::dictionary(
                    dictionary_page_header(dict.len() as i32, dict.len() as i32, 3),
                    dict.clone(),
                ),
                TestPage::new(
                    data_page_v1_header(
                        indices.len() as i32,
                        indices.len() as i32,
                        4,
                        Encoding::RLE_DICTIONARY,
                    ),
                    indices.clone(),
                ),
            ],
            Compression::UNCOMPRESSED,
            4,
            4,
        );

        let pages = collect_pages(data).unwrap();
        assert_eq!(pages.len(), 2);
        match &pages[0] {
            Page::DictionaryPage {
                buf,
                num_values,
                encoding,
                is_sorted,
            } => {
                assert_eq!(buf.as_ref(), dict.as_slice());
                assert_eq!(*num_values, 3);
                assert_eq!(*encoding, Encoding::PLAIN_DICTIONARY);
                assert!(!is_sorted);
            }
            other => panic!("expected a dictionary page, got {:?}", other.page_type()),
        }
        assert_eq!(pages[1].encoding(), Encoding::RLE_DICTIONARY);
        assert_eq!(pages[1].buffer().as_ref(), indices.as_slice());
    }

    #[test]
    fn test_read_data_page_v2() {
        // 2 byte definition level run followed by the values
        let mut body = vec![0x03u8, 0x01];
        body.extend_from_slice(&plain_i32_bytes(&[7, 8, 9]));
        let data = build_single_column_file(
            vec![TestPage::new(
                data_page_v2_header(
                    body.len() as i32,
                    body.len() as i32,
                    4,
                    1,
                    4,
                    Encoding::PLAIN,
                    2,
                    0,
                    false,
                ),
                body.clone(),
            )],
            Compression::UNCOMPRESSED,
            4,
            4,
        );

        let pages = collect_pages(data).unwrap();
        assert_eq!(pages.len(), 1);
        match &pages[0] {
            Page::DataPageV2 {
                buf,
                num_values,
                encoding,
                num_nulls,
                num_rows,
                def_levels_byte_len,
                rep_levels_byte_len,
                is_compressed,
            } => {
                assert_eq!(buf.as_ref(), body.as_slice());
                assert_eq!(*num_values, 4);
                assert_eq!(*encoding, Encoding::PLAIN);
                assert_eq!(*num_nulls, 1);
                assert_eq!(*num_rows, 4);
                assert_eq!(*def_levels_byte_len, 2);
                assert_eq!(*rep_levels_byte_len, 0);
                assert!(!is_compressed);
            }
            other => panic!("expected a v2 data page, got {:?}", other.page_type()),
        }
    }

    #[test]
    #[cfg(feature = "snap")]
    fn test_read_snappy_page() {
        let plain = plain_i32_bytes(&[100, 200, 300, 400]);
        let mut codec = crate::compression::SnappyCodec::new();
        let mut compressed = Vec::new();
        codec.compress(&plain, &mut compressed).unwrap();

        let data = build_single_column_file(
            vec![TestPage::new(
                data_page_v1_header(
                    plain.len() as i32,
                    compressed.len() as i32,
                    4,
                    Encoding::PLAIN,
                ),
                compressed,
            )],
            Compression::SNAPPY,
            4,
            4,
        );

        let pages = collect_pages(data).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].buffer().as_ref(), plain.as_slice());
    }

    #[test]
    #[cfg(feature = "snap")]
    fn test_read_snappy_page_v2_keeps_levels_uncompressed() {
        // levels stay uncompressed ahead of the snappy compressed values
        let levels = vec![0x03u8, 0x01];
        let values = plain_i32_bytes(&[5, 6, 7]);
        let mut codec = crate::compression::SnappyCodec::new();
        let mut compressed_values = Vec::new();
        codec.compress(&values, &mut compressed_values).unwrap();

        let mut body = levels.clone();
        body.extend_from_slice(&compressed_values);
        let uncompressed_size = (levels.len() + values.len()) as i32;

        let data = build_single_column_file(
            vec![TestPage::new(
                data_page_v2_header(
                    uncompressed_size,
                    body.len() as i32,
                    3,
                    0,
                    3,
                    Encoding::PLAIN,
                    levels.len() as i32,
                    0,
                    true,
                ),
                body,
            )],
            Compression::SNAPPY,
            3,
            3,
        );

        let pages = collect_pages(data).unwrap();
        assert_eq!(pages.len(), 1);
        let mut expected = levels;
        expected.extend_from_slice(&values);
        assert_eq!(pages[0].buffer().as_ref(), expected.as_slice());
    }

    #[test]
    fn test_skips_index_page() {
        let first = plain_i32_bytes(&[1, 2]);
        let second = plain_i32_bytes(&[3]);
        let data = build_single_column_file(
            vec![
                TestPage::new(
                    data_page_v1_header(first.len() as i32, first.len() as i32, 2, Encoding::PLAIN),
                    first,
                ),
                TestPage::new(index_page_header(4), vec![0xAA; 4]),
                TestPage::new(
                    data_page_v1_header(
                        second.len() as i32,
                        second.len() as i32,
                        1,
                        Encoding::PLAIN,
                    ),
                    second,
                ),
            ],
            Compression::UNCOMPRESSED,
            3,
            3,
        );

        let pages = collect_pages(data).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].num_values(), 2);
        assert_eq!(pages[1].num_values(), 1);
    }

    #[test]
    fn test_page_larger_than_chunk() {
        // header claims 1000 data bytes, the chunk holds 4
        let data = build_single_column_file(
            vec![TestPage::new(
                data_page_v1_header(1000, 1000, 5, Encoding::PLAIN),
                vec![0u8; 4],
            )],
            Compression::UNCOMPRESSED,
            5,
            5,
        );

        let err = collect_pages(data).unwrap_err();
        assert!(matches!(err, ParquetError::TruncatedPage(_)), "{err}");
    }

    #[test]
    fn test_truncated_page_header() {
        // chunk ends in the middle of the page header
        let header = data_page_v1_header(100, 100, 5, Encoding::PLAIN);
        let truncated = header[..3].to_vec();
        let data = build_single_column_file(
            vec![TestPage::new(truncated, Vec::new())],
            Compression::UNCOMPRESSED,
            5,
            5,
        );

        let err = collect_pages(data).unwrap_err();
        assert!(matches!(err, ParquetError::TruncatedPage(_)), "{err}");
        assert!(
            err.to_string().contains("page header extends past"),
            "{err}"
        );
    }

    #[test]
    fn test_corrupt_page_header() {
        // 0x1f is not a valid thrift compact field type
        let data = build_single_column_file(
            vec![TestPage::new(vec![0x1f, 0x00, 0x00, 0x00], Vec::new())],
            Compression::UNCOMPRESSED,
            5,
            5,
        );

        let err = collect_pages(data).unwrap_err();
        assert!(matches!(err, ParquetError::General(_)), "{err}");
    }

    #[test]
    fn test_unsupported_codec() {
        let body = plain_i32_bytes(&[1]);
        let data = build_single_column_file(
            vec![TestPage::new(
                data_page_v1_header(body.len() as i32, body.len() as i32, 1, Encoding::PLAIN),
                body,
            )],
            Compression::LZO,
            1,
            1,
        );

        let reader = SerializedFileReader::new(data).unwrap();
        let row_group = reader.get_row_group(0).unwrap();
        let err = row_group.get_column_page_reader(0).unwrap_err();
        assert!(
            matches!(err, ParquetError::UnsupportedCompressionCodec(_)),
            "{err}"
        );
        assert!(err.to_string().contains("LZO"), "{err}");
    }

    #[test]
    fn test_decode_page_v2_implausible_levels() {
        let header = PageHeader {
            type_: PageType::DATA_PAGE_V2,
            uncompressed_page_size: 10,
            compressed_page_size: 10,
            crc: None,
            data_page_header: None,
            index_page_header: None,
            dictionary_page_header: None,
            data_page_header_v2: Some(crate::file::metadata::thrift::DataPageHeaderV2 {
                num_values: 5,
                num_nulls: 0,
                num_rows: 5,
                encoding: Encoding::PLAIN,
                definition_levels_byte_length: 100,
                repetition_levels_byte_length: 0,
                is_compressed: false,
            }),
        };
        let err = decode_page(header, Bytes::from_static(&[0u8; 10]), None).unwrap_err();
        assert!(matches!(err, ParquetError::TruncatedPage(_)), "{err}");
        assert!(err.to_string().contains("implausible values"), "{err}");
    }

    #[test]
    fn test_decode_page_v2_num_nulls_exceeds_num_values() {
        let header = PageHeader {
            type_: PageType::DATA_PAGE_V2,
            uncompressed_page_size: 10,
            compressed_page_size: 10,
            crc: None,
            data_page_header: None,
            index_page_header: None,
            dictionary_page_header: None,
            data_page_header_v2: Some(crate::file::metadata::thrift::DataPageHeaderV2 {
                num_values: 5,
                num_nulls: 10,
                num_rows: 5,
                encoding: Encoding::PLAIN,
                definition_levels_byte_length: 0,
                repetition_levels_byte_length: 0,
                is_compressed: false,
            }),
        };
        let err = decode_page(header, Bytes::from_static(&[0u8; 10]), None).unwrap_err();
        assert!(err.to_string().contains("num_nulls"), "{err}");
    }

    #[test]
    #[cfg(feature = "snap")]
    fn test_decode_page_decompressed_size_mismatch() {
        let plain = plain_i32_bytes(&[1, 2]);
        let mut codec = crate::compression::SnappyCodec::new();
        let mut compressed = Vec::new();
        codec.compress(&plain, &mut compressed).unwrap();

        // header claims a bigger uncompressed size than the data inflates to
        let data = build_single_column_file(
            vec![TestPage::new(
                data_page_v1_header(100, compressed.len() as i32, 2, Encoding::PLAIN),
                compressed,
            )],
            Compression::SNAPPY,
            2,
            2,
        );

        let err = collect_pages(data).unwrap_err();
        assert!(
            err.to_string().contains("decompressed size"),
            "{err}"
        );
    }

    #[test]
    fn test_file_reader_try_from_path() {
        let body = plain_i32_bytes(&[1, 2, 3]);
        let data = build_single_column_file(
            vec![TestPage::new(
                data_page_v1_header(body.len() as i32, body.len() as i32, 3, Encoding::PLAIN),
                body,
            )],
            Compression::UNCOMPRESSED,
            3,
            3,
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let reader = SerializedFileReader::try_from(file.path()).unwrap();
        assert_eq!(reader.num_row_groups(), 1);

        let reader = SerializedFileReader::try_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(reader.metadata().file_metadata().num_rows(), 3);

        assert!(SerializedFileReader::try_from("/no/such/file.parquet").is_err());
    }

    #[test]
    fn test_page_reader_iterator() {
        let body = plain_i32_bytes(&[4, 5]);
        let data = build_single_column_file(
            vec![TestPage::new(
                data_page_v1_header(body.len() as i32, body.len() as i32, 2, Encoding::PLAIN),
                body,
            )],
            Compression::UNCOMPRESSED,
            2,
            2,
        );

        let reader = SerializedFileReader::new(data).unwrap();
        let row_group = reader.get_row_group(0).unwrap();
        let page_reader = row_group.get_column_page_reader(0).unwrap();
        let pages: Vec<_> = page_reader.map(Result::unwrap).collect();
        assert_eq!(pages.len(), 1);
    }
}
