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

//! Contains column reader API.

use bytes::Bytes;

use crate::basic::{Encoding, Type};
use crate::column::page::{Page, PageReader};
use crate::column::reader::decoder::{DefinitionLevelDecoder, RepetitionLevelDecoder};
use crate::data_type::*;
use crate::encodings::decoding::{DictDecoder, PlainDecoder, ValueDecoder};
use crate::errors::{ParquetError, Result};
use crate::schema::types::ColumnDescPtr;
use crate::util::bit_util::{ceil, num_required_bits, read_num_bytes};

pub(crate) mod decoder;

/// Column reader for a Parquet type.
pub enum ColumnReader {
    /// A `bool` column reader
    BoolColumnReader(ColumnReaderImpl<BoolType>),
    /// A `i32` column reader
    Int32ColumnReader(ColumnReaderImpl<Int32Type>),
    /// A `i64` column reader
    Int64ColumnReader(ColumnReaderImpl<Int64Type>),
    /// An [`Int96`] column reader
    Int96ColumnReader(ColumnReaderImpl<Int96Type>),
    /// A `f32` column reader
    FloatColumnReader(ColumnReaderImpl<FloatType>),
    /// A `f64` column reader
    DoubleColumnReader(ColumnReaderImpl<DoubleType>),
    /// A [`ByteArray`] column reader
    ByteArrayColumnReader(ColumnReaderImpl<ByteArrayType>),
    /// A [`FixedLenByteArray`] column reader
    FixedLenByteArrayColumnReader(ColumnReaderImpl<FixedLenByteArrayType>),
}

/// Gets column reader based on `col_descr` descriptor.
pub fn get_column_reader(
    col_descr: ColumnDescPtr,
    col_page_reader: Box<dyn PageReader>,
) -> ColumnReader {
    match col_descr.physical_type() {
        Type::BOOLEAN => {
            ColumnReader::BoolColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Type::INT32 => {
            ColumnReader::Int32ColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Type::INT64 => {
            ColumnReader::Int64ColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Type::INT96 => {
            ColumnReader::Int96ColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Type::FLOAT => {
            ColumnReader::FloatColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Type::DOUBLE => {
            ColumnReader::DoubleColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Type::BYTE_ARRAY => {
            ColumnReader::ByteArrayColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
        }
        Type::FIXED_LEN_BYTE_ARRAY => ColumnReader::FixedLenByteArrayColumnReader(
            ColumnReaderImpl::new(col_descr, col_page_reader),
        ),
    }
}

/// Gets typed column reader for the specified column type.
///
/// Panics if the column reader does not match the column type `T`.
pub fn get_typed_column_reader<T: DataType>(col_reader: ColumnReader) -> ColumnReaderImpl<T> {
    T::get_column_reader(col_reader).unwrap_or_else(|| {
        panic!(
            "Failed to convert column reader into a typed column reader for `{}` type",
            T::get_physical_type()
        )
    })
}

/// Reads the values of a single column chunk, page by page.
///
/// The encoding of each page is resolved into a value decoder when the page
/// is loaded, values are then read interleaved with their definition and
/// repetition levels.
pub struct ColumnReaderImpl<T: DataType> {
    descr: ColumnDescPtr,
    page_reader: Box<dyn PageReader>,

    /// The total number of values stored in the data page.
    num_buffered_values: usize,

    /// The number of values from the current data page that has been decoded into memory
    /// so far.
    num_decoded_values: usize,

    /// The decoder for the definition levels if any
    def_level_decoder: Option<DefinitionLevelDecoder>,

    /// The decoder for the repetition levels if any
    rep_level_decoder: Option<RepetitionLevelDecoder>,

    /// The decoder for dictionary encoded pages, created when the dictionary
    /// page at the start of the column chunk is read
    dict_decoder: Option<ValueDecoder<T>>,

    /// The decoder for the most recent non-dictionary value encoding seen in
    /// this column chunk
    direct_decoder: Option<ValueDecoder<T>>,

    /// Whether the current data page is dictionary encoded
    current_is_dict: bool,
}

impl<T: DataType> ColumnReaderImpl<T> {
    /// Creates new column reader based on column descriptor and page reader.
    pub fn new(descr: ColumnDescPtr, page_reader: Box<dyn PageReader>) -> Self {
        let def_level_decoder =
            (descr.max_def_level() != 0).then(|| DefinitionLevelDecoder::new(descr.max_def_level()));

        let rep_level_decoder =
            (descr.max_rep_level() != 0).then(|| RepetitionLevelDecoder::new(descr.max_rep_level()));

        Self {
            descr,
            page_reader,
            num_buffered_values: 0,
            num_decoded_values: 0,
            def_level_decoder,
            rep_level_decoder,
            dict_decoder: None,
            direct_decoder: None,
            current_is_dict: false,
        }
    }

    /// Read up to `max_records` whole records, returning the number of complete
    /// records, non-null values and levels decoded. All levels for a given record
    /// will be read, i.e. the next repetition level, if any, will be 0.
    ///
    /// If the max definition level is 0, `def_levels` will be ignored and the number of records,
    /// non-null values and levels decoded will all be equal, otherwise `def_levels` will be
    /// populated with the number of levels read, with an error returned if it is `None`.
    ///
    /// If the max repetition level is 0, `rep_levels` will be ignored and the number of records
    /// and levels decoded will both be equal, otherwise `rep_levels` will be populated with
    /// the number of levels read, with an error returned if it is `None`.
    pub fn read_records(
        &mut self,
        max_records: usize,
        mut def_levels: Option<&mut Vec<i16>>,
        mut rep_levels: Option<&mut Vec<i16>>,
        values: &mut Vec<T::T>,
    ) -> Result<(usize, usize, usize)> {
        let mut total_records_read = 0;
        let mut total_levels_read = 0;
        let mut total_values_read = 0;

        while total_records_read < max_records && self.has_next()? {
            let remaining_records = max_records - total_records_read;
            let remaining_levels = self.num_buffered_values - self.num_decoded_values;

            let (records_read, levels_to_read) = match self.rep_level_decoder.as_mut() {
                Some(decoder) => {
                    let out = rep_levels
                        .as_mut()
                        .ok_or_else(|| general_err!("must specify repetition levels"))?;

                    let (mut records_read, levels_read) =
                        decoder.read_rep_levels(out, remaining_records, remaining_levels)?;

                    if records_read == 0 && levels_read == 0 {
                        return Err(ParquetError::TruncatedPage(format!(
                            "repetition level data ended with {remaining_levels} levels still expected in the page"
                        )));
                    }

                    // A page end is always a record boundary, so a record left
                    // open by the last level of the page is complete
                    if levels_read == remaining_levels {
                        records_read += decoder.flush_partial() as usize;
                    }

                    (records_read, levels_read)
                }
                None => {
                    let levels = remaining_records.min(remaining_levels);
                    (levels, levels)
                }
            };

            let values_to_read = match self.def_level_decoder.as_mut() {
                Some(decoder) => {
                    let out = def_levels
                        .as_mut()
                        .ok_or_else(|| general_err!("must specify definition levels"))?;

                    let (values_read, levels_read) = decoder.read_def_levels(out, levels_to_read)?;
                    if levels_read != levels_to_read {
                        return Err(ParquetError::TruncatedPage(format!(
                            "expected {levels_to_read} definition levels, read {levels_read}"
                        )));
                    }

                    values_read
                }
                None => levels_to_read,
            };

            let values_read = self.read_values(values, values_to_read)?;
            if values_read != values_to_read {
                return Err(ParquetError::TruncatedPage(format!(
                    "expected {values_to_read} values, read {values_read}"
                )));
            }

            self.num_decoded_values += levels_to_read;
            total_records_read += records_read;
            total_levels_read += levels_to_read;
            total_values_read += values_read;
        }

        Ok((total_records_read, total_values_read, total_levels_read))
    }

    /// Reads the next `num_values` non-null values into `out`, returning how
    /// many were decoded.
    fn read_values(&mut self, out: &mut Vec<T::T>, num_values: usize) -> Result<usize> {
        let start = out.len();
        out.resize(start + num_values, T::T::default());
        let values_read = self.current_decoder()?.get(&mut out[start..])?;
        out.truncate(start + values_read);
        Ok(values_read)
    }

    fn current_decoder(&mut self) -> Result<&mut ValueDecoder<T>> {
        let decoder = match self.current_is_dict {
            true => &mut self.dict_decoder,
            false => &mut self.direct_decoder,
        };
        decoder
            .as_mut()
            .ok_or_else(|| general_err!("no values decoder set for the current page"))
    }

    /// Reads a new page and set up the decoders for levels, values or dictionary.
    /// Returns false if there's no page left.
    fn read_new_page(&mut self) -> Result<bool> {
        loop {
            match self.page_reader.get_next_page()? {
                // No more page to read
                None => return Ok(false),
                Some(current_page) => {
                    match current_page {
                        // 1. Dictionary page: configure dictionary for this page.
                        Page::DictionaryPage {
                            buf,
                            num_values,
                            encoding,
                            is_sorted,
                        } => {
                            self.set_dictionary_page(buf, num_values, encoding, is_sorted)?;
                            continue;
                        }
                        // 2. Data page v1
                        Page::DataPage {
                            buf,
                            num_values,
                            encoding,
                            def_level_encoding,
                            rep_level_encoding,
                        } => {
                            self.num_buffered_values = num_values as usize;
                            self.num_decoded_values = 0;

                            let mut offset = 0;

                            // If the max repetition level is 0, there are no
                            // repetition levels stored in the page
                            if self.descr.max_rep_level() > 0 {
                                let (bytes_read, level_data) = parse_v1_level(
                                    self.descr.max_rep_level(),
                                    num_values,
                                    rep_level_encoding,
                                    buf.slice(offset..),
                                )?;
                                offset += bytes_read;

                                self.rep_level_decoder
                                    .as_mut()
                                    .unwrap()
                                    .set_data(rep_level_encoding, level_data)?;
                            }

                            // Same for definition levels
                            if self.descr.max_def_level() > 0 {
                                let (bytes_read, level_data) = parse_v1_level(
                                    self.descr.max_def_level(),
                                    num_values,
                                    def_level_encoding,
                                    buf.slice(offset..),
                                )?;
                                offset += bytes_read;

                                self.def_level_decoder
                                    .as_mut()
                                    .unwrap()
                                    .set_data(def_level_encoding, level_data)?;
                            }

                            // The exact number of non-null values is not known
                            // until the definition levels are decoded
                            self.set_page_data(
                                encoding,
                                buf.slice(offset..),
                                num_values as usize,
                                None,
                            )?;
                            return Ok(true);
                        }
                        // 3. Data page v2
                        Page::DataPageV2 {
                            buf,
                            num_values,
                            encoding,
                            num_nulls,
                            num_rows: _,
                            def_levels_byte_len,
                            rep_levels_byte_len,
                            is_compressed: _,
                        } => {
                            if num_nulls > num_values {
                                return Err(general_err!(
                                    "more nulls than values in page, contained {} values and {} nulls",
                                    num_values,
                                    num_nulls
                                ));
                            }

                            self.num_buffered_values = num_values as usize;
                            self.num_decoded_values = 0;

                            // Data page v2 only supports RLE encoding for its levels
                            let rep_levels_len = rep_levels_byte_len as usize;
                            let def_levels_len = def_levels_byte_len as usize;
                            let total_levels_len = rep_levels_len + def_levels_len;
                            if total_levels_len > buf.len() {
                                return Err(ParquetError::TruncatedPage(format!(
                                    "level sections of {total_levels_len} bytes exceed the page size of {} bytes",
                                    buf.len()
                                )));
                            }

                            if self.descr.max_rep_level() > 0 {
                                self.rep_level_decoder
                                    .as_mut()
                                    .unwrap()
                                    .set_data(Encoding::RLE, buf.slice(..rep_levels_len))?;
                            }

                            if self.descr.max_def_level() > 0 {
                                self.def_level_decoder
                                    .as_mut()
                                    .unwrap()
                                    .set_data(
                                        Encoding::RLE,
                                        buf.slice(rep_levels_len..total_levels_len),
                                    )?;
                            }

                            self.set_page_data(
                                encoding,
                                buf.slice(total_levels_len..),
                                num_values as usize,
                                Some((num_values - num_nulls) as usize),
                            )?;
                            return Ok(true);
                        }
                    }
                }
            }
        }
    }

    /// Reads the dictionary page and sets up a decoder that data pages can
    /// look values up in.
    fn set_dictionary_page(
        &mut self,
        buf: Bytes,
        num_values: u32,
        mut encoding: Encoding,
        _is_sorted: bool,
    ) -> Result<()> {
        // PLAIN_DICTIONARY is deprecated in favor of RLE_DICTIONARY, a
        // dictionary page itself is always plain encoded
        if encoding == Encoding::PLAIN || encoding == Encoding::PLAIN_DICTIONARY {
            encoding = Encoding::RLE_DICTIONARY;
        }

        if self.dict_decoder.is_some() {
            return Err(general_err!("Column cannot have more than one dictionary"));
        }

        if encoding == Encoding::RLE_DICTIONARY {
            let mut plain_decoder = PlainDecoder::<T>::new(self.descr.type_length());
            plain_decoder.set_data(buf, num_values as usize)?;

            let mut dict_decoder = DictDecoder::new();
            dict_decoder.set_dict(plain_decoder)?;
            self.dict_decoder = Some(ValueDecoder::Dictionary(dict_decoder));
            Ok(())
        } else {
            Err(ParquetError::UnsupportedEncoding(format!(
                "{encoding} for a dictionary page"
            )))
        }
    }

    /// Resolves the decoder for a data page and hands it the page buffer.
    ///
    /// For data page v1 the number of non-null values is not known up front,
    /// `num_values` is `None` and the decoder is capped at `num_levels`.
    fn set_page_data(
        &mut self,
        mut encoding: Encoding,
        data: Bytes,
        num_levels: usize,
        num_values: Option<usize>,
    ) -> Result<()> {
        if encoding == Encoding::PLAIN_DICTIONARY {
            encoding = Encoding::RLE_DICTIONARY;
        }

        let decoder = if encoding == Encoding::RLE_DICTIONARY {
            self.dict_decoder
                .as_mut()
                .ok_or_else(|| general_err!("dictionary encoded page without dictionary page"))?
        } else {
            match &mut self.direct_decoder {
                Some(decoder) if decoder.encoding() == encoding => decoder,
                other => other.insert(ValueDecoder::try_new(&self.descr, encoding)?),
            }
        };

        decoder.set_data(data, num_values.unwrap_or(num_levels))?;
        self.current_is_dict = encoding == Encoding::RLE_DICTIONARY;
        Ok(())
    }

    /// Returns true if there are values left to read, advancing to the next
    /// page when the current one is exhausted.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.num_buffered_values == 0 || self.num_buffered_values == self.num_decoded_values {
            // Load the next page, a page with no values is skipped over
            if !self.read_new_page()? {
                Ok(false)
            } else {
                Ok(self.num_buffered_values != 0)
            }
        } else {
            Ok(true)
        }
    }
}

/// Splits the level section off the front of a data page v1 buffer, returning
/// the number of bytes consumed and the level data.
fn parse_v1_level(
    max_level: i16,
    num_buffered_values: u32,
    encoding: Encoding,
    buf: Bytes,
) -> Result<(usize, Bytes)> {
    match encoding {
        Encoding::RLE => {
            let i32_size = std::mem::size_of::<i32>();
            if buf.len() < i32_size {
                return Err(ParquetError::TruncatedPage(format!(
                    "not enough data to read the RLE level length, page has {} bytes left",
                    buf.len()
                )));
            }
            let data_size = read_num_bytes::<i32>(i32_size, buf.as_ref());
            let end = usize::try_from(data_size)
                .ok()
                .and_then(|size| size.checked_add(i32_size))
                .filter(|end| *end <= buf.len())
                .ok_or_else(|| {
                    ParquetError::TruncatedPage(format!(
                        "level data of {data_size} bytes does not fit in a page with {} bytes left",
                        buf.len()
                    ))
                })?;
            Ok((end, buf.slice(i32_size..end)))
        }
        Encoding::BIT_PACKED => {
            let bit_width = num_required_bits(max_level as u64);
            let num_bytes = ceil(num_buffered_values as usize * bit_width as usize, 8);
            if num_bytes > buf.len() {
                return Err(ParquetError::TruncatedPage(format!(
                    "{num_bytes} bytes of packed levels do not fit in a page with {} bytes left",
                    buf.len()
                )));
            }
            Ok((num_bytes, buf.slice(..num_bytes)))
        }
        _ => Err(ParquetError::UnsupportedEncoding(format!(
            "{encoding} for levels"
        ))),
    }
}
