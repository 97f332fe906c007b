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

use crate::basic::Encoding;
use crate::encodings::rle::RleDecoder;
use crate::errors::{ParquetError, Result};
use crate::util::bit_util::num_required_bits;

/// The size of the buffer [`RepetitionLevelDecoder`] decodes levels into when
/// scanning for record boundaries
const LEVEL_BUFFER_SIZE: usize = 1024;

/// Decoder for the deprecated `BIT_PACKED` level encoding
///
/// Values are packed back to back starting at the most significant bit of
/// each byte, the opposite bit order of the RLE/bit-packed hybrid runs
struct PackedLevelDecoder {
    data: Bytes,
    bit_width: u8,
    bit_offset: usize,
}

impl PackedLevelDecoder {
    fn new(data: Bytes, bit_width: u8) -> Self {
        Self {
            data,
            bit_width,
            bit_offset: 0,
        }
    }

    fn read(&mut self, out: &mut [i16]) -> usize {
        let width = self.bit_width as usize;
        let total_bits = self.data.len() * 8;
        let mut read = 0;
        for slot in out.iter_mut() {
            if self.bit_offset + width > total_bits {
                break;
            }
            let mut value: u16 = 0;
            for _ in 0..width {
                let byte = self.data[self.bit_offset / 8];
                let bit = 7 - self.bit_offset % 8;
                value = (value << 1) | u16::from((byte >> bit) & 1);
                self.bit_offset += 1;
            }
            *slot = value as i16;
            read += 1;
        }
        read
    }
}

enum LevelDecoderInner {
    Packed(PackedLevelDecoder),
    Rle(RleDecoder),
}

impl LevelDecoderInner {
    fn new(encoding: Encoding, data: Bytes, bit_width: u8) -> Result<Self> {
        match encoding {
            Encoding::RLE => {
                let mut decoder = RleDecoder::new(bit_width);
                decoder.set_data(data);
                Ok(Self::Rle(decoder))
            }
            Encoding::BIT_PACKED => Ok(Self::Packed(PackedLevelDecoder::new(data, bit_width))),
            _ => Err(ParquetError::UnsupportedEncoding(format!(
                "{encoding} for levels"
            ))),
        }
    }

    fn read(&mut self, out: &mut [i16]) -> Result<usize> {
        match self {
            Self::Packed(decoder) => Ok(decoder.read(out)),
            Self::Rle(decoder) => decoder.get_batch(out),
        }
    }
}

/// Decoder for definition levels
pub struct DefinitionLevelDecoder {
    bit_width: u8,
    max_level: i16,
    decoder: Option<LevelDecoderInner>,
}

impl DefinitionLevelDecoder {
    pub fn new(max_level: i16) -> Self {
        Self {
            bit_width: num_required_bits(max_level as u64),
            max_level,
            decoder: None,
        }
    }

    /// Set the level data for the current page
    pub fn set_data(&mut self, encoding: Encoding, data: Bytes) -> Result<()> {
        self.decoder = Some(LevelDecoderInner::new(encoding, data, self.bit_width)?);
        Ok(())
    }

    /// Read up to `num_levels` definition levels, appending them to `out`
    ///
    /// Returns the number of non-null values and the number of levels read
    pub fn read_def_levels(
        &mut self,
        out: &mut Vec<i16>,
        num_levels: usize,
    ) -> Result<(usize, usize)> {
        let decoder = self
            .decoder
            .as_mut()
            .ok_or_else(|| general_err!("definition level data not set"))?;

        let start = out.len();
        out.resize(start + num_levels, 0);
        let levels_read = decoder.read(&mut out[start..])?;
        out.truncate(start + levels_read);

        let mut values_read = 0;
        for &level in &out[start..] {
            if level > self.max_level {
                return Err(general_err!(
                    "definition level {} exceeds the maximum {} for the column",
                    level,
                    self.max_level
                ));
            }
            if level == self.max_level {
                values_read += 1;
            }
        }
        Ok((values_read, levels_read))
    }
}

/// Decoder for repetition levels that tracks record boundaries
///
/// A record starts wherever a level of 0 occurs, so the number of records in
/// a batch of levels is only known once the level opening the *next* record
/// has been seen. A record cut off by the end of its page is not counted
/// until [`Self::flush_partial`] is called.
pub struct RepetitionLevelDecoder {
    bit_width: u8,
    max_level: i16,
    decoder: Option<LevelDecoderInner>,
    buffer: Vec<i16>,
    buffer_offset: usize,
    partial: bool,
}

impl RepetitionLevelDecoder {
    pub fn new(max_level: i16) -> Self {
        Self {
            bit_width: num_required_bits(max_level as u64),
            max_level,
            decoder: None,
            buffer: Vec::new(),
            buffer_offset: 0,
            partial: false,
        }
    }

    /// Set the level data for the current page
    pub fn set_data(&mut self, encoding: Encoding, data: Bytes) -> Result<()> {
        self.decoder = Some(LevelDecoderInner::new(encoding, data, self.bit_width)?);
        self.buffer.clear();
        self.buffer_offset = 0;
        Ok(())
    }

    /// Read up to `num_levels` repetition levels spanning at most
    /// `max_records` complete records, appending them to `out`
    ///
    /// The level opening a record past `max_records` is left unconsumed so
    /// that the next call starts on a record boundary.
    ///
    /// Returns the number of complete records and the number of levels read
    pub fn read_rep_levels(
        &mut self,
        out: &mut Vec<i16>,
        max_records: usize,
        num_levels: usize,
    ) -> Result<(usize, usize)> {
        let mut records_read = 0;
        let mut levels_read = 0;

        'outer: while levels_read < num_levels {
            if self.buffer_offset == self.buffer.len() {
                self.fill_buffer(num_levels - levels_read)?;
                if self.buffer.is_empty() {
                    break;
                }
            }

            while self.buffer_offset < self.buffer.len() && levels_read < num_levels {
                let level = self.buffer[self.buffer_offset];
                if level == 0 {
                    if self.partial {
                        records_read += 1;
                        self.partial = false;
                    }
                    if records_read == max_records {
                        break 'outer;
                    }
                    self.partial = true;
                }
                out.push(level);
                self.buffer_offset += 1;
                levels_read += 1;
            }
        }

        Ok((records_read, levels_read))
    }

    /// Count the record cut off by the end of the page, if any
    ///
    /// Returns true if a partially read record was pending
    pub fn flush_partial(&mut self) -> bool {
        std::mem::take(&mut self.partial)
    }

    fn fill_buffer(&mut self, to_read: usize) -> Result<()> {
        let decoder = self
            .decoder
            .as_mut()
            .ok_or_else(|| general_err!("repetition level data not set"))?;

        self.buffer.clear();
        self.buffer.resize(to_read.min(LEVEL_BUFFER_SIZE), 0);
        self.buffer_offset = 0;
        let read = decoder.read(&mut self.buffer)?;
        self.buffer.truncate(read);

        for &level in &self.buffer {
            if level > self.max_level {
                return Err(general_err!(
                    "repetition level {} exceeds the maximum {} for the column",
                    level,
                    self.max_level
                ));
            }
        }
        Ok(())
    }
}
