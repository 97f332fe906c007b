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

use std::cmp;
use std::mem::size_of;

use bytes::Bytes;

use crate::errors::Result;

/// Maximum byte length of a VLQ encoded u64
const MAX_VLQ_BYTE_LEN: usize = 10;

/// Types that can be deserialized from a fixed number of little-endian bytes.
pub trait FromBytes: Sized {
    type Buffer: AsMut<[u8]> + Default;
    fn try_from_le_slice(b: &[u8]) -> Result<Self>;
    fn from_le_bytes(bs: Self::Buffer) -> Self;
}

macro_rules! from_le_bytes {
    ($($ty: ty),*) => {
        $(
        impl FromBytes for $ty {
            type Buffer = [u8; size_of::<Self>()];
            fn try_from_le_slice(b: &[u8]) -> Result<Self> {
                // Accepts a longer slice, only the leading bytes are read.
                let buffer: Self::Buffer = b
                    .get(..size_of::<Self>())
                    .and_then(|s| s.try_into().ok())
                    .ok_or_else(|| {
                        general_err!(
                            "error converting value, expected {} bytes got {}",
                            size_of::<Self>(),
                            b.len()
                        )
                    })?;
                Ok(Self::from_le_bytes(buffer))
            }
            fn from_le_bytes(bs: Self::Buffer) -> Self {
                <$ty>::from_le_bytes(bs)
            }
        }
        )*
    };
}

from_le_bytes! { u8, u16, u32, u64, i8, i16, i32, i64, f32, f64 }

impl FromBytes for bool {
    type Buffer = [u8; 1];

    fn try_from_le_slice(b: &[u8]) -> Result<Self> {
        let buffer: Self::Buffer = b
            .get(..1)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| general_err!("error converting value, expected 1 byte got {}", b.len()))?;
        Ok(Self::from_le_bytes(buffer))
    }

    fn from_le_bytes(bs: Self::Buffer) -> Self {
        bs[0] != 0
    }
}

/// Reads `size` of bytes from `src`, and reinterprets them as type `ty`, in
/// little-endian order.
pub fn read_num_bytes<T: FromBytes>(size: usize, src: &[u8]) -> T {
    assert!(size <= src.len());
    assert!(size <= size_of::<T>());
    let mut buffer = <T as FromBytes>::Buffer::default();
    buffer.as_mut()[..size].copy_from_slice(&src[..size]);
    <T>::from_le_bytes(buffer)
}

/// Returns the ceil of value/divisor.
#[inline]
pub fn ceil<T: num::Integer>(value: T, divisor: T) -> T {
    num::Integer::div_ceil(&value, &divisor)
}

/// Returns the number of bits needed to represent the value `x`.
#[inline]
pub fn num_required_bits(x: u64) -> u8 {
    64 - x.leading_zeros() as u8
}

/// Returns the `num_bits` least-significant bits of `v`.
#[inline]
fn trailing_bits(v: u64, num_bits: usize) -> u64 {
    if num_bits >= 64 {
        v
    } else {
        v & ((1 << num_bits) - 1)
    }
}

/// Utility to read bit/byte streams. This class can read data in the following
/// abstractions:
///
/// 1. bit packed values. Reading `num_bits` at a time, starting from the least
///    significant bit of each byte.
/// 2. aligned byte values, advancing to the next byte boundary first.
/// 3. VLQ and zigzag-VLQ encoded values, which must start at a byte boundary.
pub struct BitReader {
    /// The byte buffer to read from, passed in by client
    buffer: Bytes,

    /// Bytes are memcpy'd from `buffer` and values are read from this variable.
    /// This is faster than reading values byte by byte directly from `buffer`
    buffered_values: u64,

    /// Current byte offset in `buffer`
    byte_offset: usize,

    /// Current bit offset in `buffered_values`
    bit_offset: usize,
}

impl BitReader {
    pub fn new(buffer: Bytes) -> Self {
        let mut reader = BitReader {
            buffer,
            buffered_values: 0,
            byte_offset: 0,
            bit_offset: 0,
        };
        reader.reload_buffered_values();
        reader
    }

    pub fn reset(&mut self, buffer: Bytes) {
        self.buffer = buffer;
        self.buffered_values = 0;
        self.byte_offset = 0;
        self.bit_offset = 0;
        self.reload_buffered_values();
    }

    /// Gets the current byte offset, rounded up to the next byte.
    pub fn get_byte_offset(&self) -> usize {
        self.byte_offset + ceil(self.bit_offset, 8)
    }

    /// Reads a value of type `T` and of size `num_bits`.
    ///
    /// Returns `None` if there's not enough data available. `Some` otherwise.
    pub fn get_value<T: FromBytes>(&mut self, num_bits: usize) -> Option<T> {
        assert!(num_bits <= 64);
        assert!(num_bits <= size_of::<T>() * 8);

        if self.byte_offset * 8 + self.bit_offset + num_bits > self.buffer.len() * 8 {
            return None;
        }

        let mut v =
            trailing_bits(self.buffered_values, self.bit_offset + num_bits) >> self.bit_offset;
        self.bit_offset += num_bits;

        if self.bit_offset >= 64 {
            self.byte_offset += 8;
            self.bit_offset -= 64;

            self.reload_buffered_values();
            v |= trailing_bits(self.buffered_values, self.bit_offset)
                .wrapping_shl((num_bits - self.bit_offset) as u32);
        }

        let bytes = v.to_le_bytes();
        T::try_from_le_slice(&bytes[..size_of::<T>()]).ok()
    }

    /// Reads a batch of `T` values, each of size `num_bits`, into `batch`.
    ///
    /// Returns the number of values that were read.
    pub fn get_batch<T: FromBytes>(&mut self, batch: &mut [T], num_bits: usize) -> usize {
        assert!(num_bits <= size_of::<T>() * 8);

        for (i, v) in batch.iter_mut().enumerate() {
            match self.get_value(num_bits) {
                Some(value) => *v = value,
                None => return i,
            }
        }
        batch.len()
    }

    /// Reads up to `num_bytes` bytes into `buf`, starting from the next byte
    /// boundary.
    ///
    /// Returns the number of bytes that were read.
    pub fn get_aligned_bytes(&mut self, buf: &mut Vec<u8>, num_bytes: usize) -> usize {
        // Align to byte boundary
        self.byte_offset += ceil(self.bit_offset, 8);
        self.bit_offset = 0;

        let bytes_read = cmp::min(self.buffer.len() - self.byte_offset, num_bytes);
        buf.extend_from_slice(
            &self.buffer.as_ref()[self.byte_offset..self.byte_offset + bytes_read],
        );
        self.byte_offset += bytes_read;

        self.reload_buffered_values();
        bytes_read
    }

    /// Reads a `num_bytes`-sized value from this buffer and returns it.
    /// `T` needs to be a little-endian native type. The value is assumed to be
    /// byte aligned so the bit reader will be advanced to the start of the next
    /// byte before reading the value.
    ///
    /// Returns `Some` if there's enough bytes left to form a value of `T`.
    /// Otherwise `None`.
    pub fn get_aligned<T: FromBytes>(&mut self, num_bytes: usize) -> Option<T> {
        assert!(num_bytes <= size_of::<T>());

        let bytes_read = ceil(self.bit_offset, 8);
        if self.byte_offset + bytes_read + num_bytes > self.buffer.len() {
            return None;
        }

        // Advance byte_offset to the next unread byte and read num_bytes
        self.byte_offset += bytes_read;
        let v = read_num_bytes::<T>(num_bytes, &self.buffer.as_ref()[self.byte_offset..]);
        self.byte_offset += num_bytes;

        self.bit_offset = 0;
        self.reload_buffered_values();
        Some(v)
    }

    /// Reads a VLQ encoded (in little endian order) int from the stream.
    /// The encoded int must start at the beginning of a byte.
    ///
    /// Returns `None` if there's not enough bytes in the stream.
    pub fn get_vlq_int(&mut self) -> Option<i64> {
        let mut shift = 0;
        let mut v: i64 = 0;
        while let Some(byte) = self.get_aligned::<u8>(1) {
            // More than 10 groups would overflow an u64
            if shift >= MAX_VLQ_BYTE_LEN * 7 {
                return None;
            }
            v |= ((byte & 0x7F) as i64) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                return Some(v);
            }
        }
        None
    }

    /// Reads a zigzag-VLQ encoded (in little endian order) int from the stream.
    ///
    /// Zigzag-VLQ is identical to VLQ, except that signed ints are encoded as
    /// follows: 0 => 0, -1 => 1, 1 => 2, -2 => 3, ...
    ///
    /// Note: the encoded int must start at the beginning of a byte.
    pub fn get_zigzag_vlq_int(&mut self) -> Option<i64> {
        self.get_vlq_int().map(|v| {
            let u = v as u64;
            (u >> 1) as i64 ^ -((u & 1) as i64)
        })
    }

    fn reload_buffered_values(&mut self) {
        let bytes_to_read = cmp::min(self.buffer.len() - self.byte_offset, 8);
        self.buffered_values =
            read_num_bytes::<u64>(bytes_to_read, &self.buffer.as_ref()[self.byte_offset..]);
    }
}

impl From<Vec<u8>> for BitReader {
    fn from(vec: Vec<u8>) -> Self {
        BitReader::new(Bytes::from(vec))
    }
}

/// Utility to write bit/byte streams. This class can write data in the
/// following abstractions: bit packed values, aligned byte values and
/// VLQ/zigzag-VLQ encoded values, mirroring what [`BitReader`] can read.
#[cfg(any(test, feature = "test_common"))]
pub struct BitWriter {
    buffer: Vec<u8>,

    /// Bit-packed bits are buffered here before being flushed out as whole bytes
    buffered_values: u64,

    /// Current bit offset in `buffered_values`
    bit_offset: usize,
}

#[cfg(any(test, feature = "test_common"))]
impl BitWriter {
    pub fn new(init_capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(init_capacity),
            buffered_values: 0,
            bit_offset: 0,
        }
    }

    /// Initializes the writer appending to the existing buffer `buffer`
    pub fn new_from_buf(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            buffered_values: 0,
            bit_offset: 0,
        }
    }

    /// Writes the `num_bits` LSB of `value`. The value must fit in `num_bits`.
    #[inline]
    pub fn put_value(&mut self, value: u64, num_bits: usize) {
        debug_assert!(num_bits <= 64);
        debug_assert!(num_bits == 64 || value < (1 << num_bits));

        self.buffered_values |= value.wrapping_shl(self.bit_offset as u32);
        self.bit_offset += num_bits;

        if self.bit_offset >= 64 {
            self.buffer
                .extend_from_slice(&self.buffered_values.to_le_bytes());
            self.bit_offset -= 64;
            self.buffered_values = if self.bit_offset == 0 {
                0
            } else {
                value >> (num_bits - self.bit_offset)
            };
        }
        debug_assert!(self.bit_offset < 64);
    }

    /// Writes `num_bytes` of the little-endian bytes of `val`, flushing any
    /// buffered bits to the next byte boundary first.
    #[inline]
    pub fn put_aligned(&mut self, val: u64, num_bytes: usize) {
        self.flush();
        self.buffer.extend_from_slice(&val.to_le_bytes()[..num_bytes]);
    }

    /// Writes `num_bytes` of the little-endian bytes of `val` at the byte
    /// `offset`, which must have been reserved earlier with `skip`.
    pub fn put_aligned_offset(&mut self, val: u64, num_bytes: usize, offset: usize) {
        assert!(offset + num_bytes <= self.buffer.len());
        self.buffer[offset..offset + num_bytes].copy_from_slice(&val.to_le_bytes()[..num_bytes]);
    }

    /// Writes a VLQ encoded integer `v` to this buffer. The value starts at the
    /// beginning of the next byte.
    #[inline]
    pub fn put_vlq_int(&mut self, mut v: u64) {
        while v & 0xFFFFFFFFFFFFFF80 != 0 {
            self.put_aligned((v & 0x7F) | 0x80, 1);
            v >>= 7;
        }
        self.put_aligned(v & 0x7F, 1);
    }

    /// Writes a zigzag-VLQ encoded (in little endian order) int `v` to this
    /// buffer.
    #[inline]
    pub fn put_zigzag_vlq_int(&mut self, v: i64) {
        let u: u64 = ((v << 1) ^ (v >> 63)) as u64;
        self.put_vlq_int(u);
    }

    /// Advances the current offset by skipping `num_bytes`, flushing the
    /// internal bit buffer first. This is useful when you want to jump over
    /// `num_bytes` bytes and come back later to fill these bytes.
    ///
    /// Returns the byte offset at which the skipped region starts.
    pub fn skip(&mut self, num_bytes: usize) -> usize {
        self.flush();
        let result = self.buffer.len();
        self.buffer.extend(std::iter::repeat(0).take(num_bytes));
        result
    }

    /// Flushes the buffered bits, padding the last byte with zeroes.
    pub fn flush(&mut self) {
        let num_bytes = ceil(self.bit_offset, 8);
        self.buffer
            .extend_from_slice(&self.buffered_values.to_le_bytes()[..num_bytes]);
        self.buffered_values = 0;
        self.bit_offset = 0;
    }

    /// Flushes the buffered bits and returns the written bytes.
    pub fn flush_buffer(&mut self) -> &[u8] {
        self.flush();
        self.buffer()
    }

    /// Consumes the writer and returns the written bytes, flushing the buffered
    /// bits first.
    pub fn consume(mut self) -> Vec<u8> {
        self.flush();
        self.buffer
    }

    /// Clears the internal state so the buffer can be reused.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.buffered_values = 0;
        self.bit_offset = 0;
    }

    pub fn bytes_written(&self) -> usize {
        self.buffer.len() + ceil(self.bit_offset, 8)
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}
