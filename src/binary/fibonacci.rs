//! Fibonacci (Zeckendorf) coded integer streams.
//!
//! A codeword sets one bit per Fibonacci term used, lowest term first, and is
//! terminated by an extra 1 directly after the last set bit. The decoded
//! value is the term sum minus one, so zero is representable. Bits are read
//! most significant first within each byte.

use crate::util::{BoundsError, Error, FormatError, Result};

use super::format::{FIBONACCI_LOOKUP, FIBONACCI_MAX_LENGTH};

/// Sequential decoder over one block's index stream.
#[derive(Clone, Debug)]
pub struct FibonacciDecoder<'a> {
    data: &'a [u8],
    base: u64,
    number_of_values: usize,
    values_read: usize,
    bit_id: usize,
    current_value: u64,
    next_fib_index: usize,
    previous_bit: bool,
}

impl<'a> FibonacciDecoder<'a> {
    /// Decoder over `data` (located at file offset `base`) holding `number_of_values` codewords.
    pub fn new(data: &'a [u8], number_of_values: usize, base: u64) -> Self {
        Self {
            data,
            base,
            number_of_values,
            values_read: 0,
            bit_id: 0,
            current_value: 0,
            next_fib_index: 0,
            previous_bit: false,
        }
    }

    /// Restart from the first codeword.
    pub fn rewind(&mut self) {
        self.values_read = 0;
        self.bit_id = 0;
        self.current_value = 0;
        self.next_fib_index = 0;
        self.previous_bit = false;
    }

    #[inline]
    pub fn values_read(&self) -> usize {
        self.values_read
    }

    #[inline]
    pub fn number_of_values(&self) -> usize {
        self.number_of_values
    }

    /// Absolute file offset of the byte holding the next bit.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.base + (self.bit_id / 8) as u64
    }

    /// Decode the next value.
    pub fn next_value(&mut self) -> Result<u64> {
        if self.values_read >= self.number_of_values {
            return Err(Error::bounds(
                self.offset(),
                BoundsError::StreamExhausted { declared: self.number_of_values },
            ));
        }

        loop {
            let bit = self.read_bit()?;
            if bit {
                if self.previous_bit && self.next_fib_index != 0 {
                    let value = self.current_value - 1;
                    self.previous_bit = true;
                    self.current_value = 0;
                    self.next_fib_index = 0;
                    self.bit_id += 1;
                    self.values_read += 1;
                    return Ok(value);
                }
                let term = FIBONACCI_LOOKUP
                    .get(self.next_fib_index)
                    .copied()
                    .ok_or_else(|| self.too_long())?;
                self.current_value += term;
            } else if self.next_fib_index > FIBONACCI_MAX_LENGTH {
                return Err(self.too_long());
            }
            self.previous_bit = bit;
            self.next_fib_index += 1;
            self.bit_id += 1;
        }
    }

    #[inline]
    fn read_bit(&self) -> Result<bool> {
        match self.data.get(self.bit_id / 8) {
            Some(byte) => Ok(byte & (0x80 >> (self.bit_id % 8)) != 0),
            None => Err(Error::bounds(
                self.offset(),
                BoundsError::UnterminatedStream { values_read: self.values_read },
            )),
        }
    }

    fn too_long(&self) -> Error {
        Error::format(self.offset(), FormatError::CodewordTooLong { max_bits: FIBONACCI_MAX_LENGTH + 1 })
    }
}

/// Bit writer producing the codewords [`FibonacciDecoder`] reads.
#[derive(Clone, Debug, Default)]
pub struct FibonacciEncoder {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl FibonacciEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the codeword for `value`.
    ///
    /// # Panics
    /// If `value + 1` needs more than the supported number of Fibonacci terms.
    pub fn push(&mut self, value: u64) {
        let mut remainder = value + 1;
        let mut top = FIBONACCI_MAX_LENGTH;
        while FIBONACCI_LOOKUP[top] > remainder {
            top -= 1;
        }
        assert!(
            top < FIBONACCI_MAX_LENGTH
                || remainder < FIBONACCI_LOOKUP[FIBONACCI_MAX_LENGTH] + FIBONACCI_LOOKUP[FIBONACCI_MAX_LENGTH - 1],
            "value {value} exceeds the Fibonacci code range"
        );

        let mut bits = [false; FIBONACCI_MAX_LENGTH + 1];
        let mut index = top as isize;
        while remainder > 0 && index >= 0 {
            let term = FIBONACCI_LOOKUP[index as usize];
            if term <= remainder {
                bits[index as usize] = true;
                remainder -= term;
                // Zeckendorf: never two adjacent terms.
                index -= 2;
            } else {
                index -= 1;
            }
        }
        for &bit in &bits[..=top] {
            self.push_bit(bit);
        }
        self.push_bit(true);
    }

    pub fn extend(&mut self, values: impl IntoIterator<Item = u64>) {
        for value in values {
            self.push(value);
        }
    }

    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Finish the stream, zero-padding the final byte.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    fn push_bit(&mut self, bit: bool) {
        if self.bit_len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> (self.bit_len % 8);
            }
        }
        self.bit_len += 1;
    }
}

/// Encode `values` into a packed stream.
pub fn encode_fibonacci(values: &[u64]) -> Vec<u8> {
    let mut encoder = FibonacciEncoder::new();
    encoder.extend(values.iter().copied());
    encoder.finish()
}
