// SPDX-License-Identifier: Apache-2.0
// Copyright © 2026 Olfactometer developers

/// The size of a calibration value in terms of 8-bit bytes.
pub(crate) const WORD_SIZE: usize = (u16::BITS / u8::BITS) as usize;

/// A very small reimplementation of [bytes::Buf] for reading big-endian data back out of an
/// image.
///
/// Every method panics if there aren't enough bytes left, callers check lengths first.
///
/// [bytes::Buf]: https://docs.rs/bytes/*/bytes/trait.Buf.html
pub(crate) trait Buffer {
    fn get_u8(&mut self) -> u8;
    fn get_u16(&mut self) -> u16;
}

impl Buffer for &[u8] {
    fn get_u8(&mut self) -> u8 {
        let (byte, rest) = self.split_at(1);
        *self = rest;
        byte[0]
    }

    fn get_u16(&mut self) -> u16 {
        let (bytes, rest) = self.split_at(WORD_SIZE);
        *self = rest;
        u16::from_be_bytes([bytes[0], bytes[1]])
    }
}

/// Write `words` into `dest` as big-endian bytes.
///
/// The device stores the high byte first, so this is where the byte swap happens.
pub(crate) fn put_be_words(words: &[u16], dest: &mut [u8]) {
    dest.chunks_exact_mut(WORD_SIZE)
        .zip(words.iter())
        .for_each(|(chunk, word)| chunk.copy_from_slice(&word.to_be_bytes()));
}

/// Parse a string of digits in the given radix, rejecting signs and whitespace.
pub(crate) fn parse_digits<T: num_traits::Num>(digits: &str, radix: u32) -> Option<T> {
    let all_digits = !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    if all_digits {
        T::from_str_radix(digits, radix).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::Buffer;

    #[test]
    fn buffer_get_u8() {
        let data = b"\xde\xad\xbe\xef";
        let mut buf = &data[..];
        assert_eq!(buf.get_u8(), 0xde);
        assert_eq!(buf, &data[1..]);
    }

    #[test]
    fn buffer_get_u16() {
        let data = b"\xde\xad\xbe\xef";
        let mut buf = &data[..];
        assert_eq!(buf.get_u16(), 0xdead);
        assert_eq!(buf.get_u16(), 0xbeef);
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn put_be_words() {
        let mut dest = [0u8; 6];
        super::put_be_words(&[0x0102, 0x012C, 0xFF00], &mut dest);
        assert_eq!(dest, [0x01, 0x02, 0x01, 0x2C, 0xFF, 0x00]);
    }

    #[test]
    fn parse_digits() {
        assert_eq!(super::parse_digits::<u8>("2C", 16), Some(0x2C));
        assert_eq!(super::parse_digits::<u8>("ff", 16), Some(0xFF));
        assert_eq!(super::parse_digits::<u16>("65535", 10), Some(u16::MAX));
        assert_eq!(super::parse_digits::<u16>("65536", 10), None);
        // from_str_radix would accept a leading '+'
        assert_eq!(super::parse_digits::<u8>("+F", 16), None);
        assert_eq!(super::parse_digits::<u8>("", 16), None);
        assert_eq!(super::parse_digits::<u8>("G0", 16), None);
    }
}
