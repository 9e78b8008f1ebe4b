use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::InputError;

/// Number of addressable key codes.
pub const MAX_KEYS: usize = 256;

const WORD_BITS: usize = u32::BITS as usize;
const KEY_WORDS: usize = MAX_KEYS / WORD_BITS;

/// Pressed/released state for key codes `0..MAX_KEYS`, one bit per code.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeySet {
    words: [u32; KEY_WORDS],
}

impl KeySet {
    pub const fn new() -> Self {
        Self {
            words: [0; KEY_WORDS],
        }
    }

    /// Word index and bit mask for a code, or `InvalidArgument` if out of range.
    fn slot(code: i32) -> Result<(usize, u32), InputError> {
        if code < 0 || code as usize >= MAX_KEYS {
            return Err(InputError::InvalidArgument {
                code,
                max: MAX_KEYS,
            });
        }
        let code = code as usize;
        Ok((code / WORD_BITS, 1u32 << (code % WORD_BITS)))
    }

    pub fn get(&self, code: i32) -> Result<bool, InputError> {
        let (word, mask) = Self::slot(code)?;
        Ok(self.words[word] & mask != 0)
    }

    pub fn set(&mut self, code: i32, pressed: bool) -> Result<(), InputError> {
        let (word, mask) = Self::slot(code)?;
        if pressed {
            self.words[word] |= mask;
        } else {
            self.words[word] &= !mask;
        }
        Ok(())
    }

    /// Codes currently held, in ascending order.
    pub fn pressed(&self) -> impl Iterator<Item = u8> + '_ {
        (0..MAX_KEYS)
            .filter(move |&code| self.words[code / WORD_BITS] & (1u32 << (code % WORD_BITS)) != 0)
            .map(|code| code as u8)
    }

    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}

impl fmt::Debug for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.pressed()).finish()
    }
}

impl Serialize for KeySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.pressed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_every_code() {
        let mut keys = KeySet::new();
        for code in 0..MAX_KEYS as i32 {
            keys.set(code, true).unwrap();
            assert!(keys.get(code).unwrap(), "code {code} should be pressed");
            keys.set(code, false).unwrap();
            assert!(!keys.get(code).unwrap(), "code {code} should be released");
        }
        assert!(keys.is_empty());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut keys = KeySet::new();
        for code in [-1, 256, 1000, i32::MIN, i32::MAX] {
            assert_eq!(
                keys.get(code),
                Err(InputError::InvalidArgument { code, max: MAX_KEYS })
            );
            assert!(keys.set(code, true).is_err());
        }
        assert!(keys.is_empty());
    }

    #[test]
    fn test_double_press_does_not_toggle() {
        let mut keys = KeySet::new();
        keys.set(65, true).unwrap();
        keys.set(65, true).unwrap();
        assert!(keys.get(65).unwrap());
        assert_eq!(keys.count(), 1);
    }

    #[test]
    fn test_bits_are_independent_across_words() {
        let mut keys = KeySet::new();
        keys.set(31, true).unwrap();
        keys.set(32, true).unwrap();
        keys.set(255, true).unwrap();
        keys.set(32, false).unwrap();
        assert_eq!(keys.pressed().collect::<Vec<_>>(), vec![31, 255]);
    }
}
